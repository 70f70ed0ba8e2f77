//! Memo record builder: ids and records for both storage modes.

use chrono::{NaiveDate, NaiveDateTime};

use crate::bullet::{ParsedBullet, parse_bullet};
use crate::error::{MemoError, Result};
use crate::locator::split_lines;
use crate::template::TemplatePatterns;
use crate::types::{ID_TIMESTAMP_FORMAT, MemoRecord, MemoType};

/// Fixed suffix of individual-file ids (one memo per file, no line index).
pub const INDIVIDUAL_ID_SUFFIX: &str = "001";

/// Length of the timestamp prefix in every memo id.
const ID_TIMESTAMP_LEN: usize = 14;

/// Id of a daily-note memo: creation timestamp plus zero-padded line index.
pub fn daily_memo_id(created: NaiveDateTime, line_index: usize) -> String {
    format!("{}{:02}", created.format(ID_TIMESTAMP_FORMAT), line_index)
}

/// Id of an individual-file memo.
pub fn individual_memo_id(created: NaiveDateTime) -> String {
    format!("{}{}", created.format(ID_TIMESTAMP_FORMAT), INDIVIDUAL_ID_SUFFIX)
}

/// Decode a daily-note memo id into its timestamp and line index.
pub fn parse_daily_memo_id(id: &str) -> Result<(NaiveDateTime, usize)> {
    let invalid = || MemoError::InvalidId(id.to_string());

    if id.len() <= ID_TIMESTAMP_LEN || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let (stamp, index) = id.split_at(ID_TIMESTAMP_LEN);
    let created = NaiveDateTime::parse_from_str(stamp, ID_TIMESTAMP_FORMAT).map_err(|_| invalid())?;
    let line_index = index.parse().map_err(|_| invalid())?;
    Ok((created, line_index))
}

/// Build a record for a memo bullet found on `line_index` of the daily note for `date`.
///
/// Returns `None` only if the bullet carries an impossible clock time, which
/// [`parse_bullet`] already rules out.
pub fn build_daily_memo(
    date: NaiveDate,
    bullet: ParsedBullet,
    line_index: usize,
    path: &str,
) -> Option<MemoRecord> {
    let created = date.and_time(bullet.time()?);
    Some(MemoRecord {
        id: daily_memo_id(created, line_index),
        memo_type: bullet.memo_type(),
        content: bullet.content,
        created_at: created,
        updated_at: created,
        path: path.to_string(),
        has_id: bullet.has_id,
    })
}

/// Record for a memo that was just written into a daily note.
pub fn new_daily_memo(
    content: &str,
    is_task: bool,
    created: NaiveDateTime,
    line_index: usize,
    path: &str,
) -> MemoRecord {
    MemoRecord {
        id: daily_memo_id(created, line_index),
        content: content.to_string(),
        created_at: created,
        updated_at: created,
        memo_type: if is_task {
            MemoType::TaskTodo
        } else {
            MemoType::Journal
        },
        path: path.to_string(),
        has_id: None,
    }
}

/// Parse every memo bullet in a daily note.
///
/// `date` is the calendar day the note represents; memo times are combined
/// with it. Non-memo lines are skipped.
pub fn parse_daily_note_text(
    text: &str,
    date: NaiveDate,
    path: &str,
    patterns: &TemplatePatterns,
) -> Vec<MemoRecord> {
    split_lines(text)
        .into_iter()
        .enumerate()
        .filter_map(|(index, line)| {
            let bullet = parse_bullet(line, patterns)?;
            build_daily_memo(date, bullet, index, path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    #[test]
    fn test_daily_id_layout() {
        let created = date().and_hms_opt(9, 30, 0).unwrap();
        assert_eq!(daily_memo_id(created, 3), "2024051709300003");
        assert_eq!(daily_memo_id(created, 123), "20240517093000123");
        assert_eq!(individual_memo_id(created), "20240517093000001");
    }

    #[test]
    fn test_parse_daily_id() {
        let (created, index) = parse_daily_memo_id("20240517093000123").unwrap();
        assert_eq!(created, date().and_hms_opt(9, 30, 0).unwrap());
        assert_eq!(index, 123);

        // Unpadded single-digit indexes decode the same as padded ones.
        assert_eq!(parse_daily_memo_id("202405170930005").unwrap().1, 5);
        assert_eq!(parse_daily_memo_id("2024051709300005").unwrap().1, 5);

        assert!(parse_daily_memo_id("2024051709300").is_err());
        assert!(parse_daily_memo_id("20240517093000").is_err());
        assert!(parse_daily_memo_id("2024051709300a01").is_err());
        assert!(parse_daily_memo_id("20241317093000001").is_err());
    }

    #[test]
    fn test_parse_daily_note_text() {
        let p = TemplatePatterns::compile("{TIME} {CONTENT}").unwrap();
        let text = "# Journal\r\n- [ ] 09:30 buy milk\r\n- 10:15 walked<br>far ^abc123\r\n\r\nnot a memo\r\n- [x] 22:00 done\r\n";
        let memos = parse_daily_note_text(text, date(), "Daily/2024-05-17.md", &p);

        assert_eq!(memos.len(), 3);
        assert_eq!(memos[0].memo_type, MemoType::TaskTodo);
        assert_eq!(memos[0].content, "buy milk");
        assert_eq!(memos[0].id, "2024051709300001");
        assert_eq!(memos[0].created_at_display(), "2024/05/17 09:30:00");

        assert_eq!(memos[1].memo_type, MemoType::Journal);
        assert_eq!(memos[1].content, "walked<br>far");
        assert_eq!(memos[1].has_id.as_deref(), Some("abc123"));

        assert_eq!(memos[2].memo_type, MemoType::TaskDone);
        assert_eq!(memos[2].id, "2024051722000005");
        assert!(memos.iter().all(|m| m.path == "Daily/2024-05-17.md"));
    }

    #[test]
    fn test_id_roundtrips_to_line() {
        let p = TemplatePatterns::compile("").unwrap();
        let text = "intro\n\n- 07:45 coffee\n";
        let memos = parse_daily_note_text(text, date(), "d.md", &p);
        let (created, index) = parse_daily_memo_id(&memos[0].id).unwrap();
        assert_eq!(created, memos[0].created_at);
        assert_eq!(split_lines(text)[index], "- 07:45 coffee");
    }
}
