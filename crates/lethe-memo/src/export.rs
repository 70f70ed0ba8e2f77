//! Export formatter: memos grouped by day as a nested markdown list.

use chrono::NaiveDate;

use crate::bullet::split_block_anchor;
use crate::template::TemplatePatterns;
use crate::types::{LINE_BREAK_SENTINEL, MemoRecord, flatten_content};

/// Indent of memo lines under their day heading.
const EXPORT_INDENT: &str = "    ";

/// Group memos by the calendar day of `created_at`.
///
/// Days appear in the order they are first seen; memos keep their order
/// within a day.
pub fn group_by_date(memos: &[MemoRecord]) -> Vec<(NaiveDate, Vec<&MemoRecord>)> {
    let mut groups: Vec<(NaiveDate, Vec<&MemoRecord>)> = Vec::new();
    for memo in memos {
        let day = memo.created_at.date();
        match groups.iter_mut().find(|(d, _)| *d == day) {
            Some((_, items)) => items.push(memo),
            None => groups.push((day, vec![memo])),
        }
    }
    groups
}

/// Render memos as:
///
/// ```text
/// - [[2024-05-17]]
///     - 09:30 first
///     - [ ] 10:00 a task
/// ```
///
/// `date_format` is a chrono format string for the day link.
pub fn memos_to_text(memos: &[MemoRecord], patterns: &TemplatePatterns, date_format: &str) -> String {
    let mut out = String::new();
    for (day, items) in group_by_date(memos) {
        out.push_str(&format!("- [[{}]]\n", day.format(date_format)));
        for memo in items {
            let flat = flatten_content(&memo.content);
            let (content, _) = split_block_anchor(&flat);
            let line = patterns.format_line(memo.memo_type, memo.created_at.time(), content);

            out.push_str(EXPORT_INDENT);
            out.push_str(&line.replace(LINE_BREAK_SENTINEL, &format!("\n{EXPORT_INDENT}")));
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::daily_memo_id;
    use crate::types::MemoType;

    fn memo(day: u32, h: u32, content: &str, memo_type: MemoType) -> MemoRecord {
        let created = NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap();
        MemoRecord {
            id: daily_memo_id(created, 1),
            content: content.into(),
            created_at: created,
            updated_at: created,
            memo_type,
            path: "d.md".into(),
            has_id: None,
        }
    }

    #[test]
    fn test_group_by_date_first_seen_order() {
        let memos = vec![
            memo(18, 9, "a", MemoType::Journal),
            memo(17, 9, "b", MemoType::Journal),
            memo(18, 10, "c", MemoType::Journal),
        ];
        let groups = group_by_date(&memos);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0.to_string(), "2024-05-18");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].1[0].content, "b");
    }

    #[test]
    fn test_memos_to_text() {
        let p = TemplatePatterns::compile("{TIME} {CONTENT}").unwrap();
        let memos = vec![
            memo(17, 9, "first<br>second ^abc123", MemoType::Journal),
            memo(17, 10, "task\nbody", MemoType::TaskTodo),
            memo(18, 8, "done", MemoType::TaskDone),
        ];
        let text = memos_to_text(&memos, &p, "%Y-%m-%d");
        assert_eq!(
            text,
            "- [[2024-05-17]]\n    - 09:00 first\n    second\n    - [ ] 10:00 task\n    body\n- [[2024-05-18]]\n    - [x] 08:00 done\n"
        );
    }

    #[test]
    fn test_memos_to_text_empty() {
        let p = TemplatePatterns::compile("").unwrap();
        assert_eq!(memos_to_text(&[], &p, "%Y-%m-%d"), "");
    }
}
