//! Bullet parser: memo lines in and out of daily notes.

use chrono::NaiveTime;

use crate::template::TemplatePatterns;
use crate::types::{MemoType, flatten_content};

/// Lines containing this marker are annotations, never memos.
pub const ANNOTATION_MARKER: &str = "comment: ";

/// Length of a block anchor id (`^abc123`).
pub const BLOCK_ANCHOR_LEN: usize = 6;

/// Pieces extracted from one memo bullet line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBullet {
    pub hour: u32,
    pub minute: u32,
    /// Char inside `[...]`, `None` when the bullet has no checkbox.
    pub task_marker: Option<char>,
    /// Visible content, block anchor removed, sentinel still in place.
    pub content: String,
    pub has_id: Option<String>,
}

impl ParsedBullet {
    pub fn memo_type(&self) -> MemoType {
        MemoType::from_marker(self.task_marker)
    }

    /// Time of day; `None` never happens for bullets produced by [`parse_bullet`].
    pub fn time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0)
    }
}

/// Parse one line as a memo bullet.
///
/// Returns `None` for blank lines, annotation lines, lines that don't match
/// the compiled layout, out-of-range clock times, and empty content.
pub fn parse_bullet(line: &str, patterns: &TemplatePatterns) -> Option<ParsedBullet> {
    if line.trim().is_empty() || line.contains(ANNOTATION_MARKER) {
        return None;
    }

    let caps = patterns.captures(line)?;
    let hour: u32 = caps.name("hour")?.as_str().parse().ok()?;
    let minute: u32 = caps.name("minute")?.as_str().parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }

    let task_marker = caps.name("marker").and_then(|m| m.as_str().chars().next());
    let raw = caps.name("content").map(|m| m.as_str()).unwrap_or_default();

    let (content, has_id) = split_block_anchor(raw);
    let content = patterns.unescape_content(content);
    if content.trim().is_empty() {
        return None;
    }

    Some(ParsedBullet {
        hour,
        minute,
        task_marker,
        content: content.to_string(),
        has_id,
    })
}

/// Split a trailing `^abc123` block anchor off the content, along with the
/// whitespace before it.
pub fn split_block_anchor(content: &str) -> (&str, Option<String>) {
    if let Some(caret) = content.rfind('^') {
        let id = &content[caret + 1..];
        if id.chars().count() == BLOCK_ANCHOR_LEN && !id.chars().any(char::is_whitespace) {
            return (content[..caret].trim_end(), Some(id.to_string()));
        }
    }
    (content, None)
}

/// Build the bullet line for a new memo.
///
/// Real line breaks in `content` are flattened to the sentinel token so the
/// memo stays on one line.
pub fn build_insertion_text(
    content: &str,
    is_task: bool,
    time: NaiveTime,
    patterns: &TemplatePatterns,
) -> String {
    let memo_type = if is_task {
        MemoType::TaskTodo
    } else {
        MemoType::Journal
    };
    patterns.format_line(memo_type, time, &flatten_content(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::expand_content;
    use proptest::prelude::*;

    fn patterns(template: &str) -> TemplatePatterns {
        TemplatePatterns::compile(template).unwrap()
    }

    #[test]
    fn test_task_todo_line() {
        let p = patterns("{TIME} {CONTENT}");
        let bullet = parse_bullet("- [ ] 09:30 buy milk", &p).unwrap();
        assert_eq!(
            bullet,
            ParsedBullet {
                hour: 9,
                minute: 30,
                task_marker: Some(' '),
                content: "buy milk".into(),
                has_id: None,
            }
        );
        assert_eq!(bullet.memo_type(), MemoType::TaskTodo);
    }

    #[test]
    fn test_block_anchor_extracted() {
        let p = patterns("⏰ {TIME} — {CONTENT}");
        let bullet = parse_bullet("- ⏰ 14:05 — call mom ^ab12cd", &p).unwrap();
        assert_eq!(bullet.has_id.as_deref(), Some("ab12cd"));
        assert_eq!(bullet.content, "call mom");
        assert_eq!(bullet.memo_type(), MemoType::Journal);
    }

    #[test]
    fn test_anchor_needs_exactly_six_chars() {
        let (content, id) = split_block_anchor("note ^abc12");
        assert_eq!(content, "note ^abc12");
        assert!(id.is_none());

        let (content, id) = split_block_anchor("note ^abc1234");
        assert_eq!(content, "note ^abc1234");
        assert!(id.is_none());
    }

    #[test]
    fn test_task_markers() {
        let p = patterns("");
        let done = parse_bullet("- [X] 07:00 run", &p).unwrap();
        assert_eq!(done.memo_type(), MemoType::TaskDone);
        let custom = parse_bullet("* [>] 07:00 later", &p).unwrap();
        assert_eq!(custom.memo_type(), MemoType::TaskCustom('>'));
    }

    #[test]
    fn test_skipped_lines() {
        let p = patterns("");
        assert!(parse_bullet("", &p).is_none());
        assert!(parse_bullet("   ", &p).is_none());
        assert!(parse_bullet("- 09:00 comment: from elsewhere", &p).is_none());
        assert!(parse_bullet("- 25:00 too late", &p).is_none());
        assert!(parse_bullet("- 09:61 bad minute", &p).is_none());
        assert!(parse_bullet("- 09:00 ", &p).is_none());
        assert!(parse_bullet("- 09:00 ^abcdef", &p).is_none());
        assert!(parse_bullet("# Journal", &p).is_none());
    }

    #[test]
    fn test_build_insertion_text() {
        let p = patterns("{TIME} {CONTENT}");
        let time = NaiveTime::from_hms_opt(8, 15, 0).unwrap();
        assert_eq!(
            build_insertion_text("one\ntwo", true, time, &p),
            "- [ ] 08:15 one<br>two"
        );
        assert_eq!(build_insertion_text("x", false, time, &p), "- 08:15 x");
    }

    #[test]
    fn test_content_that_looks_like_a_checkbox() {
        let p = patterns("{CONTENT} ({TIME})");
        let time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();

        let line = build_insertion_text("[ ] call bank", false, time, &p);
        let bullet = parse_bullet(&line, &p).unwrap();
        assert_eq!(bullet.memo_type(), MemoType::Journal);
        assert_eq!(bullet.content, "[ ] call bank");

        let line = build_insertion_text("[x] done already", true, time, &p);
        assert_eq!(line, "- [ ] \\[x] done already (09:00)");
        let bullet = parse_bullet(&line, &p).unwrap();
        assert_eq!(bullet.memo_type(), MemoType::TaskTodo);
        assert_eq!(bullet.content, "[x] done already");
    }

    proptest! {
        #[test]
        fn insertion_text_roundtrips_through_parser(
            content in "[a-zA-Z0-9\\[\\]^\\\\][a-zA-Z0-9 .,!?\\[\\]^\\\\]{0,20}(\n[a-zA-Z0-9 .,!?\\[\\]^]{1,10}){0,3}",
            is_task in any::<bool>(),
            hour in 0u32..24,
            minute in 0u32..60,
            template in prop::sample::select(vec![
                "",
                "{TIME} {CONTENT}",
                "⏰ {TIME} — {CONTENT}",
                "{CONTENT} ({TIME})",
            ]),
        ) {
            // A trailing `^abc123` is a block anchor, not content.
            prop_assume!(split_block_anchor(&flatten_content(&content)).1.is_none());

            let p = patterns(template);
            let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap();
            let line = build_insertion_text(&content, is_task, time, &p);

            let bullet = parse_bullet(&line, &p).expect("built line parses");
            prop_assert_eq!(expand_content(&bullet.content), content);
            prop_assert_eq!(bullet.hour, hour);
            prop_assert_eq!(bullet.minute, minute);
            prop_assert_eq!(bullet.memo_type().is_task(), is_task);
        }
    }
}
