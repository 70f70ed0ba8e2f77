//! Composition template compiler.
//!
//! A composition template describes how a memo line looks after the bullet
//! and optional checkbox, e.g. `{TIME} {CONTENT}` or `⏰ {TIME} — {CONTENT}`.
//! [`TemplatePatterns`] compiles it once into the single expression used for
//! matching *and* extracting, and knows how to format the inverse layout.
//!
//! ```
//! use lethe_memo::TemplatePatterns;
//!
//! let patterns = TemplatePatterns::compile("⏰ {TIME} — {CONTENT}")?;
//! assert_eq!(patterns.extract_time("- ⏰ 14:05 — call mom"), Some((14, 5)));
//! assert_eq!(patterns.extract_content("- ⏰ 14:05 — call mom"), Some("call mom"));
//! # Ok::<(), lethe_memo::MemoError>(())
//! ```

use std::borrow::Cow;

use chrono::NaiveTime;
use regex::{Captures, Regex};
use tracing::debug;

use crate::error::Result;
use crate::types::MemoType;

/// Placeholder replaced by `HH:MM`.
pub const TIME_PLACEHOLDER: &str = "{TIME}";

/// Placeholder replaced by the flattened memo content.
pub const CONTENT_PLACEHOLDER: &str = "{CONTENT}";

/// Bullet (`-` or `*`), one whitespace, optional checkbox.
const BULLET_PATTERN: &str = r"^\s*[-*]\s(?:\[(?P<marker>.)\]\s)?";

/// `H:MM` or `HH:MM`, optionally wrapped in `<time>` tags.
const TIME_PATTERN: &str = r"(?:<time>)?(?P<hour>[0-9]{1,2}):(?P<minute>[0-9]{2})(?:</time>)?";

/// Layout used when no usable template is configured.
const DEFAULT_TAIL_PATTERN: &str = r"\s?(?P<content>.*)$";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Time,
    Content,
}

/// Compiled pattern set for one composition template.
///
/// Cloning is cheap; compile once per active template and pass it to every
/// parse and format call.
#[derive(Debug, Clone)]
pub struct TemplatePatterns {
    template: String,
    /// `None` when the built-in default layout is in effect.
    segments: Option<Vec<Segment>>,
    line: Regex,
}

impl TemplatePatterns {
    /// Compile a composition template.
    ///
    /// An empty template, or one without exactly one `{TIME}` and exactly one
    /// `{CONTENT}`, falls back to the built-in `HH:MM content` layout.
    pub fn compile(template: &str) -> Result<Self> {
        let segments = split_template(template);
        let pattern = match &segments {
            Some(segments) => {
                let mut pattern = String::from(BULLET_PATTERN);
                for segment in segments {
                    match segment {
                        Segment::Literal(text) => pattern.push_str(&regex::escape(text)),
                        Segment::Time => pattern.push_str(TIME_PATTERN),
                        Segment::Content => pattern.push_str("(?P<content>.*?)"),
                    }
                }
                pattern.push('$');
                pattern
            }
            None => {
                if !template.is_empty() {
                    debug!(template = %template, "composition template inactive, using default layout");
                }
                format!("{BULLET_PATTERN}{TIME_PATTERN}{DEFAULT_TAIL_PATTERN}")
            }
        };

        Ok(Self {
            template: template.to_string(),
            segments,
            line: Regex::new(&pattern)?,
        })
    }

    /// The template this set was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Whether the user template is in effect (as opposed to the default layout).
    pub fn is_custom(&self) -> bool {
        self.segments.is_some()
    }

    /// Does this line look like a timestamped memo bullet?
    pub fn contains_timestamp(&self, line: &str) -> bool {
        self.line.is_match(line)
    }

    /// Extract `(hour, minute)` from a memo bullet. Values are not range-checked.
    pub fn extract_time(&self, line: &str) -> Option<(u32, u32)> {
        let caps = self.captures(line)?;
        let hour = caps.name("hour")?.as_str().parse().ok()?;
        let minute = caps.name("minute")?.as_str().parse().ok()?;
        Some((hour, minute))
    }

    /// Extract the content part of a memo bullet.
    pub fn extract_content<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.captures(line)
            .and_then(|caps| caps.name("content"))
            .map(|m| m.as_str())
    }

    /// Extract the checkbox marker: `None` if the line is not a memo bullet,
    /// `Some(None)` if it has no checkbox.
    pub fn extract_marker(&self, line: &str) -> Option<Option<char>> {
        let caps = self.captures(line)?;
        Some(caps.name("marker").and_then(|m| m.as_str().chars().next()))
    }

    pub(crate) fn captures<'a>(&self, line: &'a str) -> Option<Captures<'a>> {
        self.line.captures(line)
    }

    /// Render the composition (everything after the bullet prefix).
    ///
    /// `content` must already be flattened to a single line.
    pub fn format_body(&self, time: NaiveTime, content: &str) -> String {
        let time = time.format("%H:%M").to_string();
        let content = self.escape_content(content);
        let content = content.as_ref();
        match &self.segments {
            Some(segments) => segments
                .iter()
                .map(|segment| match segment {
                    Segment::Literal(text) => text.as_str(),
                    Segment::Time => time.as_str(),
                    Segment::Content => content,
                })
                .collect(),
            None => format!("{time} {content}"),
        }
    }

    /// Render a full bullet line for a memo of the given type.
    pub fn format_line(&self, memo_type: MemoType, time: NaiveTime, content: &str) -> String {
        format!("{}{}", memo_type.bullet_prefix(), self.format_body(time, content))
    }

    /// Undo the escaping [`format_body`](Self::format_body) applies to
    /// content that starts right after the bullet.
    pub fn unescape_content<'a>(&self, content: &'a str) -> &'a str {
        if self.content_leads() {
            if let Some(rest) = content.strip_prefix('\\') {
                if rest.starts_with(['[', '\\']) {
                    return rest;
                }
            }
        }
        content
    }

    /// Content directly after the bullet could pass for a `[x] ` checkbox,
    /// so a leading `[` (and the escape char itself) gets a backslash.
    fn escape_content<'a>(&self, content: &'a str) -> Cow<'a, str> {
        if self.content_leads() && content.starts_with(['[', '\\']) {
            Cow::Owned(format!("\\{content}"))
        } else {
            Cow::Borrowed(content)
        }
    }

    fn content_leads(&self) -> bool {
        matches!(self.segments.as_deref(), Some([Segment::Content, ..]))
    }

    /// Count memo bullets in a document without building records.
    pub fn count_memo_lines(&self, text: &str) -> usize {
        text.lines().filter(|line| self.contains_timestamp(line)).count()
    }
}

/// Split a template into literal and placeholder segments.
///
/// Returns `None` unless each placeholder occurs exactly once.
fn split_template(template: &str) -> Option<Vec<Segment>> {
    if template.matches(TIME_PLACEHOLDER).count() != 1
        || template.matches(CONTENT_PLACEHOLDER).count() != 1
    {
        return None;
    }

    let time_at = template.find(TIME_PLACEHOLDER)?;
    let content_at = template.find(CONTENT_PLACEHOLDER)?;

    let (first_at, first, first_len, second_at, second, second_len) = if time_at < content_at {
        (
            time_at,
            Segment::Time,
            TIME_PLACEHOLDER.len(),
            content_at,
            Segment::Content,
            CONTENT_PLACEHOLDER.len(),
        )
    } else {
        (
            content_at,
            Segment::Content,
            CONTENT_PLACEHOLDER.len(),
            time_at,
            Segment::Time,
            TIME_PLACEHOLDER.len(),
        )
    };

    fn push_literal(segments: &mut Vec<Segment>, text: &str) {
        if !text.is_empty() {
            segments.push(Segment::Literal(text.to_string()));
        }
    }

    let mut segments = Vec::with_capacity(5);
    push_literal(&mut segments, &template[..first_at]);
    segments.push(first);
    push_literal(&mut segments, &template[first_at + first_len..second_at]);
    segments.push(second);
    push_literal(&mut segments, &template[second_at + second_len..]);

    Some(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_empty_template_uses_default() {
        let p = TemplatePatterns::compile("").unwrap();
        assert!(!p.is_custom());
        assert!(p.contains_timestamp("- 09:30 buy milk"));
        assert!(p.contains_timestamp("* [ ] 9:05 stretch"));
        assert!(p.contains_timestamp("  - <time>10:00</time> standup"));
        assert!(!p.contains_timestamp("- buy milk"));
        assert!(!p.contains_timestamp("plain 09:30 text"));
    }

    #[test]
    fn test_template_missing_placeholder_falls_back() {
        let p = TemplatePatterns::compile("{TIME} only").unwrap();
        assert!(!p.is_custom());
        let p = TemplatePatterns::compile("{TIME} {CONTENT} {CONTENT}").unwrap();
        assert!(!p.is_custom());
        assert_eq!(p.extract_content("- 08:00 hello"), Some("hello"));
    }

    #[test]
    fn test_default_extraction() {
        let p = TemplatePatterns::compile("").unwrap();
        let line = "- [x] 18:45 <time> is not special here";
        assert_eq!(p.extract_time(line), Some((18, 45)));
        assert_eq!(p.extract_marker(line), Some(Some('x')));
        assert_eq!(p.extract_content(line), Some("<time> is not special here"));
        assert_eq!(p.extract_marker("- 18:45 journal"), Some(None));
        assert_eq!(p.extract_marker("no bullet"), None);
    }

    #[test]
    fn test_simple_template() {
        let p = TemplatePatterns::compile("{TIME} {CONTENT}").unwrap();
        assert!(p.is_custom());
        let line = "- [ ] 09:30 buy milk";
        assert_eq!(p.extract_time(line), Some((9, 30)));
        assert_eq!(p.extract_marker(line), Some(Some(' ')));
        assert_eq!(p.extract_content(line), Some("buy milk"));
    }

    #[test]
    fn test_decorated_template_escapes_literals() {
        let p = TemplatePatterns::compile("⏰ {TIME} — {CONTENT}").unwrap();
        let line = "- ⏰ 14:05 — call mom ^ab12cd";
        assert!(p.contains_timestamp(line));
        assert_eq!(p.extract_time(line), Some((14, 5)));
        assert_eq!(p.extract_content(line), Some("call mom ^ab12cd"));
        assert!(!p.contains_timestamp("- 14:05 call mom"));
    }

    #[test]
    fn test_regex_metacharacters_in_template() {
        let p = TemplatePatterns::compile("({TIME}) [{CONTENT}]*").unwrap();
        let line = p.format_line(MemoType::Journal, time(7, 1), "a.b");
        assert_eq!(line, "- (07:01) [a.b]*");
        assert_eq!(p.extract_content(&line), Some("a.b"));
        assert!(!p.contains_timestamp("- X07:01) [a.b]*"));
    }

    #[test]
    fn test_content_before_time() {
        let p = TemplatePatterns::compile("{CONTENT} @ {TIME}").unwrap();
        let line = p.format_line(MemoType::TaskTodo, time(23, 59), "ship it @ home");
        assert_eq!(line, "- [ ] ship it @ home @ 23:59");
        assert_eq!(p.extract_time(&line), Some((23, 59)));
        assert_eq!(p.extract_content(&line), Some("ship it @ home"));
    }

    #[test]
    fn test_leading_bracket_escaped_when_content_comes_first() {
        let p = TemplatePatterns::compile("{CONTENT} ({TIME})").unwrap();
        let line = p.format_line(MemoType::Journal, time(9, 0), "[ ] call bank");
        assert_eq!(line, "- \\[ ] call bank (09:00)");
        assert_eq!(p.extract_marker(&line), Some(None));
        assert_eq!(p.unescape_content(p.extract_content(&line).unwrap()), "[ ] call bank");

        assert_eq!(p.format_body(time(9, 0), "\\x"), "\\\\x (09:00)");
        assert_eq!(p.unescape_content("\\\\x"), "\\x");
        assert_eq!(p.unescape_content("\\x"), "\\x");

        // Time first: nothing to disambiguate.
        let p = TemplatePatterns::compile("{TIME} {CONTENT}").unwrap();
        assert_eq!(p.format_body(time(9, 0), "[ ] a"), "09:00 [ ] a");
        assert_eq!(p.unescape_content("\\[ ] a"), "\\[ ] a");
    }

    #[test]
    fn test_only_ascii_digits_are_times() {
        let p = TemplatePatterns::compile("{TIME} {CONTENT}").unwrap();
        assert!(!p.contains_timestamp("- ٠٩:٣٠ arabic digits"));
        assert_eq!(p.count_memo_lines("- ٠٩:٣٠ a\n- 09:30 b\n"), 1);
    }

    #[test]
    fn test_format_default_layout() {
        let p = TemplatePatterns::compile("").unwrap();
        assert_eq!(
            p.format_line(MemoType::TaskDone, time(6, 0), "done"),
            "- [x] 06:00 done"
        );
        assert_eq!(p.format_body(time(6, 0), "x"), "06:00 x");
    }

    #[test]
    fn test_count_memo_lines() {
        let p = TemplatePatterns::compile("{TIME} {CONTENT}").unwrap();
        let text = "# Journal\r\n- 09:00 a\r\n- [ ] 10:00 b\r\n\r\n- not a memo\r\n* 11:30 c";
        assert_eq!(p.count_memo_lines(text), 3);
    }
}
