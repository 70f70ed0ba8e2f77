//! Section locator: where a new memo goes inside a daily note.
//!
//! The anchor marker (e.g. `# Journal`) opens a section that runs until the
//! next heading or horizontal rule, or to the end of the document. New memos
//! are placed right after the last non-blank line of that section.

use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// Result of [`locate_insertion_point`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InsertionPoint {
    /// Zero-based line after which the new line is inserted.
    pub line_index: usize,
    /// Whether a heading or rule closes the anchor's section.
    pub found_boundary: bool,
    /// `false` when the anchor is missing and the caller must append at the end.
    pub anchor_found: bool,
}

/// Split text into lines on LF, dropping a trailing CR from each line.
///
/// A trailing line ending yields a final empty line, so the result always
/// has at least one element.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Line ending used by a document: CRLF if it contains any, else LF.
pub fn line_ending(text: &str) -> &'static str {
    if text.contains("\r\n") { "\r\n" } else { "\n" }
}

fn is_section_boundary(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed == "---" || (line.starts_with('#') && line.trim_start_matches('#').starts_with(' '))
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Find where a memo line should be inserted.
///
/// Missing anchors are a degraded mode rather than an error: the returned
/// point has `anchor_found == false` and points at the last line.
pub fn locate_insertion_point(text: &str, anchor: &str) -> InsertionPoint {
    let lines = split_lines(text);
    let last_line = lines.len() - 1;

    let degraded = InsertionPoint {
        line_index: last_line,
        found_boundary: false,
        anchor_found: false,
    };

    let anchor = anchor.trim();
    if anchor.is_empty() {
        debug!("empty anchor marker, appending at end of document");
        return degraded;
    }

    let anchor_re = match Regex::new(&format!(r"^\s*{}\s*$", regex::escape(anchor))) {
        Ok(re) => re,
        Err(e) => {
            debug!(error = %e, "anchor pattern rejected, appending at end of document");
            return degraded;
        }
    };

    let Some(anchor_line) = lines.iter().position(|line| anchor_re.is_match(line)) else {
        debug!(anchor = %anchor, "anchor not found, appending at end of document");
        return degraded;
    };

    let boundary = lines[anchor_line + 1..]
        .iter()
        .position(|line| is_section_boundary(line))
        .map(|offset| anchor_line + 1 + offset);

    let section_end = boundary.unwrap_or(lines.len());
    let line_index = (anchor_line + 1..section_end)
        .rev()
        .find(|&i| !is_blank(lines[i]))
        .unwrap_or(anchor_line);

    InsertionPoint {
        line_index,
        found_boundary: boundary.is_some(),
        anchor_found: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_strips_cr() {
        assert_eq!(split_lines("a\r\nb\n"), vec!["a", "b", ""]);
        assert_eq!(split_lines(""), vec![""]);
    }

    #[test]
    fn test_empty_section_falls_back_to_anchor() {
        let point = locate_insertion_point("# Journal\n\n# Other\n", "# Journal");
        assert_eq!(
            point,
            InsertionPoint {
                line_index: 0,
                found_boundary: true,
                anchor_found: true
            }
        );
    }

    #[test]
    fn test_last_non_blank_line_of_section() {
        let text = "# Journal\n- 09:00 a\n- 10:00 b\n\n\n## Tasks\n- 11:00 c\n";
        let point = locate_insertion_point(text, "# Journal");
        assert_eq!(point.line_index, 2);
        assert!(point.found_boundary);
    }

    #[test]
    fn test_horizontal_rule_is_boundary() {
        let text = "intro\n# Journal\n- 09:00 a\n---\nfooter\n";
        let point = locate_insertion_point(text, "# Journal");
        assert_eq!(point.line_index, 2);
        assert!(point.found_boundary);
    }

    #[test]
    fn test_no_boundary_extends_to_end() {
        let text = "# Journal\n- 09:00 a\n- 10:00 b\n\n";
        let point = locate_insertion_point(text, "# Journal");
        assert_eq!(point.line_index, 2);
        assert!(!point.found_boundary);
        assert!(point.anchor_found);
    }

    #[test]
    fn test_missing_anchor_is_degraded() {
        let text = "# Journal\n- 09:00 a\n";
        let point = locate_insertion_point(text, "# Missing");
        assert!(!point.anchor_found);
        assert!(!point.found_boundary);
        assert_eq!(point.line_index, 2);
    }

    #[test]
    fn test_anchor_matches_whole_line_only() {
        let text = "## Journal archive\n# Journal\n- 09:00 a\n";
        let point = locate_insertion_point(text, "# Journal");
        assert!(point.anchor_found);
        assert_eq!(point.line_index, 2);
    }

    #[test]
    fn test_anchor_with_surrounding_whitespace_and_crlf() {
        let text = "  # Journal  \r\n- 09:00 a\r\n\r\n# Next\r\n";
        let point = locate_insertion_point(text, "# Journal");
        assert_eq!(point.line_index, 1);
        assert!(point.found_boundary);
    }

    #[test]
    fn test_empty_anchor_is_degraded() {
        let point = locate_insertion_point("a\nb", "  ");
        assert!(!point.anchor_found);
        assert_eq!(point.line_index, 1);
    }

    #[test]
    fn test_hashtag_is_not_a_heading() {
        let text = "# Journal\n- 09:00 a\n#tag line\n";
        let point = locate_insertion_point(text, "# Journal");
        assert!(!point.found_boundary);
        assert_eq!(point.line_index, 2);
    }
}
