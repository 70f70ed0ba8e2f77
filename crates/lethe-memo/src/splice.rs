//! Daily-note insert/remove engine.
//!
//! Both operations are pure text transforms. Committing the result back to
//! storage is the caller's job; nothing here rolls back.

use serde::Serialize;

use crate::locator::{InsertionPoint, line_ending};

/// Outcome of [`splice_remove`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Removal {
    pub text: String,
    /// `false` when no line matched and `text` is unchanged.
    pub removed: bool,
}

/// Insert `new_line` into `text` at a located point.
///
/// When the anchor was not found the line is appended strictly after the
/// final line of the document, without adding or swallowing a blank line.
pub fn splice_insert(text: &str, point: &InsertionPoint, new_line: &str) -> String {
    let eol = line_ending(text);

    if !point.anchor_found {
        return append_line(text, new_line, eol);
    }

    let mut out = String::with_capacity(text.len() + new_line.len() + eol.len());
    let mut inserted = false;
    for (index, segment) in text.split_inclusive('\n').enumerate() {
        out.push_str(segment);
        if index == point.line_index {
            if segment.ends_with('\n') {
                out.push_str(new_line);
                out.push_str(eol);
            } else {
                out.push_str(eol);
                out.push_str(new_line);
            }
            inserted = true;
        }
    }

    if inserted {
        out
    } else {
        append_line(text, new_line, eol)
    }
}

fn append_line(text: &str, new_line: &str, eol: &str) -> String {
    if text.is_empty() {
        new_line.to_string()
    } else if text.ends_with('\n') {
        format!("{text}{new_line}{eol}")
    } else {
        format!("{text}{eol}{new_line}")
    }
}

/// Remove the first line exactly equal to `exact_line`, with its line ending.
///
/// Comparison ignores the line ending itself (LF or CRLF). No match is a
/// no-op reported through [`Removal::removed`].
pub fn splice_remove(text: &str, exact_line: &str) -> Removal {
    let mut offset = 0;
    for segment in text.split_inclusive('\n') {
        let line = segment
            .strip_suffix('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .unwrap_or(segment);

        if line == exact_line {
            let mut out = String::with_capacity(text.len() - segment.len());
            out.push_str(&text[..offset]);
            out.push_str(&text[offset + segment.len()..]);
            return Removal {
                text: out,
                removed: true,
            };
        }
        offset += segment.len();
    }

    Removal {
        text: text.to_string(),
        removed: false,
    }
}

/// Remove the line at `line_index`, with its line ending.
///
/// Used when the caller already verified which line it means, so duplicate
/// lines elsewhere in the note are left alone.
pub fn splice_remove_at(text: &str, line_index: usize) -> Removal {
    let mut offset = 0;
    for (index, segment) in text.split_inclusive('\n').enumerate() {
        if index == line_index {
            let mut out = String::with_capacity(text.len() - segment.len());
            out.push_str(&text[..offset]);
            out.push_str(&text[offset + segment.len()..]);
            return Removal {
                text: out,
                removed: true,
            };
        }
        offset += segment.len();
    }

    Removal {
        text: text.to_string(),
        removed: false,
    }
}
