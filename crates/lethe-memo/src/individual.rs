//! Individual-file codec: one memo per markdown file with frontmatter.
//!
//! ## File Format
//!
//! ```markdown
//! ---
//! created: 2024-05-17 09:30:00
//! type: task
//! tags:
//!   - inbox
//! ---
//!
//! - [ ] first line
//!   continuation line
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_yaml::Value;
use tracing::debug;

use crate::builder::individual_memo_id;
use crate::error::{MemoError, Result};
use crate::types::{MemoRecord, MemoType, expand_content};

/// Layout of the `created` frontmatter key.
pub const FRONTMATTER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Other `created` layouts accepted when reading.
const ACCEPTED_TIME_FORMATS: &[&str] = &[
    FRONTMATTER_TIME_FORMAT,
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Characters that are stripped from generated filenames.
const FILENAME_FORBIDDEN: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|', '#', '^', '[', ']'];

/// Filename used when the content yields nothing usable.
const FALLBACK_FILENAME: &str = "memo";

/// Upper bound on numbered candidates in [`generate_unique_filename`].
const MAX_FILENAME_PROBES: usize = 10_000;

/// Frontmatter keys the codec understands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    pub created: Option<String>,
    /// The `type` key: `task` or `memo`.
    pub kind: Option<String>,
    pub tags: Vec<String>,
}

impl Frontmatter {
    /// Parse a YAML frontmatter block. Malformed YAML yields `None`.
    pub fn from_yaml(yaml: &str) -> Option<Self> {
        let value: Value = match serde_yaml::from_str(yaml) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "unparseable frontmatter, ignoring it");
                return None;
            }
        };
        let map = value.as_mapping()?;
        let field = |key: &str| map.get(Value::String(key.to_string()));

        let tags = match field("tags") {
            Some(Value::Sequence(items)) => items.iter().filter_map(scalar_to_string).collect(),
            Some(Value::String(s)) => s
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            _ => Vec::new(),
        };

        Some(Self {
            created: field("created").and_then(scalar_to_string),
            kind: field("type").and_then(scalar_to_string),
            tags,
        })
    }

    fn is_task(&self) -> bool {
        self.kind
            .as_deref()
            .is_some_and(|kind| kind.trim().eq_ignore_ascii_case("task"))
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// File-system timestamps of a memo file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTimes {
    pub created: NaiveDateTime,
    pub modified: NaiveDateTime,
}

/// Where a decoded memo's creation time came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatedSource {
    Frontmatter,
    /// `created` was missing or malformed; the file's creation time was used.
    FileStat,
}

/// Result of [`decode_individual_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMemo {
    pub record: MemoRecord,
    pub created_from: CreatedSource,
    pub tags: Vec<String>,
}

/// Split a leading `---` frontmatter block from the body.
///
/// Returns `(None, text)` when the document has no complete block.
pub fn split_frontmatter(text: &str) -> (Option<&str>, &str) {
    let trimmed = text.trim_start();
    let Some(after_open) = trimmed.strip_prefix("---") else {
        return (None, text);
    };
    let Some(after_open) = after_open
        .strip_prefix("\r\n")
        .or_else(|| after_open.strip_prefix('\n'))
    else {
        return (None, text);
    };

    // Closing delimiter may also sit on the very first line (empty block).
    let (yaml, rest) = if let Some(rest) = after_open.strip_prefix("---") {
        ("", rest)
    } else {
        match after_open.find("\n---") {
            Some(pos) => (&after_open[..pos], &after_open[pos + 4..]),
            None => return (None, text),
        }
    };

    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => "",
    };
    (Some(yaml), rest)
}

/// Serialize a memo into an individual file.
///
/// Tags go through the YAML emitter so values like `#inbox` or `a: b` come
/// back as written.
pub fn encode_individual_file(record: &MemoRecord, tags: &[String]) -> Result<String> {
    let kind = if record.memo_type.is_task() {
        "task"
    } else {
        "memo"
    };

    let mut out = format!(
        "---\ncreated: {}\ntype: {kind}\n",
        record.created_at.format(FRONTMATTER_TIME_FORMAT)
    );
    if !tags.is_empty() {
        out.push_str("tags:\n");
        for tag in tags {
            let scalar = serde_yaml::to_string(&tag.replace(['\r', '\n'], " "))?;
            out.push_str("  - ");
            out.push_str(scalar.trim_end());
            out.push('\n');
        }
    }
    out.push_str("---\n\n");

    let content = expand_content(&record.content);
    match record.memo_type.marker() {
        Some(marker) => {
            out.push_str(&format!("- [{marker}] {}", content.replace('\n', "\n  ")));
        }
        None => out.push_str(&content),
    }
    Ok(out)
}

/// Parse an individual memo file.
///
/// `host` is frontmatter already parsed by the host application; when absent
/// the block is parsed from `text`. A missing or malformed `created` falls
/// back to `times.created`.
pub fn decode_individual_file(
    text: &str,
    path: &str,
    times: FileTimes,
    host: Option<&Frontmatter>,
) -> DecodedMemo {
    let (yaml, body) = split_frontmatter(text);
    let frontmatter = match host {
        Some(fm) => fm.clone(),
        None => yaml.and_then(Frontmatter::from_yaml).unwrap_or_default(),
    };

    let parsed_created = frontmatter.created.as_deref().and_then(parse_created);
    let (created, created_from) = match parsed_created {
        Some(created) => (created, CreatedSource::Frontmatter),
        None => {
            debug!(
                path,
                created = frontmatter.created.as_deref().unwrap_or(""),
                "memo file without usable created timestamp, using file creation time"
            );
            (times.created, CreatedSource::FileStat)
        }
    };

    let body = body.trim();
    let (memo_type, content) = if frontmatter.is_task() {
        let memo_type = if body.contains("- [x]") || body.contains("- [X]") {
            MemoType::TaskDone
        } else {
            MemoType::TaskTodo
        };
        (memo_type, strip_task_body(body))
    } else {
        (MemoType::Journal, body.to_string())
    };

    DecodedMemo {
        record: MemoRecord {
            id: individual_memo_id(created),
            content,
            created_at: created,
            updated_at: times.modified,
            memo_type,
            path: path.to_string(),
            has_id: None,
        },
        created_from,
        tags: frontmatter.tags,
    }
}

fn parse_created(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    ACCEPTED_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Remove the checkbox bullet and the two-space continuation indent.
fn strip_task_body(body: &str) -> String {
    let mut lines = body.lines();
    let Some(first) = lines.next() else {
        return String::new();
    };

    let first = strip_checkbox(first).unwrap_or(first);
    let mut out = first.to_string();
    for line in lines {
        out.push('\n');
        out.push_str(line.strip_prefix("  ").unwrap_or(line));
    }
    out
}

fn strip_checkbox(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("- [")?;
    let mut chars = rest.char_indices();
    chars.next()?;
    let (close, bracket) = chars.next()?;
    if bracket != ']' {
        return None;
    }
    let after = &rest[close + 1..];
    Some(after.strip_prefix(' ').unwrap_or(after))
}

/// Derive a filesystem-safe base name from memo content.
pub fn sanitize_filename(content: &str, max_len: usize) -> String {
    let expanded = expand_content(content);
    let first_line = expanded.lines().find(|l| !l.trim().is_empty()).unwrap_or("");

    let cleaned: String = first_line
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| !c.is_control() && !FILENAME_FORBIDDEN.contains(c))
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let truncated: String = collapsed.chars().take(max_len).collect();
    let name = truncated.trim().trim_start_matches('.').trim_start();

    if name.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        name.to_string()
    }
}

/// Pick a path under `folder` that `exists` reports as free.
///
/// Probes `<base>.md`, then `<base> <timestamp>.md`, then
/// `<base> <timestamp>-<n>.md` for increasing `n`.
pub fn generate_unique_filename<F>(
    mut exists: F,
    folder: &str,
    base: &str,
    timestamp: &str,
) -> Result<String>
where
    F: FnMut(&str) -> bool,
{
    let folder = folder.trim_end_matches('/');
    let join = |name: &str| {
        if folder.is_empty() {
            format!("{name}.md")
        } else {
            format!("{folder}/{name}.md")
        }
    };

    let plain = join(base);
    if !exists(&plain) {
        return Ok(plain);
    }

    let stamped = format!("{base} {timestamp}");
    let candidate = join(&stamped);
    if !exists(&candidate) {
        return Ok(candidate);
    }

    for n in 1..=MAX_FILENAME_PROBES {
        let candidate = join(&format!("{stamped}-{n}"));
        if !exists(&candidate) {
            return Ok(candidate);
        }
    }

    Err(MemoError::FilenameExhausted {
        base: base.to_string(),
        attempts: MAX_FILENAME_PROBES + 2,
    })
}
