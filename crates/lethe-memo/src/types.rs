//! Memo record types.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::MemoError;

/// Token standing in for a line break when content is flattened into one bullet line.
pub const LINE_BREAK_SENTINEL: &str = "<br>";

/// Display layout of `created_at` / `updated_at`.
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Timestamp prefix of every memo id.
pub const ID_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

// ─────────────────────────────────────────────────────────────────────────────
// Memo Type
// ─────────────────────────────────────────────────────────────────────────────

/// Kind of memo, derived once from the checkbox marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoType {
    /// Plain bullet, no checkbox.
    Journal,
    /// `[ ]`
    TaskTodo,
    /// `[x]` or `[X]`
    TaskDone,
    /// Any other checkbox marker, e.g. `[>]` or `[?]`.
    TaskCustom(char),
}

impl MemoType {
    /// Map a checkbox marker (the char inside `[...]`) to a memo type.
    pub fn from_marker(marker: Option<char>) -> Self {
        match marker {
            None => Self::Journal,
            Some(' ') => Self::TaskTodo,
            Some('x') | Some('X') => Self::TaskDone,
            Some(c) => Self::TaskCustom(c),
        }
    }

    /// The checkbox marker to write for this type, `None` for journal entries.
    pub fn marker(&self) -> Option<char> {
        match self {
            Self::Journal => None,
            Self::TaskTodo => Some(' '),
            Self::TaskDone => Some('x'),
            Self::TaskCustom(c) => Some(*c),
        }
    }

    pub fn is_task(&self) -> bool {
        !matches!(self, Self::Journal)
    }

    /// Bullet prefix (`- ` or `- [m] `) used when writing this memo as a list item.
    pub fn bullet_prefix(&self) -> String {
        match self.marker() {
            None => "- ".to_string(),
            Some(m) => format!("- [{m}] "),
        }
    }
}

impl fmt::Display for MemoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Journal => f.write_str("JOURNAL"),
            Self::TaskTodo => f.write_str("TASK-TODO"),
            Self::TaskDone => f.write_str("TASK-DONE"),
            Self::TaskCustom(c) => write!(f, "TASK-{c}"),
        }
    }
}

impl FromStr for MemoType {
    type Err = MemoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JOURNAL" => Ok(Self::Journal),
            "TASK-TODO" => Ok(Self::TaskTodo),
            "TASK-DONE" => Ok(Self::TaskDone),
            other => {
                let marker = other
                    .strip_prefix("TASK-")
                    .ok_or_else(|| MemoError::InvalidMemoType(other.to_string()))?;
                let mut chars = marker.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Self::TaskCustom(c)),
                    _ => Err(MemoError::InvalidMemoType(other.to_string())),
                }
            }
        }
    }
}

impl Serialize for MemoType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MemoType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memo Record
// ─────────────────────────────────────────────────────────────────────────────

/// Canonical memo, rebuilt from file text on every read.
///
/// The file is the persisted state; a record only references it through `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoRecord {
    pub id: String,
    pub content: String,
    #[serde(with = "timestamp_format")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp_format")]
    pub updated_at: NaiveDateTime,
    pub memo_type: MemoType,
    /// Vault-relative path of the owning file.
    pub path: String,
    /// Block anchor (`^abc123`) found at the end of the line, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_id: Option<String>,
}

impl MemoRecord {
    /// `created_at` in the `YYYY/MM/DD HH:mm:ss` layout.
    pub fn created_at_display(&self) -> String {
        self.created_at.format(TIMESTAMP_FORMAT).to_string()
    }

    /// `updated_at` in the `YYYY/MM/DD HH:mm:ss` layout.
    pub fn updated_at_display(&self) -> String {
        self.updated_at.format(TIMESTAMP_FORMAT).to_string()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Line-break sentinel
// ─────────────────────────────────────────────────────────────────────────────

/// Replace real line breaks (LF or CRLF) with the sentinel token.
pub fn flatten_content(content: &str) -> String {
    content
        .replace("\r\n", LINE_BREAK_SENTINEL)
        .replace('\n', LINE_BREAK_SENTINEL)
}

/// Replace sentinel tokens with LF line breaks.
pub fn expand_content(content: &str) -> String {
    content.replace(LINE_BREAK_SENTINEL, "\n")
}

mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    #[test]
    fn test_memo_type_from_marker() {
        assert_eq!(MemoType::from_marker(None), MemoType::Journal);
        assert_eq!(MemoType::from_marker(Some(' ')), MemoType::TaskTodo);
        assert_eq!(MemoType::from_marker(Some('x')), MemoType::TaskDone);
        assert_eq!(MemoType::from_marker(Some('X')), MemoType::TaskDone);
        assert_eq!(MemoType::from_marker(Some('>')), MemoType::TaskCustom('>'));
    }

    #[test]
    fn test_memo_type_display_and_parse() {
        for t in [
            MemoType::Journal,
            MemoType::TaskTodo,
            MemoType::TaskDone,
            MemoType::TaskCustom('?'),
        ] {
            assert_eq!(t.to_string().parse::<MemoType>().unwrap(), t);
        }
        assert_eq!(MemoType::TaskCustom('/').to_string(), "TASK-/");
        assert!("TASK-ab".parse::<MemoType>().is_err());
        assert!("NOTE".parse::<MemoType>().is_err());
    }

    #[test]
    fn test_bullet_prefix() {
        assert_eq!(MemoType::Journal.bullet_prefix(), "- ");
        assert_eq!(MemoType::TaskTodo.bullet_prefix(), "- [ ] ");
        assert_eq!(MemoType::TaskDone.bullet_prefix(), "- [x] ");
    }

    #[test]
    fn test_record_serializes_display_timestamps() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 0)
            .unwrap();
        let record = MemoRecord {
            id: "2024030907050003".into(),
            content: "hello".into(),
            created_at: at,
            updated_at: at,
            memo_type: MemoType::TaskTodo,
            path: "Daily/2024-03-09.md".into(),
            has_id: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["created_at"], "2024/03/09 07:05:00");
        assert_eq!(json["memo_type"], "TASK-TODO");
        assert!(json.get("has_id").is_none());

        let back: MemoRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_flatten_handles_crlf() {
        assert_eq!(flatten_content("a\r\nb\nc"), "a<br>b<br>c");
        assert_eq!(expand_content("a<br>b"), "a\nb");
    }

    proptest! {
        #[test]
        fn sentinel_roundtrip_is_identity(content in "[a-z ]{0,8}(\n[a-z ]{0,8}){0,4}") {
            let flat = flatten_content(&content);
            prop_assert!(!flat.contains('\n'));
            prop_assert_eq!(expand_content(&flat), content);
        }
    }
}
