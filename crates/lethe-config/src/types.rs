//! Configuration types mapping to the TOML schema.
//!
//! Top-level config:
//! ```toml
//! [storage]        # storage mode and vault location
//! [daily_notes]    # daily-note folder, date format, anchor heading
//! [individual]     # one-file-per-memo settings
//! [memo]           # composition template and default memo type
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Built-in defaults.
pub mod defaults {
    pub const DAILY_FOLDER: &str = "Daily";
    pub const DAILY_FORMAT: &str = "%Y-%m-%d";
    pub const INSERT_AFTER: &str = "# Journal";
    pub const INDIVIDUAL_FOLDER: &str = "Thino/Memos";
    pub const FILENAME_LENGTH: usize = 50;
    pub const COMPOSITION: &str = "{TIME} {CONTENT}";
}

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g. a vault-local
/// override) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LetheConfig {
    pub storage: Option<StorageConfig>,
    pub daily_notes: Option<DailyNotesConfig>,
    pub individual: Option<IndividualConfig>,
    pub memo: Option<MemoConfig>,
}

impl LetheConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections are replaced whole, not field by field.
    pub fn merge(&mut self, other: LetheConfig) {
        if other.storage.is_some() {
            self.storage = other.storage;
        }
        if other.daily_notes.is_some() {
            self.daily_notes = other.daily_notes;
        }
        if other.individual.is_some() {
            self.individual = other.individual;
        }
        if other.memo.is_some() {
            self.memo = other.memo;
        }
    }

    /// Effective `[storage]` section.
    pub fn storage(&self) -> StorageConfig {
        self.storage.clone().unwrap_or_default()
    }

    /// Effective `[daily_notes]` section.
    pub fn daily_notes(&self) -> DailyNotesConfig {
        self.daily_notes.clone().unwrap_or_default()
    }

    /// Effective `[individual]` section.
    pub fn individual(&self) -> IndividualConfig {
        self.individual.clone().unwrap_or_default()
    }

    /// Effective `[memo]` section.
    pub fn memo(&self) -> MemoConfig {
        self.memo.clone().unwrap_or_default()
    }

    /// Read a single value by `section.key`.
    pub fn get_value(&self, key: &str) -> Result<String> {
        let value = match key {
            "storage.mode" => self.storage().mode.to_string(),
            "storage.vault" => self
                .storage()
                .vault
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            "daily_notes.folder" => self.daily_notes().folder,
            "daily_notes.format" => self.daily_notes().format,
            "daily_notes.insert_after" => self.daily_notes().insert_after,
            "daily_notes.template" => self.daily_notes().template.unwrap_or_default(),
            "daily_notes.precreate" => self.daily_notes().precreate.to_string(),
            "individual.folder" => self.individual().folder,
            "individual.filename_length" => self.individual().filename_length.to_string(),
            "individual.tags" => self.individual().tags.join(","),
            "memo.composition" => self.memo().composition,
            "memo.default_prefix" => self.memo().default_prefix.to_string(),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        Ok(value)
    }

    /// Set a single value by `section.key`, materializing the section with
    /// defaults if it was absent.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason,
        };
        let optional = |v: &str| (!v.is_empty()).then(|| v.to_string());

        match key {
            "storage.mode" => {
                self.storage.get_or_insert_with(Default::default).mode =
                    value.parse().map_err(invalid)?;
            }
            "storage.vault" => {
                self.storage.get_or_insert_with(Default::default).vault =
                    optional(value).map(PathBuf::from);
            }
            "daily_notes.folder" => {
                self.daily_notes.get_or_insert_with(Default::default).folder = value.to_string();
            }
            "daily_notes.format" => {
                self.daily_notes.get_or_insert_with(Default::default).format = value.to_string();
            }
            "daily_notes.insert_after" => {
                self.daily_notes.get_or_insert_with(Default::default).insert_after =
                    value.to_string();
            }
            "daily_notes.template" => {
                self.daily_notes.get_or_insert_with(Default::default).template = optional(value);
            }
            "daily_notes.precreate" => {
                self.daily_notes.get_or_insert_with(Default::default).precreate =
                    value.parse().map_err(|e: std::str::ParseBoolError| invalid(e.to_string()))?;
            }
            "individual.folder" => {
                self.individual.get_or_insert_with(Default::default).folder = value.to_string();
            }
            "individual.filename_length" => {
                let length: usize = value
                    .parse()
                    .map_err(|e: std::num::ParseIntError| invalid(e.to_string()))?;
                if length == 0 {
                    return Err(invalid("must be at least 1".to_string()));
                }
                self.individual.get_or_insert_with(Default::default).filename_length = length;
            }
            "individual.tags" => {
                self.individual.get_or_insert_with(Default::default).tags = value
                    .split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect();
            }
            "memo.composition" => {
                self.memo.get_or_insert_with(Default::default).composition = value.to_string();
            }
            "memo.default_prefix" => {
                self.memo.get_or_insert_with(Default::default).default_prefix =
                    value.parse().map_err(invalid)?;
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

/// Every key accepted by [`LetheConfig::get_value`] and [`LetheConfig::set_value`].
pub const CONFIG_KEYS: &[&str] = &[
    "storage.mode",
    "storage.vault",
    "daily_notes.folder",
    "daily_notes.format",
    "daily_notes.insert_after",
    "daily_notes.template",
    "daily_notes.precreate",
    "individual.folder",
    "individual.filename_length",
    "individual.tags",
    "memo.composition",
    "memo.default_prefix",
];

// ─────────────────────────────────────────────────────────────────────────────
// Storage
// ─────────────────────────────────────────────────────────────────────────────

/// Where memos are persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageMode {
    /// Bullet lines inside the day's daily note.
    DailyNotes,
    /// One markdown file with frontmatter per memo.
    #[default]
    IndividualFiles,
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DailyNotes => f.write_str("daily-notes"),
            Self::IndividualFiles => f.write_str("individual-files"),
        }
    }
}

impl FromStr for StorageMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "daily-notes" => Ok(Self::DailyNotes),
            "individual-files" => Ok(Self::IndividualFiles),
            other => Err(format!(
                "unknown storage mode '{other}' (expected daily-notes or individual-files)"
            )),
        }
    }
}

/// `[storage]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub mode: StorageMode,
    /// Vault root. The CLI's `--vault` flag takes precedence.
    pub vault: Option<PathBuf>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Daily Notes
// ─────────────────────────────────────────────────────────────────────────────

/// `[daily_notes]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyNotesConfig {
    /// Vault-relative folder holding daily notes.
    pub folder: String,
    /// chrono format of a daily note's file stem.
    pub format: String,
    /// Anchor heading after which memos are inserted.
    pub insert_after: String,
    /// Vault-relative path of a template file used to seed new daily notes.
    pub template: Option<String>,
    /// Create today's and tomorrow's notes ahead of time.
    pub precreate: bool,
}

impl Default for DailyNotesConfig {
    fn default() -> Self {
        Self {
            folder: defaults::DAILY_FOLDER.to_string(),
            format: defaults::DAILY_FORMAT.to_string(),
            insert_after: defaults::INSERT_AFTER.to_string(),
            template: None,
            precreate: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Individual Files
// ─────────────────────────────────────────────────────────────────────────────

/// `[individual]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndividualConfig {
    /// Vault-relative folder holding memo files.
    pub folder: String,
    /// Maximum characters of content used in a filename.
    pub filename_length: usize,
    /// Tags written into every new memo's frontmatter.
    pub tags: Vec<String>,
}

impl Default for IndividualConfig {
    fn default() -> Self {
        Self {
            folder: defaults::INDIVIDUAL_FOLDER.to_string(),
            filename_length: defaults::FILENAME_LENGTH,
            tags: Vec::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memo
// ─────────────────────────────────────────────────────────────────────────────

/// Memo type used when a capture doesn't say.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultPrefix {
    #[default]
    List,
    Task,
}

impl DefaultPrefix {
    pub fn is_task(&self) -> bool {
        matches!(self, Self::Task)
    }
}

impl fmt::Display for DefaultPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => f.write_str("list"),
            Self::Task => f.write_str("task"),
        }
    }
}

impl FromStr for DefaultPrefix {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "list" => Ok(Self::List),
            "task" => Ok(Self::Task),
            other => Err(format!("unknown prefix '{other}' (expected list or task)")),
        }
    }
}

/// `[memo]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoConfig {
    /// Composition template with `{TIME}` and `{CONTENT}` placeholders.
    pub composition: String,
    pub default_prefix: DefaultPrefix,
}

impl Default for MemoConfig {
    fn default() -> Self {
        Self {
            composition: defaults::COMPOSITION.to_string(),
            default_prefix: DefaultPrefix::List,
        }
    }
}

impl MemoConfig {
    /// Whether the composition template has exactly one `{TIME}` and one
    /// `{CONTENT}`; otherwise the default line layout is used.
    pub fn composition_is_active(&self) -> bool {
        self.composition.matches("{TIME}").count() == 1
            && self.composition.matches("{CONTENT}").count() == 1
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config() {
        let config = LetheConfig::new();
        assert!(config.storage.is_none());
        assert!(config.memo.is_none());
        assert_eq!(config.storage().mode, StorageMode::IndividualFiles);
        assert_eq!(config.daily_notes().insert_after, "# Journal");
        assert_eq!(config.individual().folder, "Thino/Memos");
        assert_eq!(config.individual().filename_length, 50);
        assert_eq!(config.memo().composition, "{TIME} {CONTENT}");
    }

    #[test]
    fn test_parse_full() {
        let toml = r###"
[storage]
mode = "daily-notes"
vault = "/home/me/notes"

[daily_notes]
folder = "Journal"
format = "%Y%m%d"
insert_after = "## Log"
template = "Templates/Daily.md"
precreate = true

[individual]
folder = "Memos"
filename_length = 20
tags = ["inbox", "memo"]

[memo]
composition = "⏰ {TIME} — {CONTENT}"
default_prefix = "task"
"###;
        let config = LetheConfig::from_toml(toml).unwrap();
        let storage = config.storage();
        assert_eq!(storage.mode, StorageMode::DailyNotes);
        assert_eq!(storage.vault, Some(PathBuf::from("/home/me/notes")));

        let daily = config.daily_notes();
        assert_eq!(daily.folder, "Journal");
        assert_eq!(daily.insert_after, "## Log");
        assert_eq!(daily.template.as_deref(), Some("Templates/Daily.md"));
        assert!(daily.precreate);

        assert_eq!(config.individual().tags, vec!["inbox", "memo"]);
        assert_eq!(config.memo().default_prefix, DefaultPrefix::Task);
        assert!(config.memo().composition_is_active());
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let config = LetheConfig::from_toml("[daily_notes]\nfolder = \"J\"\n").unwrap();
        let daily = config.daily_notes();
        assert_eq!(daily.folder, "J");
        assert_eq!(daily.format, "%Y-%m-%d");
        assert!(!daily.precreate);
    }

    #[test]
    fn test_invalid_mode_rejected() {
        let err = LetheConfig::from_toml("[storage]\nmode = \"cloud\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_merge_other_wins() {
        let mut base = LetheConfig::from_toml("[memo]\ncomposition = \"{CONTENT} {TIME}\"\n[individual]\nfolder = \"A\"\n").unwrap();
        let over = LetheConfig::from_toml("[individual]\nfolder = \"B\"\n").unwrap();
        base.merge(over);
        assert_eq!(base.individual().folder, "B");
        assert_eq!(base.memo().composition, "{CONTENT} {TIME}");
    }

    #[test]
    fn test_roundtrip_toml() {
        let mut config = LetheConfig::new();
        config.set_value("storage.mode", "daily-notes").unwrap();
        config.set_value("individual.tags", "a, b,,c").unwrap();
        let text = config.to_toml().unwrap();
        let back = LetheConfig::from_toml(&text).unwrap();
        assert_eq!(back, config);
        assert_eq!(back.individual().tags, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_get_set_values() {
        let mut config = LetheConfig::new();
        for key in CONFIG_KEYS {
            assert!(config.get_value(key).is_ok(), "{key}");
        }

        config.set_value("memo.default_prefix", "TASK").unwrap();
        assert_eq!(config.get_value("memo.default_prefix").unwrap(), "task");

        config.set_value("daily_notes.template", "").unwrap();
        assert!(config.daily_notes().template.is_none());

        assert!(matches!(
            config.set_value("nope.key", "x"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            config.set_value("individual.filename_length", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set_value("daily_notes.precreate", "maybe"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set_value("storage.mode", "cloud"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_composition_activity() {
        let mut memo = MemoConfig::default();
        assert!(memo.composition_is_active());
        memo.composition = "{TIME} {CONTENT} {CONTENT}".into();
        assert!(!memo.composition_is_active());
        memo.composition = String::new();
        assert!(!memo.composition_is_active());
    }
}
