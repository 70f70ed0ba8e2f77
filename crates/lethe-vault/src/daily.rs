//! Daily-note resolution: which file holds a given day.

use std::fmt::Write;

use chrono::NaiveDate;

use crate::error::{Result, StoreError};
use crate::vault::MARKDOWN_EXTENSION;

/// Maps calendar days to daily-note paths and back.
///
/// The date format may contain `/` to nest notes in sub-folders
/// (e.g. `%Y/%m/%Y-%m-%d`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyNotes {
    folder: String,
    format: String,
}

impl DailyNotes {
    /// Fails if `format` is not a chrono date format.
    pub fn new(folder: impl Into<String>, format: impl Into<String>) -> Result<Self> {
        let folder = folder.into().trim_matches('/').to_string();
        let format = format.into();

        let probe = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default();
        let mut rendered = String::new();
        if format.trim().is_empty() || write!(rendered, "{}", probe.format(&format)).is_err() {
            return Err(StoreError::InvalidDateFormat(format));
        }

        Ok(Self { folder, format })
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// Vault path of the note for `date`.
    pub fn path_for(&self, date: NaiveDate) -> String {
        let stem = self.title_for(date);
        if self.folder.is_empty() {
            format!("{stem}.{MARKDOWN_EXTENSION}")
        } else {
            format!("{}/{stem}.{MARKDOWN_EXTENSION}", self.folder)
        }
    }

    /// Note title (file stem) for `date`.
    pub fn title_for(&self, date: NaiveDate) -> String {
        // The format was validated in `new`.
        date.format(&self.format).to_string()
    }

    /// Day a daily-note path stands for, `None` for any other file.
    pub fn date_of_file(&self, path: &str) -> Option<NaiveDate> {
        let relative = if self.folder.is_empty() {
            path
        } else {
            path.strip_prefix(&self.folder)?.strip_prefix('/')?
        };
        let stem = relative.strip_suffix(&format!(".{MARKDOWN_EXTENSION}"))?;
        NaiveDate::parse_from_str(stem, &self.format).ok()
    }
}
