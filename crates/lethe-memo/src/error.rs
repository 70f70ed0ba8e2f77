//! Error types for the memo engine.

use thiserror::Error;

/// Errors that can occur in the memo engine.
///
/// Parse-level ambiguities (missing anchor, bad timestamps, absent
/// frontmatter fields) are resolved with documented fallbacks and never
/// surface here.
#[derive(Debug, Error)]
pub enum MemoError {
    /// A composition template produced an invalid regular expression.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Frontmatter value could not be emitted as YAML.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Unknown memo type string.
    #[error("Invalid memo type: {0}")]
    InvalidMemoType(String),

    /// Memo id does not have the daily-note id layout.
    #[error("Invalid memo id: {0}")]
    InvalidId(String),

    /// Unique filename probing gave up.
    #[error("No free filename for '{base}' after {attempts} attempts")]
    FilenameExhausted { base: String, attempts: usize },
}

/// Result type alias for memo engine operations.
pub type Result<T> = std::result::Result<T, MemoError>;
