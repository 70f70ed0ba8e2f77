//! Error types for vault access and the memo store.

use thiserror::Error;

/// Errors raised by a [`Vault`](crate::Vault) implementation.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Underlying I/O failure, passed through untouched.
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// File or folder does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// `create_file` target already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Path escapes the vault or is otherwise unusable.
    #[error("Invalid vault path: {0}")]
    InvalidPath(String),
}

impl VaultError {
    /// Classify an `io::Error` for `path`.
    pub fn from_io(path: &str, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_string()),
            std::io::ErrorKind::AlreadyExists => Self::AlreadyExists(path.to_string()),
            _ => Self::Io {
                path: path.to_string(),
                source,
            },
        }
    }
}

/// Errors raised by [`MemoStore`](crate::MemoStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error(transparent)]
    Memo(#[from] lethe_memo::MemoError),

    /// Refused to capture a memo with no visible content.
    #[error("Memo content is empty")]
    EmptyContent,

    /// Id does not decode for the active storage mode.
    #[error("Invalid memo id: {0}")]
    InvalidId(String),

    /// Daily-note date format is not a usable chrono format.
    #[error("Invalid daily note format '{0}'")]
    InvalidDateFormat(String),
}

/// Result type alias for vault operations.
pub type VaultResult<T> = std::result::Result<T, VaultError>;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
