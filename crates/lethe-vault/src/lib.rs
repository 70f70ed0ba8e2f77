//! Vault storage boundary for Lethe.
//!
//! Connects the pure memo engine in `lethe-memo` to a markdown vault:
//!
//! - [`Vault`]: async file operations on vault-relative paths, with a
//!   directory-backed [`FsVault`] and an in-memory [`MockVault`]
//! - [`DailyNotes`]: which file holds a given day
//! - [`PathLocks`]: one async lock per file for read-modify-write cycles
//! - [`MemoStore`]: create, list, hide and export memos in either storage mode
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use lethe_vault::{FsVault, MemoStore, StoreConfig};
//!
//! # async fn demo() -> lethe_vault::Result<()> {
//! let store = MemoStore::new(Arc::new(FsVault::new("/home/me/notes")), StoreConfig::default())?;
//! let created = store.create_memo("call the bank", Some(true)).await?;
//! println!("{}", created.memo.id);
//!
//! for memo in store.list_memos().await?.memos {
//!     println!("{} {}", memo.created_at_display(), memo.content);
//! }
//! # Ok(())
//! # }
//! ```

pub mod daily;
pub mod error;
pub mod locks;
pub mod store;
pub mod vault;

pub use daily::DailyNotes;
pub use error::{Result, StoreError, VaultError, VaultResult};
pub use locks::PathLocks;
pub use store::{CreatedMemo, HideOutcome, MemoListing, MemoStore, StoreConfig};
pub use vault::{FsVault, MockVault, SharedVault, Vault, parent_folder};

pub use lethe_config::StorageMode;
