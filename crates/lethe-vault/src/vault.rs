//! Vault abstraction: the markdown folder memos live in.
//!
//! # Architecture
//!
//! ```text
//! Vault (trait)        - async file operations on vault-relative paths
//!     └── FsVault      - a directory on disk (tokio::fs)
//!     └── MockVault    - in-memory vault for testing
//! ```
//!
//! Paths are vault-relative and use `/` separators on every platform.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime};
use lethe_memo::{FileTimes, Frontmatter};
use parking_lot::Mutex;

use crate::error::{VaultError, VaultResult};

/// Extension of files the store reads and writes.
pub const MARKDOWN_EXTENSION: &str = "md";

// ─────────────────────────────────────────────────────────────────────────────
// Vault Trait
// ─────────────────────────────────────────────────────────────────────────────

/// File operations the memo store needs from its host.
#[async_trait]
pub trait Vault: Send + Sync {
    /// Read a whole file as UTF-8.
    async fn read_text(&self, path: &str) -> VaultResult<String>;

    /// Replace a file's contents, creating it if needed.
    async fn write_text(&self, path: &str, text: &str) -> VaultResult<()>;

    /// Markdown files under `folder`, recursively, sorted by path.
    ///
    /// A missing folder is [`VaultError::NotFound`].
    async fn list_files(&self, folder: &str) -> VaultResult<Vec<String>>;

    /// Create a folder and its parents. Existing folders are fine.
    async fn create_folder(&self, path: &str) -> VaultResult<()>;

    /// Create a new file; fails with [`VaultError::AlreadyExists`] if it exists.
    async fn create_file(&self, path: &str, text: &str) -> VaultResult<()>;

    async fn exists(&self, path: &str) -> VaultResult<bool>;

    async fn file_times(&self, path: &str) -> VaultResult<FileTimes>;

    async fn remove_file(&self, path: &str) -> VaultResult<()>;

    /// Frontmatter the host has already parsed, if it keeps a metadata cache.
    async fn frontmatter_of(&self, _path: &str) -> Option<Frontmatter> {
        None
    }
}

/// A shared vault that can be used across tasks.
pub type SharedVault = Arc<dyn Vault>;

/// Parent folder of a vault path, `""` for top-level files.
pub fn parent_folder(path: &str) -> &str {
    path.rfind('/').map(|i| &path[..i]).unwrap_or("")
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == MARKDOWN_EXTENSION)
}

// ─────────────────────────────────────────────────────────────────────────────
// Filesystem Vault
// ─────────────────────────────────────────────────────────────────────────────

/// Vault backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a vault path onto disk, refusing anything that leaves the root.
    fn resolve(&self, path: &str) -> VaultResult<PathBuf> {
        let relative = Path::new(path);
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => return Err(VaultError::InvalidPath(path.to_string())),
            }
        }
        Ok(self.root.join(relative))
    }

    fn to_vault_path(&self, full: &Path) -> Option<String> {
        let relative = full.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

fn to_naive_local(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}

#[async_trait]
impl Vault for FsVault {
    async fn read_text(&self, path: &str) -> VaultResult<String> {
        let full = self.resolve(path)?;
        tokio::fs::read_to_string(&full)
            .await
            .map_err(|e| VaultError::from_io(path, e))
    }

    async fn write_text(&self, path: &str, text: &str) -> VaultResult<()> {
        let full = self.resolve(path)?;
        tokio::fs::write(&full, text)
            .await
            .map_err(|e| VaultError::from_io(path, e))
    }

    async fn list_files(&self, folder: &str) -> VaultResult<Vec<String>> {
        let start = self.resolve(folder)?;
        if !tokio::fs::metadata(&start)
            .await
            .map_err(|e| VaultError::from_io(folder, e))?
            .is_dir()
        {
            return Err(VaultError::NotFound(folder.to_string()));
        }

        let mut files = Vec::new();
        let mut pending = vec![start];
        while let Some(dir) = pending.pop() {
            let dir_label = dir.display().to_string();
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .map_err(|e| VaultError::from_io(&dir_label, e))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| VaultError::from_io(&dir_label, e))?
            {
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| VaultError::from_io(&dir_label, e))?;
                let entry_path = entry.path();
                if file_type.is_dir() {
                    pending.push(entry_path);
                } else if is_markdown(&entry_path)
                    && let Some(vault_path) = self.to_vault_path(&entry_path)
                {
                    files.push(vault_path);
                }
            }
        }

        files.sort();
        Ok(files)
    }

    async fn create_folder(&self, path: &str) -> VaultResult<()> {
        let full = self.resolve(path)?;
        tokio::fs::create_dir_all(&full)
            .await
            .map_err(|e| VaultError::from_io(path, e))
    }

    async fn create_file(&self, path: &str, text: &str) -> VaultResult<()> {
        use tokio::io::AsyncWriteExt;

        let full = self.resolve(path)?;
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full)
            .await
            .map_err(|e| VaultError::from_io(path, e))?;
        file.write_all(text.as_bytes())
            .await
            .map_err(|e| VaultError::from_io(path, e))?;
        file.flush().await.map_err(|e| VaultError::from_io(path, e))
    }

    async fn exists(&self, path: &str) -> VaultResult<bool> {
        let full = self.resolve(path)?;
        tokio::fs::try_exists(&full)
            .await
            .map_err(|e| VaultError::from_io(path, e))
    }

    async fn file_times(&self, path: &str) -> VaultResult<FileTimes> {
        let full = self.resolve(path)?;
        let meta = tokio::fs::metadata(&full)
            .await
            .map_err(|e| VaultError::from_io(path, e))?;
        let modified = meta.modified().map_err(|e| VaultError::from_io(path, e))?;
        // Birth time is not available on every filesystem.
        let created = meta.created().unwrap_or(modified);
        Ok(FileTimes {
            created: to_naive_local(created),
            modified: to_naive_local(modified),
        })
    }

    async fn remove_file(&self, path: &str) -> VaultResult<()> {
        let full = self.resolve(path)?;
        tokio::fs::remove_file(&full)
            .await
            .map_err(|e| VaultError::from_io(path, e))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mock Vault
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct MockFile {
    text: String,
    times: FileTimes,
}

#[derive(Debug, Default)]
struct MockState {
    files: BTreeMap<String, MockFile>,
    folders: BTreeSet<String>,
    frontmatter: BTreeMap<String, Frontmatter>,
    fail_writes: bool,
}

/// In-memory vault for testing.
///
/// Folders must exist before files are created in them, like on disk.
/// Every file gets the same timestamps, settable with [`MockVault::set_now`].
#[derive(Debug)]
pub struct MockVault {
    state: Mutex<MockState>,
    now: Mutex<NaiveDateTime>,
}

impl Default for MockVault {
    fn default() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            now: Mutex::new(DateTime::<chrono::Utc>::UNIX_EPOCH.naive_utc()),
        }
    }
}

impl MockVault {
    /// Create a new empty mock vault.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a file, creating its folders.
    pub fn with_file(self, path: &str, text: &str) -> Self {
        self.insert_file(path, text);
        self
    }

    /// Add or replace a file, creating its folders.
    pub fn insert_file(&self, path: &str, text: &str) {
        let times = self.times();
        let mut state = self.state.lock();
        add_folder_chain(&mut state.folders, parent_folder(path));
        state.files.insert(
            path.to_string(),
            MockFile {
                text: text.to_string(),
                times,
            },
        );
    }

    /// Timestamp given to files created or written from now on.
    pub fn set_now(&self, now: NaiveDateTime) {
        *self.now.lock() = now;
    }

    /// Override the file times of an existing file.
    pub fn set_file_times(&self, path: &str, times: FileTimes) {
        if let Some(file) = self.state.lock().files.get_mut(path) {
            file.times = times;
        }
    }

    /// Frontmatter returned by [`Vault::frontmatter_of`] for `path`.
    pub fn set_frontmatter(&self, path: &str, frontmatter: Frontmatter) {
        self.state
            .lock()
            .frontmatter
            .insert(path.to_string(), frontmatter);
    }

    /// Make every mutating call fail with an I/O error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// Current text of a file, for assertions.
    pub fn file(&self, path: &str) -> Option<String> {
        self.state.lock().files.get(path).map(|f| f.text.clone())
    }

    /// All file paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.state.lock().files.keys().cloned().collect()
    }

    fn times(&self) -> FileTimes {
        let now = *self.now.lock();
        FileTimes {
            created: now,
            modified: now,
        }
    }

    fn check_writable(state: &MockState, path: &str) -> VaultResult<()> {
        if state.fail_writes {
            return Err(VaultError::Io {
                path: path.to_string(),
                source: std::io::Error::other("mock write failure"),
            });
        }
        let parent = parent_folder(path);
        if !parent.is_empty() && !state.folders.contains(parent) {
            return Err(VaultError::NotFound(parent.to_string()));
        }
        Ok(())
    }
}

fn add_folder_chain(folders: &mut BTreeSet<String>, folder: &str) {
    let mut current = String::new();
    for part in folder.split('/').filter(|p| !p.is_empty()) {
        if !current.is_empty() {
            current.push('/');
        }
        current.push_str(part);
        folders.insert(current.clone());
    }
}

#[async_trait]
impl Vault for MockVault {
    async fn read_text(&self, path: &str) -> VaultResult<String> {
        self.file(path)
            .ok_or_else(|| VaultError::NotFound(path.to_string()))
    }

    async fn write_text(&self, path: &str, text: &str) -> VaultResult<()> {
        let times = self.times();
        let mut state = self.state.lock();
        Self::check_writable(&state, path)?;
        let created = state.files.get(path).map(|f| f.times.created);
        state.files.insert(
            path.to_string(),
            MockFile {
                text: text.to_string(),
                times: FileTimes {
                    created: created.unwrap_or(times.created),
                    modified: times.modified,
                },
            },
        );
        Ok(())
    }

    async fn list_files(&self, folder: &str) -> VaultResult<Vec<String>> {
        let state = self.state.lock();
        let folder = folder.trim_end_matches('/');
        if !folder.is_empty() && !state.folders.contains(folder) {
            return Err(VaultError::NotFound(folder.to_string()));
        }
        let prefix = if folder.is_empty() {
            String::new()
        } else {
            format!("{folder}/")
        };
        Ok(state
            .files
            .keys()
            .filter(|p| p.starts_with(&prefix) && is_markdown(Path::new(p.as_str())))
            .cloned()
            .collect())
    }

    async fn create_folder(&self, path: &str) -> VaultResult<()> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(VaultError::Io {
                path: path.to_string(),
                source: std::io::Error::other("mock write failure"),
            });
        }
        add_folder_chain(&mut state.folders, path);
        Ok(())
    }

    async fn create_file(&self, path: &str, text: &str) -> VaultResult<()> {
        let times = self.times();
        let mut state = self.state.lock();
        Self::check_writable(&state, path)?;
        if state.files.contains_key(path) {
            return Err(VaultError::AlreadyExists(path.to_string()));
        }
        state.files.insert(
            path.to_string(),
            MockFile {
                text: text.to_string(),
                times,
            },
        );
        Ok(())
    }

    async fn exists(&self, path: &str) -> VaultResult<bool> {
        let state = self.state.lock();
        Ok(state.files.contains_key(path) || state.folders.contains(path))
    }

    async fn file_times(&self, path: &str) -> VaultResult<FileTimes> {
        self.state
            .lock()
            .files
            .get(path)
            .map(|f| f.times)
            .ok_or_else(|| VaultError::NotFound(path.to_string()))
    }

    async fn remove_file(&self, path: &str) -> VaultResult<()> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(VaultError::Io {
                path: path.to_string(),
                source: std::io::Error::other("mock write failure"),
            });
        }
        state.frontmatter.remove(path);
        state
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| VaultError::NotFound(path.to_string()))
    }

    async fn frontmatter_of(&self, path: &str) -> Option<Frontmatter> {
        self.state.lock().frontmatter.get(path).cloned()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parent_folder() {
        assert_eq!(parent_folder("a/b/c.md"), "a/b");
        assert_eq!(parent_folder("c.md"), "");
    }

    #[tokio::test]
    async fn test_fs_vault_roundtrip() {
        let dir = TempDir::new().unwrap();
        let vault = FsVault::new(dir.path());

        vault.create_folder("Daily/2024").await.unwrap();
        vault.create_file("Daily/2024/a.md", "one").await.unwrap();
        vault.write_text("Daily/b.md", "two").await.unwrap();
        vault.write_text("Daily/skip.txt", "x").await.unwrap();

        assert_eq!(vault.read_text("Daily/2024/a.md").await.unwrap(), "one");
        assert!(vault.exists("Daily/b.md").await.unwrap());
        assert!(!vault.exists("Daily/c.md").await.unwrap());
        assert_eq!(
            vault.list_files("Daily").await.unwrap(),
            vec!["Daily/2024/a.md", "Daily/b.md"]
        );

        assert!(vault.file_times("Daily/b.md").await.is_ok());

        vault.remove_file("Daily/b.md").await.unwrap();
        assert!(!vault.exists("Daily/b.md").await.unwrap());
    }

    #[tokio::test]
    async fn test_fs_vault_errors() {
        let dir = TempDir::new().unwrap();
        let vault = FsVault::new(dir.path());

        assert!(matches!(
            vault.list_files("missing").await,
            Err(VaultError::NotFound(_))
        ));
        assert!(matches!(
            vault.read_text("missing.md").await,
            Err(VaultError::NotFound(_))
        ));
        assert!(matches!(
            vault.read_text("../outside.md").await,
            Err(VaultError::InvalidPath(_))
        ));

        vault.create_file("x.md", "1").await.unwrap();
        assert!(matches!(
            vault.create_file("x.md", "2").await,
            Err(VaultError::AlreadyExists(_))
        ));
        assert_eq!(vault.read_text("x.md").await.unwrap(), "1");
    }

    #[tokio::test]
    async fn test_mock_vault_behaves_like_disk() {
        let vault = MockVault::new();
        assert!(matches!(
            vault.create_file("Memos/a.md", "x").await,
            Err(VaultError::NotFound(_))
        ));
        assert!(matches!(
            vault.list_files("Memos").await,
            Err(VaultError::NotFound(_))
        ));

        vault.create_folder("Memos/sub").await.unwrap();
        vault.create_file("Memos/a.md", "x").await.unwrap();
        vault.create_file("Memos/sub/b.md", "y").await.unwrap();
        assert!(matches!(
            vault.create_file("Memos/a.md", "z").await,
            Err(VaultError::AlreadyExists(_))
        ));
        assert_eq!(
            vault.list_files("Memos").await.unwrap(),
            vec!["Memos/a.md", "Memos/sub/b.md"]
        );
        assert!(vault.frontmatter_of("Memos/a.md").await.is_none());

        vault.set_fail_writes(true);
        assert!(matches!(
            vault.write_text("Memos/a.md", "w").await,
            Err(VaultError::Io { .. })
        ));
        assert_eq!(vault.file("Memos/a.md").as_deref(), Some("x"));
    }
}
