//! CLI command handlers.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use chrono::Local;
use console::Style;
use lethe_config::LoadedConfig;
use lethe_vault::{FsVault, MemoStore, StoreConfig};
use tracing::debug;

pub mod add;
pub mod config;
pub mod export;
pub mod hide;
pub mod list;
pub mod precreate;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Vault directory from `--vault` / `LETHE_VAULT`.
    pub vault: Option<PathBuf>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Load the layered configuration for the selected vault.
    pub fn load_config(&self) -> Result<LoadedConfig> {
        let loaded = lethe_config::load_config(self.vault.as_deref())?;
        if !self.json_output {
            let yellow = Style::new().yellow();
            for warning in &loaded.warnings {
                eprintln!("{} {}", yellow.apply_to("Warning:"), warning);
            }
        }
        Ok(loaded)
    }

    /// Vault directory: the flag wins over `storage.vault`.
    pub fn vault_dir(&self, loaded: &LoadedConfig) -> Result<PathBuf> {
        match self.vault.clone().or_else(|| loaded.config.storage().vault) {
            Some(dir) => Ok(dir),
            None => bail!("no vault selected: pass --vault, set LETHE_VAULT, or set storage.vault"),
        }
    }

    /// Open the memo store for the selected vault.
    ///
    /// Pre-creates today's and tomorrow's daily notes when configured to.
    pub async fn open_store(&self) -> Result<MemoStore> {
        let loaded = self.load_config()?;
        let root = self.vault_dir(&loaded)?;
        if !root.is_dir() {
            bail!("vault directory '{}' does not exist", root.display());
        }
        debug!(vault = %root.display(), sources = ?loaded.loaded_from(), "opening store");

        let store = MemoStore::new(
            Arc::new(FsVault::new(root)),
            StoreConfig::from(&loaded.config),
        )
        .context("invalid memo settings")?;

        if loaded.config.daily_notes().precreate {
            store
                .precreate_daily_notes(Local::now().date_naive())
                .await?;
        }
        Ok(store)
    }
}

/// Shorten to `max_chars`, flattening line breaks.
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    let s = lethe_memo::expand_content(s).replace('\n', " ");
    if s.chars().count() <= max_chars {
        s
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
