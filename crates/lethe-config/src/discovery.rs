//! Config file discovery and layered merging.
//!
//! Resolution order (later overrides earlier):
//! 1. `~/.config/lethe/config.toml` (user config)
//! 2. `<vault>/lethe.toml` (vault-local)
//! 3. CLI arguments (handled externally)

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{ConfigError, LetheConfig, Result};

/// Config filename inside a vault.
pub const VAULT_CONFIG_FILE: &str = "lethe.toml";

/// Config filename within the user config directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// Application name for config directory resolution.
const APP_NAME: &str = "lethe";

/// Environment variable to override the config directory.
const CONFIG_DIR_ENV: &str = "LETHE_CONFIG_DIR";

/// Tracks where each config layer was loaded from.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub path: PathBuf,
    /// Whether the file was found and loaded.
    pub loaded: bool,
}

/// Result of config discovery and loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged configuration.
    pub config: LetheConfig,
    /// Sources that were checked, lowest precedence first.
    pub sources: Vec<ConfigSource>,
    /// Warnings generated during loading (unreadable layers, inactive template).
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Paths of sources that were actually loaded.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }
}

/// Load configuration by discovering and merging all config layers.
pub fn load_config(vault_dir: Option<&Path>) -> Result<LoadedConfig> {
    load_config_with_options(vault_dir, None)
}

/// Load configuration with explicit control over the user config directory.
///
/// `config_dir` overrides both `LETHE_CONFIG_DIR` and the platform default.
pub fn load_config_with_options(
    vault_dir: Option<&Path>,
    config_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    let mut config = LetheConfig::new();
    let mut sources = Vec::new();
    let mut warnings = Vec::new();

    let user_config_path = match config_dir {
        Some(dir) => Some(dir.join(USER_CONFIG_FILE)),
        None => user_config_path(),
    };
    if let Some(path) = user_config_path {
        sources.push(load_layer(&mut config, &path, &mut warnings)?);
    }

    // A vault named by the user layer counts when no vault was given.
    let vault_dir = vault_dir
        .map(Path::to_path_buf)
        .or_else(|| config.storage.as_ref().and_then(|s| s.vault.clone()));
    if let Some(dir) = vault_dir {
        sources.push(load_layer(&mut config, &dir.join(VAULT_CONFIG_FILE), &mut warnings)?);
    }

    check_settings(&config, &mut warnings);

    Ok(LoadedConfig {
        config,
        sources,
        warnings,
    })
}

/// Load config from a specific file path (no discovery).
pub fn load_config_file(path: &Path) -> Result<LetheConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    LetheConfig::from_toml(&contents)
}

/// Save configuration to a file, creating parent directories.
pub fn save_config(config: &LetheConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFile {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let contents = config.to_toml()?;
    std::fs::write(path, contents).map_err(|e| ConfigError::WriteFile {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// Path of the user config file.
pub fn user_config_path() -> Option<PathBuf> {
    user_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// User config directory: `LETHE_CONFIG_DIR`, else the platform default.
pub fn user_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Try to load a config file and merge it into the existing config.
///
/// A missing file is skipped; an unreadable or malformed one becomes a warning.
fn load_layer(
    config: &mut LetheConfig,
    path: &Path,
    warnings: &mut Vec<String>,
) -> Result<ConfigSource> {
    if !path.is_file() {
        return Ok(ConfigSource {
            path: path.to_path_buf(),
            loaded: false,
        });
    }

    match load_config_file(path) {
        Ok(layer) => {
            debug!(path = %path.display(), "loaded config layer");
            config.merge(layer);
            Ok(ConfigSource {
                path: path.to_path_buf(),
                loaded: true,
            })
        }
        Err(e) => {
            warnings.push(format!("Failed to load {}: {}", path.display(), e));
            Ok(ConfigSource {
                path: path.to_path_buf(),
                loaded: false,
            })
        }
    }
}

fn check_settings(config: &LetheConfig, warnings: &mut Vec<String>) {
    let memo = config.memo();
    if !memo.composition.is_empty() && !memo.composition_is_active() {
        warnings.push(format!(
            "[memo] composition '{}' needs exactly one {{TIME}} and one {{CONTENT}}; \
             the default layout is used instead.",
            memo.composition
        ));
    }

    let daily = config.daily_notes();
    if !daily.format.contains('%') {
        warnings.push(format!(
            "[daily_notes] format '{}' has no date fields; every day maps to the same note.",
            daily.format
        ));
    }
    if daily.insert_after.trim().is_empty() {
        warnings.push(
            "[daily_notes] insert_after is empty; memos are appended at the end of the note."
                .to_string(),
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
