//! Configuration system for the Lethe memo tool.
//!
//! Provides TOML-based configuration with:
//! - Storage mode selection (`daily-notes` or `individual-files`)
//! - Daily-note location, date format and anchor heading
//! - Individual-file folder, filename length and tags
//! - Composition template and default memo type
//! - Config file layering (user config + vault-local `lethe.toml`)

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    load_config, load_config_file, load_config_with_options, save_config, user_config_dir,
    user_config_path, ConfigSource, LoadedConfig, VAULT_CONFIG_FILE,
};
pub use error::{ConfigError, Result};
pub use types::*;
