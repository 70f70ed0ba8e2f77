//! Config command - configuration management.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use console::{Style, style};

use lethe_config::{self, CONFIG_KEYS, LetheConfig, VAULT_CONFIG_FILE};

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the merged configuration
    Show,

    /// Show which config files are loaded and their precedence
    Which,

    /// Print one value (`section.key`)
    Get {
        /// Key, e.g. memo.composition
        key: String,
    },

    /// Set one value (`section.key`) in the user config
    Set {
        /// Key, e.g. daily_notes.insert_after
        key: String,

        /// New value (empty clears optional keys)
        value: String,

        /// Write to the vault's lethe.toml instead of the user config
        #[arg(long)]
        local: bool,
    },

    /// List every settable key
    Keys,

    /// Initialize a config file with defaults
    Init {
        /// Create the vault-local config (<vault>/lethe.toml) instead of user config
        #[arg(long)]
        local: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show configuration file path
    Path,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Which => cmd_which(ctx),
        ConfigCommand::Get { key } => cmd_get(ctx, &key),
        ConfigCommand::Set { key, value, local } => cmd_set(ctx, &key, &value, local),
        ConfigCommand::Keys => cmd_keys(ctx),
        ConfigCommand::Init { local, force } => cmd_init(ctx, local, force),
        ConfigCommand::Path => cmd_path(ctx),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let loaded = ctx.load_config()?;
    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&loaded.config)?);
        return Ok(());
    }

    println!("# Lethe Configuration\n");
    let sources = loaded.loaded_from();
    if sources.is_empty() {
        println!("# No config files loaded (using defaults)\n");
    } else {
        for source in &sources {
            println!("# from {}", source.display());
        }
        println!();
    }

    // Print every section, defaults included.
    let effective = LetheConfig {
        storage: Some(loaded.config.storage()),
        daily_notes: Some(loaded.config.daily_notes()),
        individual: Some(loaded.config.individual()),
        memo: Some(loaded.config.memo()),
    };
    print!("{}", effective.to_toml()?);
    Ok(())
}

fn cmd_which(ctx: &Context) -> Result<()> {
    let loaded = ctx.load_config()?;
    if ctx.json_output {
        let sources: Vec<_> = loaded
            .sources
            .iter()
            .map(|s| serde_json::json!({ "path": s.path.display().to_string(), "loaded": s.loaded }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&sources)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    println!("{}", style("Config files (lowest precedence first)").bold());
    println!("{}", dim.apply_to("─".repeat(50)));
    for source in &loaded.sources {
        let status = if source.loaded {
            Style::new().green().apply_to("loaded")
        } else {
            dim.apply_to("not found")
        };
        println!("  {}  {}", source.path.display(), status);
    }
    Ok(())
}

fn cmd_get(ctx: &Context, key: &str) -> Result<()> {
    let loaded = ctx.load_config()?;
    let value = loaded.config.get_value(key)?;
    if ctx.json_output {
        println!("{}", serde_json::json!({ "key": key, "value": value }));
    } else {
        println!("{value}");
    }
    Ok(())
}

fn cmd_set(ctx: &Context, key: &str, value: &str, local: bool) -> Result<()> {
    let path = target_path(ctx, local)?;
    let mut config = if path.is_file() {
        lethe_config::load_config_file(&path)?
    } else {
        LetheConfig::new()
    };
    config.set_value(key, value)?;
    lethe_config::save_config(&config, &path)?;

    if !ctx.json_output {
        let green = Style::new().green();
        println!(
            "{} {} = {:?} ({})",
            green.apply_to("✓"),
            key,
            value,
            path.display()
        );
    }
    Ok(())
}

fn cmd_keys(ctx: &Context) -> Result<()> {
    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(CONFIG_KEYS)?);
    } else {
        for key in CONFIG_KEYS {
            println!("{key}");
        }
    }
    Ok(())
}

fn cmd_init(ctx: &Context, local: bool, force: bool) -> Result<()> {
    let path = target_path(ctx, local)?;
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let defaults = LetheConfig {
        storage: Some(Default::default()),
        daily_notes: Some(Default::default()),
        individual: Some(Default::default()),
        memo: Some(Default::default()),
    };
    lethe_config::save_config(&defaults, &path)?;

    let green = Style::new().green();
    println!("{} Created {}", green.apply_to("✓"), path.display());
    Ok(())
}

fn cmd_path(ctx: &Context) -> Result<()> {
    let user = lethe_config::user_config_path();
    let vault = ctx.vault.as_ref().map(|v| v.join(VAULT_CONFIG_FILE));
    if ctx.json_output {
        let value = serde_json::json!({
            "user": user.as_ref().map(|p| p.display().to_string()),
            "vault": vault.as_ref().map(|p| p.display().to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    match user {
        Some(p) => println!("{}", p.display()),
        None => println!("(no user config directory on this platform)"),
    }
    if let Some(p) = vault {
        println!("{}", p.display());
    }
    Ok(())
}

/// User config file, or the vault-local one with `local`.
fn target_path(ctx: &Context, local: bool) -> Result<PathBuf> {
    if local {
        let loaded = ctx.load_config()?;
        return Ok(ctx.vault_dir(&loaded)?.join(VAULT_CONFIG_FILE));
    }
    match lethe_config::user_config_path() {
        Some(path) => Ok(path),
        None => bail!("cannot determine the user config directory; set LETHE_CONFIG_DIR"),
    }
}
