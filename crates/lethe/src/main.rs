//! Lethe - quick memo capture for markdown vaults
//!
//! Main entry point for the Lethe CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{add, config, export, hide, list, precreate};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Lethe - quick memo capture for markdown vaults
#[derive(Parser)]
#[command(name = "lethe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Vault directory (default: storage.vault from config)
    #[arg(long, global = true, env = "LETHE_VAULT")]
    pub vault: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Capture a memo
    Add(add::AddArgs),

    /// List memos, newest first
    List(list::ListArgs),

    /// Remove a memo by id
    Hide(hide::HideArgs),

    /// Export memos grouped by day as markdown
    Export(export::ExportArgs),

    /// Create today's and tomorrow's daily notes
    Precreate(precreate::PrecreateArgs),

    /// Configuration management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Tracing: human-readable console on stderr, JSON into a daily-rotated file
    let filter = if cli.verbose {
        "lethe=debug,lethe_vault=debug,lethe_memo=debug,lethe_config=debug,info"
    } else {
        "lethe=info,lethe_vault=warn,lethe_memo=warn,lethe_config=warn,warn"
    };

    let log_dir = lethe_config::user_config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "lethe.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "lethe=trace,lethe_vault=trace,lethe_memo=trace,lethe_config=trace,info",
                )),
        )
        .init();

    let ctx = commands::Context {
        vault: cli.vault,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Add(args) => add::run(args, &ctx).await,
        Commands::List(args) => list::run(args, &ctx).await,
        Commands::Hide(args) => hide::run(args, &ctx).await,
        Commands::Export(args) => export::run(args, &ctx).await,
        Commands::Precreate(args) => precreate::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
