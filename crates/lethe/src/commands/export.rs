//! Export command - memos grouped by day as a markdown list.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use clap::Args;
use console::Style;

use super::Context;

/// Arguments for the export command.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<NaiveDate>,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Run the export command.
pub async fn run(args: ExportArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store().await?;
    let text = store.export_text(args.since, args.until).await?;

    if let Some(path) = &args.output {
        std::fs::write(path, &text)
            .with_context(|| format!("failed to write {}", path.display()))?;
        if !ctx.json_output {
            let green = Style::new().green();
            println!("{} Exported to {}", green.apply_to("✓"), path.display());
        }
    }

    if ctx.json_output {
        let value = serde_json::json!({
            "text": text,
            "output": args.output.as_ref().map(|p| p.display().to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else if args.output.is_none() {
        print!("{text}");
    }
    Ok(())
}
