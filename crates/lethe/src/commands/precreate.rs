//! Precreate command - create upcoming daily notes ahead of time.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Args;
use console::Style;

use super::Context;

/// Arguments for the precreate command.
#[derive(Args, Debug)]
pub struct PrecreateArgs {
    /// Day to treat as today (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

/// Run the precreate command.
pub async fn run(args: PrecreateArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store().await?;
    let today = args.date.unwrap_or_else(|| Local::now().date_naive());
    let created = store.precreate_daily_notes(today).await?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&created)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    if created.is_empty() {
        println!("{}", dim.apply_to("Daily notes already exist"));
    } else {
        let green = Style::new().green();
        for path in &created {
            println!("{} Created {}", green.apply_to("✓"), path);
        }
    }
    Ok(())
}
