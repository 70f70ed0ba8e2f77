//! List command - show memos, newest first.

use anyhow::Result;
use clap::Args;
use console::{Style, style};

use super::{Context, truncate};

/// Arguments for the list command.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Maximum memos to show
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,

    /// Only show tasks
    #[arg(long)]
    pub tasks: bool,
}

/// Run the list command.
pub async fn run(args: ListArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store().await?;
    let mut listing = store.list_memos().await?;
    if args.tasks {
        listing.memos.retain(|m| m.memo_type.is_task());
    }
    let total = listing.memos.len();
    listing.memos.truncate(args.limit);

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    println!("{}", style("Memos").bold());
    println!("{}", dim.apply_to("─".repeat(50)));
    println!();

    if let Some(notice) = &listing.notice {
        println!("{}", dim.apply_to(notice));
        return Ok(());
    }
    if listing.memos.is_empty() {
        println!("{}", dim.apply_to("No memos found"));
        return Ok(());
    }

    for memo in &listing.memos {
        let marker = memo
            .memo_type
            .marker()
            .map(|m| format!("[{m}] "))
            .unwrap_or_default();
        println!(
            "{} {} {}{}",
            dim.apply_to(format!("[{}]", memo.id)),
            style(memo.created_at_display()).cyan(),
            marker,
            truncate(&memo.content, 60)
        );
    }
    if total > args.limit {
        println!();
        println!(
            "{}",
            dim.apply_to(format!("... and {} more", total - args.limit))
        );
    }
    Ok(())
}
