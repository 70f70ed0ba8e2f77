//! Hide command - remove a memo by id.

use anyhow::Result;
use clap::Args;
use console::Style;

use super::Context;

/// Arguments for the hide command.
#[derive(Args, Debug)]
pub struct HideArgs {
    /// Memo ID (as shown by `lethe list`)
    pub id: String,
}

/// Run the hide command.
pub async fn run(args: HideArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store().await?;
    let outcome = store.hide_memo(&args.id).await?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    if outcome.removed {
        let green = Style::new().green();
        println!(
            "{} Memo hidden: {}",
            green.apply_to("✓"),
            dim.apply_to(outcome.path.as_deref().unwrap_or(&args.id))
        );
    } else {
        println!("{}", dim.apply_to(format!("No memo with id {}", args.id)));
    }
    Ok(())
}
