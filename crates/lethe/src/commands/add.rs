//! Add command - capture a memo.

use anyhow::Result;
use clap::Args;
use console::Style;

use super::Context;

/// Arguments for the add command.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Memo content (words are joined with spaces)
    #[arg(required = true)]
    pub content: Vec<String>,

    /// Capture as a task (`- [ ]`)
    #[arg(short, long, conflicts_with = "list")]
    pub task: bool,

    /// Capture as a plain list item
    #[arg(short, long)]
    pub list: bool,
}

impl AddArgs {
    fn is_task(&self) -> Option<bool> {
        match (self.task, self.list) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// Run the add command.
pub async fn run(args: AddArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store().await?;
    let content = args.content.join(" ");
    let created = store.create_memo(&content, args.is_task()).await?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&created)?);
        return Ok(());
    }

    let green = Style::new().green();
    let dim = Style::new().dim();
    println!(
        "{} Memo created: {}",
        green.apply_to("✓"),
        dim.apply_to(&created.memo.id)
    );
    if ctx.verbose {
        println!("{}", dim.apply_to(format!("  {}", created.memo.path)));
    }
    if created.created_note {
        println!("{}", dim.apply_to(format!("  new daily note {}", created.memo.path)));
    }
    if created.appended_at_end {
        let yellow = Style::new().yellow();
        println!(
            "{} anchor '{}' not found, memo appended at the end of {}",
            yellow.apply_to("Note:"),
            store.config().insert_after,
            created.memo.path
        );
    }
    Ok(())
}
