//! History command - lists the checkpoints of a thread.

use agentwire_client::Checkpoint;
use anyhow::Result;
use clap::Args;
use console::{Style, style};

use super::Context;

/// Arguments for the history command.
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Thread to inspect
    #[arg(short, long)]
    pub thread: String,

    /// Print each checkpoint's full state
    #[arg(short, long)]
    pub full: bool,
}

/// Run the history command.
pub async fn run(args: HistoryArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let history: Vec<Checkpoint> = client.get_history(&args.thread).await?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    let yellow = Style::new().yellow();

    println!();
    println!("{}", style(format!("History of {}", args.thread)).bold());
    println!("{}", dim.apply_to("─".repeat(40)));

    if history.is_empty() {
        println!("  {}", dim.apply_to("No checkpoints"));
        println!();
        return Ok(());
    }

    for (index, checkpoint) in history.iter().enumerate() {
        let id = checkpoint.checkpoint_id.as_deref().unwrap_or("-");
        print!("  {:>3}  {}", index, id);
        if let Some(value) = &checkpoint.interrupt_value {
            print!("  {}", yellow.apply_to(format!("interrupted: {value}")));
        }
        if let Some(error) = &checkpoint.error {
            print!("  {}", Style::new().red().apply_to(format!("error: {error}")));
        }
        println!();

        if args.full {
            println!("       {}", dim.apply_to(&checkpoint.state));
        }
    }

    println!();
    println!("  {} {}", dim.apply_to("Total:"), history.len());
    println!();
    Ok(())
}
