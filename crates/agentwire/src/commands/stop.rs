//! Stop command - asks the agent service to stop a thread's run.

use anyhow::Result;
use clap::Args;
use console::Style;

use super::Context;

/// Arguments for the stop command.
#[derive(Args, Debug)]
pub struct StopArgs {
    /// Thread to stop
    #[arg(short, long)]
    pub thread: String,
}

/// Run the stop command.
pub async fn run(args: StopArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    client.stop_agent(&args.thread).await?;

    if ctx.json_output {
        println!("{}", serde_json::json!({ "stopped": args.thread }));
    } else {
        let green = Style::new().green();
        println!("{} {}", green.apply_to("Stopped"), args.thread);
    }

    Ok(())
}
