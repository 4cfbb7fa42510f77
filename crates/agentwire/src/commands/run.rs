//! Streaming commands - run, resume, fork and replay.

use std::io::Write;

use agentwire_client::{AgentClient, AgentEvent, EventStream, RunInput};
use anyhow::Result;
use clap::Args;
use console::Style;
use serde_json::Value;

use super::{Context, parse_json};

/// Arguments for the run command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Thread to run on
    #[arg(short, long)]
    pub thread: String,

    /// Initial agent state as JSON
    #[arg(short, long, value_parser = parse_json, default_value = "{}")]
    pub state: Value,

    /// Agent graph to run
    #[arg(short, long)]
    pub agent: Option<String>,
}

/// Arguments for the resume command.
#[derive(Args, Debug)]
pub struct ResumeArgs {
    /// Thread to resume
    #[arg(short, long)]
    pub thread: String,

    /// Resume value as JSON
    #[arg(long, value_parser = parse_json)]
    pub value: Value,

    /// Agent graph to run
    #[arg(short, long)]
    pub agent: Option<String>,
}

/// Arguments for the fork command.
#[derive(Args, Debug)]
pub struct ForkArgs {
    /// Thread to fork
    #[arg(short, long)]
    pub thread: String,

    /// Checkpoint to fork from
    #[arg(short, long)]
    pub checkpoint: String,

    /// Replacement agent state as JSON
    #[arg(short, long, value_parser = parse_json, default_value = "{}")]
    pub state: Value,

    /// Agent graph to run
    #[arg(short, long)]
    pub agent: Option<String>,
}

/// Arguments for the replay command.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Thread to replay
    #[arg(short, long)]
    pub thread: String,

    /// Checkpoint to replay from
    #[arg(short, long)]
    pub checkpoint: String,

    /// Agent graph to run
    #[arg(short, long)]
    pub agent: Option<String>,
}

/// Run the run command.
pub async fn run(args: RunArgs, ctx: &Context) -> Result<()> {
    let input = with_agent(RunInput::run(args.thread, args.state), args.agent);
    stream_input(input, ctx).await
}

/// Run the resume command.
pub async fn resume(args: ResumeArgs, ctx: &Context) -> Result<()> {
    let input = with_agent(RunInput::resume(args.thread, args.value), args.agent);
    stream_input(input, ctx).await
}

/// Run the fork command.
pub async fn fork(args: ForkArgs, ctx: &Context) -> Result<()> {
    let input = with_agent(
        RunInput::fork(args.thread, args.checkpoint, args.state),
        args.agent,
    );
    stream_input(input, ctx).await
}

/// Run the replay command.
pub async fn replay(args: ReplayArgs, ctx: &Context) -> Result<()> {
    let input = with_agent(RunInput::replay(args.thread, args.checkpoint), args.agent);
    stream_input(input, ctx).await
}

fn with_agent(input: RunInput, agent: Option<String>) -> RunInput {
    match agent {
        Some(name) => input.with_agent(name),
        None => input,
    }
}

/// Post the input and print events until the stream ends.
///
/// Ctrl+C drops the stream and asks the service to stop the thread.
async fn stream_input(input: RunInput, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let dim = Style::new().dim();

    if ctx.verbose && !ctx.json_output {
        eprintln!(
            "{}",
            dim.apply_to(format!(
                "{} on thread {} via {}",
                input.kind(),
                input.thread_id(),
                client.dispatch_url()
            ))
        );
    }

    let mut stream = client.stream_run(&input).await?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut count = 0usize;
    loop {
        tokio::select! {
            next = stream.next_event() => match next {
                Some(event) => {
                    print_event(&event?, ctx)?;
                    count += 1;
                }
                None => break,
            },
            _ = &mut ctrl_c => {
                return interrupt(stream, &client, input.thread_id(), ctx).await;
            }
        }
    }

    tracing::info!(thread_id = input.thread_id(), events = count, "run stream finished");
    Ok(())
}

async fn interrupt(
    stream: EventStream,
    client: &AgentClient,
    thread_id: &str,
    ctx: &Context,
) -> Result<()> {
    stream.cancel();
    tracing::info!(thread_id, "interrupted, requesting stop");
    client.stop_agent(thread_id).await?;

    if !ctx.json_output {
        let yellow = Style::new().yellow();
        eprintln!();
        eprintln!("{}", yellow.apply_to(format!("Stopped thread {thread_id}")));
    }
    Ok(())
}

fn print_event(event: &AgentEvent, ctx: &Context) -> Result<()> {
    let mut stdout = std::io::stdout().lock();

    if ctx.json_output {
        writeln!(stdout, "{}", serde_json::to_string(event)?)?;
        return Ok(());
    }

    let tag_style = match event.event.as_str() {
        "interrupt" => Style::new().yellow().bold(),
        "error" => Style::new().red().bold(),
        "checkpoint" => Style::new().dim(),
        _ => Style::new().cyan(),
    };
    writeln!(stdout, "{} {}", tag_style.apply_to(&event.event), event.data)?;
    stdout.flush()?;
    Ok(())
}
