//! agentwire - drive and inspect agent runs from the command line
//!
//! Main entry point for the agentwire CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::Style;

mod commands;

use commands::{history, run, stop};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// agentwire - drive and inspect agent runs from the command line
#[derive(Parser)]
#[command(name = "agentwire")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON lines (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Agent service base URL
    #[arg(long, global = true, env = "AGENT_URL")]
    pub agent_url: Option<String>,

    /// Tenant routing identifier sent with every request
    #[arg(long, global = true, env = "AGENT_TENANT_ID")]
    pub tenant_id: Option<String>,

    /// Route that accepts run inputs, relative to the base URL
    #[arg(long, global = true)]
    pub route: Option<String>,

    /// Also write JSON logs to a daily-rotated file in this directory
    #[arg(long, global = true, env = "AGENTWIRE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a fresh run and stream its events
    Run(run::RunArgs),

    /// Resume an interrupted run with a value
    Resume(run::ResumeArgs),

    /// Fork a thread from a checkpoint
    Fork(run::ForkArgs),

    /// Replay a thread from a checkpoint
    Replay(run::ReplayArgs),

    /// Show the checkpoint history of a thread
    History(history::HistoryArgs),

    /// Stop the run on a thread
    Stop(stop::StopArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_output = cli.json;

    if let Err(e) = run_cli(cli).await {
        if json_output {
            let output = serde_json::json!({ "error": e.to_string() });
            eprintln!("{output}");
        } else {
            let red = Style::new().red();
            eprintln!("{} {:#}", red.apply_to("Error:"), e);
        }
        std::process::exit(1);
    }
}

async fn run_cli(cli: Cli) -> Result<()> {
    let _guard = init_tracing(cli.verbose, cli.log_dir.as_deref());

    let ctx = commands::Context {
        agent_url: cli.agent_url,
        tenant_id: cli.tenant_id,
        route: cli.route,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Run(args) => run::run(args, &ctx).await,
        Commands::Resume(args) => run::resume(args, &ctx).await,
        Commands::Fork(args) => run::fork(args, &ctx).await,
        Commands::Replay(args) => run::replay(args, &ctx).await,
        Commands::History(args) => history::run(args, &ctx).await,
        Commands::Stop(args) => stop::run(args, &ctx).await,
    }
}

/// Console logs on stderr, plus an optional rotating JSON file.
///
/// `RUST_LOG` overrides the console filter. The returned guard flushes the
/// file writer on drop.
fn init_tracing(
    verbose: bool,
    log_dir: Option<&std::path::Path>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose {
        "agentwire=debug,agentwire_client=debug,warn"
    } else {
        "agentwire=info,agentwire_client=info,warn"
    };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let console = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let (file, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "agentwire.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(EnvFilter::new("agentwire=trace,agentwire_client=trace,info"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry().with(console).with(file).init();
    guard
}
