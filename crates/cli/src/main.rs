//! `workflows` command line driver.
//!
//! Runs the trigger-dispatch engine against an in-memory host described by
//! JSON fixtures, for trying out workflow configurations without a game
//! client. Reports go to stdout as JSON, logs go to stderr.
//!
//! ```bash
//! workflows hooks demos/world.json
//! workflows run demos/world.json demos/scenario.json --pretty
//! RUST_LOG=workflows=debug workflows run demos/world.json demos/scenario.json
//! ```

mod commands;
mod fixture;
mod logging;

use anyhow::Result;
use clap::Parser;
use commands::{Form, Hooks, Run};
use workflow_runtime::RuntimeConfig;

#[derive(Parser)]
#[command(name = "workflows")]
#[command(about = "Drive tabletop workflows against a fixture world", long_about = None)]
#[command(version)]
struct Cli {
    /// Also write logs to a file (WORKFLOWS_LOG_DIR or the platform cache dir)
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Fire a scenario of host hooks against a world
    Run(Run),

    /// Show indexed events and subscribed hooks
    Hooks(Hooks),

    /// Convert a workflow to and from edit-form entries
    Form(Form),
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = logging::setup_logging(cli.log_file)?;
    let config = RuntimeConfig::from_env();
    tracing::debug!(?config, "runtime configuration loaded");

    match cli.command {
        Command::Run(cmd) => cmd.execute(config).await,
        Command::Hooks(cmd) => cmd.execute(config),
        Command::Form(cmd) => cmd.execute(),
    }
}
