mod cli;
mod commands;
mod interactive;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands, SyncArgs};
use commands::{SyncOptions, SyncOutcome};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter, e.g. `litsync_core=debug`
const LOG_ENV: &str = "LITSYNC_LOG";

fn main() -> anyhow::Result<()> {
    // Set up Ctrl+C handler for graceful interruption
    ctrlc::set_handler(|| {
        eprintln!("\n\nInterrupted by user (Ctrl+C)");
        std::process::exit(130); // Standard exit code for SIGINT
    })
    .context("Failed to set Ctrl+C handler")?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = SyncOptions::from_cli(&cli);

    match &cli.command {
        None => run_sync(&SyncArgs::default(), &options)?,
        Some(Commands::Sync(args)) => run_sync(args, &options)?,
        Some(Commands::Search { query, filter, url }) => {
            commands::Search::execute(query.as_deref(), *filter, *url, &options)
                .context("Failed to execute search command")?;
        }
        Some(Commands::List) => {
            commands::List::execute(&options).context("Failed to execute list command")?;
        }
        Some(Commands::Status { full }) => {
            commands::Status::execute(*full, &options)
                .context("Failed to execute status command")?;
        }
        Some(Commands::Diff { keys }) => {
            commands::Diff::execute(keys, &options).context("Failed to execute diff command")?;
        }
        Some(Commands::Config) => {
            commands::Config::execute(&options).context("Failed to execute config command")?;
        }
    }

    Ok(())
}

fn run_sync(args: &SyncArgs, options: &SyncOptions) -> anyhow::Result<()> {
    let outcome =
        commands::Sync::execute(args, options).context("Failed to execute sync command")?;
    if outcome == SyncOutcome::CompletedWithErrors {
        std::process::exit(1);
    }
    Ok(())
}

/// Diagnostics go to stderr; `LITSYNC_LOG` overrides the level picked by `--verbose`
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
