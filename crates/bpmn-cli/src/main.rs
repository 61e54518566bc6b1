mod cli;
mod context;
mod handlers;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("BPMN_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else {
        // stdout carries the JSON envelope
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_env("BPMN_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay(args) => handlers::replay::handle(args)?,
        Commands::Inspect { diagram } => handlers::inspect::handle(&diagram)?,
        Commands::Completions { shell } => handlers::completions::handle(shell),
    }

    Ok(())
}
