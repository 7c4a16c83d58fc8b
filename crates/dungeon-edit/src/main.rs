mod commands;
mod puzzle;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use dungeon_edit_mod_history::HistoryConfig;

use crate::commands::{Command, Workspace};

/// Command-line editor for dungeon puzzles with persistent undo/redo.
#[derive(Parser, Debug)]
#[command(name = "dungeon-edit", version, about)]
struct Cli {
    /// History config file (created with defaults if missing).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the history database (overrides the config file).
    #[arg(long = "data-dir")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let mut config = match &cli.config {
        Some(path) => HistoryConfig::load_or_create(path),
        None => HistoryConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    tracing::debug!(
        "Using data directory {} (max_past {})",
        config.data_dir.display(),
        config.max_past
    );

    let workspace = Workspace::open(config)?;
    let output = workspace.run(&cli.command)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
