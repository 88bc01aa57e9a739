//! notesync CLI
//!
//! Command-line interface for notesync: a terminal UI plus one-shot commands
//! for scripting against the notes backend.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;
mod tui;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "notesync")]
#[command(about = "notesync - Notes synced with a GraphQL backend")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// List all notes
    #[command(alias = "ls")]
    List,
    /// Create a note
    #[command(alias = "add")]
    Create {
        /// Note name
        name: String,
        /// Note description
        description: String,
    },
    /// Delete a note
    #[command(alias = "rm")]
    Delete {
        /// Note ID (full ID or prefix)
        id: String,
    },
    /// Flip a note's completed flag
    Toggle {
        /// Note ID (full ID or prefix)
        id: String,
    },
    /// Print notes created by any client until interrupted
    Watch,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (api_url, realtime_url, api_key, data_dir, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    let Some(command) = cli.command else {
        return tui::run(config_path).await;
    };

    // The TUI owns the terminal, so it logs to a file instead
    if !matches!(command, Commands::Tui) {
        init_cli_logging();
    }

    match command {
        Commands::Tui => tui::run(config_path).await,
        Commands::List => commands::note::list(config_path, &output).await,
        Commands::Create { name, description } => {
            commands::note::create(config_path, name, description, &output).await
        }
        Commands::Delete { id } => commands::note::delete(config_path, id, &output).await,
        Commands::Toggle { id } => commands::note::toggle(config_path, id, &output).await,
        Commands::Watch => commands::watch::watch(config_path, &output).await,
        Commands::Config { command } => handle_config_command(command, config_path, &output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Log to stderr, only if NOTESYNC_LOG is set
fn init_cli_logging() {
    let Ok(log_level) = std::env::var("NOTESYNC_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!(
        "notesync_core={},notesync_cli={}",
        log_level, log_level
    ));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
