//! Command handlers

pub mod config;
pub mod note;
pub mod watch;

use std::path::PathBuf;

use anyhow::{Context, Result};

use notesync_core::{Config, GraphqlClient};

/// Build the backend client from configuration
pub fn connect(config_path: Option<&PathBuf>) -> Result<GraphqlClient> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    GraphqlClient::from_config(&config)
        .context("Backend not configured. Set one with: notesync config set api_url <url>")
}
