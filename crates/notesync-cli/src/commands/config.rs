//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use notesync_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "api_url": config.api_url,
                    "realtime_url": config.realtime_endpoint(),
                    "api_key": config.api_key.as_ref().map(|_| "(set)"),
                    "data_dir": config.data_dir,
                    "log_file": config.log_path()
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.api_url.as_deref().unwrap_or(""));
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!(
                "  api_url:      {}",
                config.api_url.as_deref().unwrap_or("(not set)")
            );
            let realtime = match (&config.realtime_url, config.realtime_endpoint()) {
                (Some(url), _) => url.clone(),
                (None, Some(derived)) => format!("{} (derived)", derived),
                (None, None) => "(not set)".to_string(),
            };
            println!("  realtime_url: {}", realtime);
            println!(
                "  api_key:      {}",
                if config.api_key.is_some() {
                    "(set)"
                } else {
                    "(not set)"
                }
            );
            println!("  data_dir:     {}", config.data_dir.display());
            println!("  log_file:     {}", config.log_path().display());
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply_setting(&mut config, &key, &value)?;

    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    // Never echo the key back
    let shown = if key == "api_key" { "(hidden)" } else { &value };
    output.success(&format!("Set {} = {}", key, shown));

    Ok(())
}

/// Apply one `key = value` pair; empty or "none" clears optional values
fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let optional = || {
        if value.is_empty() || value == "none" {
            None
        } else {
            Some(value.to_string())
        }
    };

    match key {
        "api_url" => config.api_url = optional(),
        "realtime_url" => config.realtime_url = optional(),
        "api_key" => config.api_key = optional(),
        "data_dir" => config.data_dir = value.into(),
        "log_file" => config.log_file = optional().map(PathBuf::from),
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: api_url, realtime_url, api_key, data_dir, log_file",
                key
            );
        }
    }

    Ok(())
}
