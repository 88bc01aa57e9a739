//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/notesync/config.toml)
//! 3. Environment variables (NOTESYNC_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix
const ENV_PREFIX: &str = "NOTESYNC";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// GraphQL HTTP endpoint
    #[serde(default)]
    pub api_url: Option<String>,

    /// GraphQL WebSocket endpoint (derived from api_url when unset)
    #[serde(default)]
    pub realtime_url: Option<String>,

    /// API key sent with every request
    #[serde(default)]
    pub api_key: Option<String>,

    /// Directory for local files (logs)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log file for the terminal UI (default: {data_dir}/debug.log)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            realtime_url: None,
            api_key: None,
            data_dir: default_data_dir(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (NOTESYNC_API_URL, NOTESYNC_REALTIME_URL, ...)
    /// 2. Config file (~/.config/notesync/config.toml or NOTESYNC_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Some(val) = env_optional("API_URL") {
            self.api_url = val;
        }

        if let Some(val) = env_optional("REALTIME_URL") {
            self.realtime_url = val;
        }

        if let Some(val) = env_optional("API_KEY") {
            self.api_key = val;
        }

        // NOTESYNC_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with NOTESYNC_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("notesync")
            .join("config.toml")
    }

    /// Get the WebSocket endpoint
    ///
    /// Uses realtime_url when set, otherwise swaps the scheme of api_url
    /// (http -> ws, https -> wss).
    pub fn realtime_endpoint(&self) -> Option<String> {
        if let Some(ref url) = self.realtime_url {
            return Some(url.clone());
        }

        let api_url = self.api_url.as_deref()?;
        if let Some(rest) = api_url.strip_prefix("https://") {
            Some(format!("wss://{}", rest))
        } else if let Some(rest) = api_url.strip_prefix("http://") {
            Some(format!("ws://{}", rest))
        } else {
            None
        }
    }

    /// Get the path of the terminal UI log file
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }
}

/// Read an optional string override; an empty value clears the setting
fn env_optional(name: &str) -> Option<Option<String>> {
    let val = std::env::var(format!("{}_{}", ENV_PREFIX, name)).ok()?;
    Some(if val.is_empty() { None } else { Some(val) })
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("notesync")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "NOTESYNC_API_URL",
        "NOTESYNC_REALTIME_URL",
        "NOTESYNC_API_KEY",
        "NOTESYNC_DATA_DIR",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api_url.is_none());
        assert!(config.api_key.is_none());
        assert!(config.data_dir.ends_with("notesync"));
    }

    #[test]
    fn test_log_path() {
        let mut config = Config::default();
        assert!(config.log_path().ends_with("debug.log"));

        config.log_file = Some(PathBuf::from("/tmp/notes.log"));
        assert_eq!(config.log_path(), PathBuf::from("/tmp/notes.log"));
    }

    #[test]
    fn test_realtime_endpoint_derivation() {
        let mut config = Config::default();
        assert!(config.realtime_endpoint().is_none());

        config.api_url = Some("https://example.com/graphql".to_string());
        assert_eq!(
            config.realtime_endpoint().as_deref(),
            Some("wss://example.com/graphql")
        );

        config.api_url = Some("http://localhost:4000/graphql".to_string());
        assert_eq!(
            config.realtime_endpoint().as_deref(),
            Some("ws://localhost:4000/graphql")
        );

        config.realtime_url = Some("wss://realtime.example.com/graphql".to_string());
        assert_eq!(
            config.realtime_endpoint().as_deref(),
            Some("wss://realtime.example.com/graphql")
        );
    }

    #[test]
    fn test_realtime_endpoint_unknown_scheme() {
        let config = Config {
            api_url: Some("ftp://example.com".to_string()),
            ..Config::default()
        };
        assert!(config.realtime_endpoint().is_none());
    }

    #[test]
    fn test_env_override_api_url() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("NOTESYNC_API_URL", "http://localhost:4000/graphql");
        config.apply_env_overrides();
        assert_eq!(
            config.api_url.as_deref(),
            Some("http://localhost:4000/graphql")
        );

        // Empty string clears it
        env::set_var("NOTESYNC_API_URL", "");
        config.apply_env_overrides();
        assert!(config.api_url.is_none());
    }

    #[test]
    fn test_env_override_api_key_and_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("NOTESYNC_API_KEY", "da2-secret");
        env::set_var("NOTESYNC_DATA_DIR", "/tmp/notesync-test");
        config.apply_env_overrides();

        assert_eq!(config.api_key.as_deref(), Some("da2-secret"));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/notesync-test"));
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            api_url = "https://example.com/graphql"
            api_key = "key"
            data_dir = "/custom/data"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("https://example.com/graphql"));
        assert_eq!(config.api_key.as_deref(), Some("key"));
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert!(config.realtime_url.is_none());
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        env::set_var("NOTESYNC_DATA_DIR", temp_dir.path().join("data"));

        let path = temp_dir.path().join("missing.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert!(config.api_url.is_none());
        assert!(config.data_dir.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            api_url: Some("https://example.com/graphql".to_string()),
            realtime_url: None,
            api_key: Some("key".to_string()),
            data_dir: temp_dir.path().join("data"),
            log_file: None,
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_with_cli_override(Some(&path)).unwrap();
        assert_eq!(loaded.api_url, config.api_url);
        assert_eq!(loaded.api_key, config.api_key);
        assert_eq!(loaded.data_dir, config.data_dir);
    }
}
