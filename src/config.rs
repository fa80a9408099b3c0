//! Configuration management for autosearch
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::api::SearchMode;
use crate::error::{AutosearchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for autosearch
///
/// This structure holds all configuration needed for the client,
/// including API endpoint settings, search defaults, and local storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Default search parameters
    #[serde(default)]
    pub search: SearchConfig,

    /// Local state storage settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the search backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    ///
    /// Streaming searches hold the connection open for the whole
    /// response, so this needs to cover the slowest deep search.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    120
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Default search parameters
///
/// These apply when the corresponding CLI flag is not given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search mode to use by default
    #[serde(default)]
    pub mode: SearchMode,

    /// Maximum number of sources to retrieve per search
    #[serde(default = "default_max_sources")]
    pub max_sources: u32,

    /// Answer language code (e.g. "en", "de")
    #[serde(default = "default_language")]
    pub language: String,

    /// Whether to stream answers by default
    #[serde(default = "default_streaming")]
    pub streaming: bool,
}

fn default_max_sources() -> u32 {
    6
}

fn default_language() -> String {
    "en".to_string()
}

fn default_streaming() -> bool {
    true
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::default(),
            max_sources: default_max_sources(),
            language: default_language(),
            streaming: default_streaming(),
        }
    }
}

/// Local state storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Path to the state database
    ///
    /// When unset, a platform data directory is used.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file with environment variable and CLI overrides
    ///
    /// Values are resolved in increasing order of precedence: built-in
    /// defaults, config file, `AUTOSEARCH_*` environment variables, CLI flags.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - Parsed command line arguments
    ///
    /// # Returns
    ///
    /// Returns the resolved configuration
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AutosearchError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| AutosearchError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("AUTOSEARCH_API_BASE") {
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("AUTOSEARCH_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.api.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid AUTOSEARCH_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(mode) = std::env::var("AUTOSEARCH_MODE") {
            if let Ok(value) = mode.parse() {
                self.search.mode = value;
            } else {
                tracing::warn!("Invalid AUTOSEARCH_MODE: {}", mode);
            }
        }

        if let Ok(max_sources) = std::env::var("AUTOSEARCH_MAX_SOURCES") {
            if let Ok(value) = max_sources.parse() {
                self.search.max_sources = value;
            } else {
                tracing::warn!("Invalid AUTOSEARCH_MAX_SOURCES: {}", max_sources);
            }
        }

        if let Ok(language) = std::env::var("AUTOSEARCH_LANGUAGE") {
            self.search.language = language;
        }

        if let Ok(db_path) = std::env::var("AUTOSEARCH_STATE_DB") {
            self.storage.path = Some(PathBuf::from(db_path));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(api_base) = &cli.api_base {
            self.api.base_url = api_base.clone();
        }

        if let Some(db_path) = &cli.storage_path {
            self.storage.path = Some(PathBuf::from(db_path));
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set.
    ///
    /// # Returns
    ///
    /// Returns Ok if configuration is valid
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            return Err(AutosearchError::Config("api.base_url cannot be empty".to_string()).into());
        }

        if let Err(e) = url::Url::parse(&self.api.base_url) {
            return Err(AutosearchError::Config(format!(
                "Invalid api.base_url {}: {}",
                self.api.base_url, e
            ))
            .into());
        }

        if self.api.timeout_seconds == 0 {
            return Err(AutosearchError::Config(
                "api.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.search.max_sources == 0 {
            return Err(AutosearchError::Config(
                "search.max_sources must be greater than 0".to_string(),
            )
            .into());
        }

        if self.search.max_sources > 20 {
            return Err(AutosearchError::Config(
                "search.max_sources must be less than or equal to 20".to_string(),
            )
            .into());
        }

        if self.search.language.is_empty() {
            return Err(
                AutosearchError::Config("search.language cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            search: SearchConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn cli_with_defaults() -> crate::cli::Cli {
        crate::cli::Cli {
            config: None,
            verbose: false,
            api_base: None,
            storage_path: None,
            command: crate::cli::Commands::Health,
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.timeout_seconds, 120);
        assert_eq!(config.search.mode, SearchMode::Quick);
        assert_eq!(config.search.max_sources, 6);
        assert_eq!(config.search.language, "en");
        assert!(config.search.streaming);
        assert_eq!(config.storage.path, None);
    }

    #[test]
    fn test_config_validation_success() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_base_url() {
        let mut config = Config::default();
        config.api.base_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_base_url() {
        let mut config = Config::default();
        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = Config::default();
        config.api.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_max_sources() {
        let mut config = Config::default();
        config.search.max_sources = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_max_sources_too_large() {
        let mut config = Config::default();
        config.search.max_sources = 21;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_language() {
        let mut config = Config::default();
        config.search.language = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
api:
  base_url: http://search.internal:9000
  timeout_seconds: 30

search:
  mode: academic
  max_sources: 10
  language: de
  streaming: false

storage:
  path: /tmp/autosearch-state.db
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api.base_url, "http://search.internal:9000");
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.search.mode, SearchMode::Academic);
        assert_eq!(config.search.max_sources, 10);
        assert_eq!(config.search.language, "de");
        assert!(!config.search.streaming);
        assert_eq!(
            config.storage.path,
            Some(PathBuf::from("/tmp/autosearch-state.db"))
        );
    }

    #[test]
    fn test_config_partial_yaml_fills_defaults() {
        let yaml = r#"
search:
  mode: arxiv
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.search.mode, SearchMode::Arxiv);
        assert_eq!(config.search.max_sources, 6);
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.storage.path, None);
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        let cli = cli_with_defaults();
        let config = Config::load("nonexistent.yaml", &cli).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.search.mode, SearchMode::Quick);
    }

    #[test]
    #[serial]
    fn test_env_var_overrides() {
        std::env::set_var("AUTOSEARCH_API_BASE", "http://10.0.0.5:8000");
        std::env::set_var("AUTOSEARCH_MODE", "deep");
        std::env::set_var("AUTOSEARCH_MAX_SOURCES", "12");

        let mut config = Config::default();
        config.apply_env_vars();

        std::env::remove_var("AUTOSEARCH_API_BASE");
        std::env::remove_var("AUTOSEARCH_MODE");
        std::env::remove_var("AUTOSEARCH_MAX_SOURCES");

        assert_eq!(config.api.base_url, "http://10.0.0.5:8000");
        assert_eq!(config.search.mode, SearchMode::Deep);
        assert_eq!(config.search.max_sources, 12);
    }

    #[test]
    #[serial]
    fn test_invalid_env_values_are_ignored() {
        std::env::set_var("AUTOSEARCH_MODE", "psychic");
        std::env::set_var("AUTOSEARCH_MAX_SOURCES", "lots");

        let mut config = Config::default();
        config.apply_env_vars();

        std::env::remove_var("AUTOSEARCH_MODE");
        std::env::remove_var("AUTOSEARCH_MAX_SOURCES");

        assert_eq!(config.search.mode, SearchMode::Quick);
        assert_eq!(config.search.max_sources, 6);
    }

    #[test]
    #[serial]
    fn test_cli_overrides_beat_env_vars() {
        std::env::set_var("AUTOSEARCH_API_BASE", "http://env-host:8000");

        let mut cli = cli_with_defaults();
        cli.api_base = Some("http://cli-host:8000".to_string());
        cli.storage_path = Some("/tmp/cli-state.db".to_string());

        let config = Config::load("nonexistent.yaml", &cli).unwrap();

        std::env::remove_var("AUTOSEARCH_API_BASE");

        assert_eq!(config.api.base_url, "http://cli-host:8000");
        assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/cli-state.db")));
    }
}
