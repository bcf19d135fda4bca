//! Replan configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main replan configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Planning service configuration
    pub planner: PlannerConfig,

    /// Storage configuration
    pub storage: StorageConfig,

    /// Tenant saved versions belong to
    pub tenant: String,

    /// Persona saved versions belong to
    pub persona: String,

    /// Log level (overridden by --log-level)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that the planner API key environment variable is set. Call
    /// early in startup to fail fast with a clear message.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.planner.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "Planner API key not found. Set the {} environment variable.",
                self.planner.api_key_env
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .replan.yml
        let local_config = PathBuf::from(".replan.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/replan/replan.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("replan").join("replan.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Planning service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_key_env: "REPLAN_API_KEY".to_string(),
            timeout_ms: 60_000,
        }
    }
}

impl PlannerConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env)
            .context(format!("Environment variable {} not set", self.api_key_env))
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for the version store
    #[serde(rename = "versions-path")]
    pub versions_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            versions_path: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("replan")
                .join("versions"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            planner: PlannerConfig::default(),
            storage: StorageConfig::default(),
            tenant: "default".to_string(),
            persona: "default".to_string(),
            log_level: None,
        }
    }
}
