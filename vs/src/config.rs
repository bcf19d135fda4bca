//! Configuration for versionstore

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the version store directory
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Tenant whose versions the CLI operates on
    #[serde(default = "default_tenant")]
    pub tenant: String,

    /// Persona whose versions the CLI operates on
    #[serde(default = "default_persona")]
    pub persona: String,
}

fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("versionstore")
}

fn default_tenant() -> String {
    "default".to_string()
}

fn default_persona() -> String {
    "default".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            tenant: default_tenant(),
            persona: default_persona(),
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            return Ok(config);
        }

        // Try default locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("versionstore").join("config.yml")),
            Some(PathBuf::from("versionstore.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Config::default())
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
