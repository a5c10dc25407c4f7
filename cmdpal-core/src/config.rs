//! cmdpal configuration
//!
//! ## Sources (in precedence order)
//!
//! 1. Environment: `CMDPAL_VERSION_URL`, `CMDPAL_DATABASE`, `CMDPAL_TIMEOUT_SECONDS`
//! 2. `config.yaml` in the platform config directory (or an explicit path)
//! 3. Built-in defaults
//!
//! ```yaml
//! version_url: https://example.com/commands_version.json
//! database_path: /var/lib/cmdpal/commands.sqlite
//! timeout_seconds: 30
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::store::DATABASE_FILE;

/// Public command data source
pub const DEFAULT_VERSION_URL: &str = "https://raw.githubusercontent.com/tharunShiv/command-helper-data-source/refs/heads/main/commands_version.json";

pub const ENV_VERSION_URL: &str = "CMDPAL_VERSION_URL";
pub const ENV_DATABASE: &str = "CMDPAL_DATABASE";
pub const ENV_TIMEOUT_SECONDS: &str = "CMDPAL_TIMEOUT_SECONDS";
pub const ENV_DEPLOYMENT: &str = "CMDPAL_ENV";

const CONFIG_FILE: &str = "config.yaml";

/// How the application was launched; decides the default database location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Deployment {
    /// Database lives in the working directory
    Development,
    /// Database lives in the platform data directory
    #[default]
    Packaged,
}

impl Deployment {
    /// Read from `CMDPAL_ENV` (`development` or `dev`), defaulting to packaged
    pub fn detect() -> Self {
        match std::env::var(ENV_DEPLOYMENT) {
            Ok(value) if matches!(value.to_ascii_lowercase().as_str(), "development" | "dev") => {
                Deployment::Development
            }
            _ => Deployment::Packaged,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteConfig {
    /// URL of the remote version descriptor
    #[serde(default = "default_version_url")]
    pub version_url: String,

    /// Explicit database location, overriding the deployment default
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Timeout for each HTTP request
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            version_url: default_version_url(),
            database_path: None,
            timeout_seconds: default_timeout_seconds(),
            user_agent: None,
        }
    }
}

fn default_version_url() -> String {
    DEFAULT_VERSION_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl PaletteConfig {
    /// Load from the default config file with environment overrides applied
    pub fn load() -> Result<Self> {
        let path = Self::default_config_path()?;
        Self::load_with_env(&path)
    }

    /// Load from `path` with environment overrides applied
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let mut config = Self::load_from_path(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`; a missing file yields defaults
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save the configuration as YAML
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml_ng::to_string(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var(ENV_VERSION_URL) {
            self.version_url = url;
        }
        if let Ok(path) = std::env::var(ENV_DATABASE) {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Ok(timeout) = std::env::var(ENV_TIMEOUT_SECONDS) {
            self.timeout_seconds = timeout
                .parse()
                .with_context(|| format!("{ENV_TIMEOUT_SECONDS} must be a number of seconds"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.version_url.starts_with("http://") && !self.version_url.starts_with("https://")
        {
            anyhow::bail!(
                "version_url must start with http:// or https:// (got: {})",
                self.version_url
            );
        }
        Ok(())
    }

    /// Request timeout, never below one second
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }

    /// Database location for the given deployment
    pub fn database_path(&self, deployment: Deployment) -> Result<PathBuf> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }

        match deployment {
            Deployment::Development => {
                let cwd = std::env::current_dir().context("Could not determine working directory")?;
                Ok(cwd.join(DATABASE_FILE))
            }
            Deployment::Packaged => Ok(Self::data_dir()?.join(DATABASE_FILE)),
        }
    }

    /// Default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join(CONFIG_FILE))
    }

    fn data_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    fn project_dirs() -> Result<directories::ProjectDirs> {
        directories::ProjectDirs::from("dev", "cmdpal", "cmdpal")
            .context("Could not determine home directory")
    }
}
