use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

pub const DEFAULT_NBP_BASE_URL: &str = "https://api.nbp.pl";
pub const DEFAULT_USER_AGENT: &str = "nbprates/1.0";
pub const DEFAULT_COPIED_BADGE_MS: u64 = 1500;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NbpProviderConfig {
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for NbpProviderConfig {
    fn default() -> Self {
        NbpProviderConfig {
            base_url: DEFAULT_NBP_BASE_URL.to_string(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub nbp: NbpProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct UiConfig {
    /// How long the "Copied" badge stays visible.
    #[serde(default = "default_copied_badge_ms")]
    pub copied_badge_ms: u64,
}

fn default_copied_badge_ms() -> u64 {
    DEFAULT_COPIED_BADGE_MS
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            copied_badge_ms: DEFAULT_COPIED_BADGE_MS,
        }
    }
}

impl UiConfig {
    pub fn copied_badge_duration(&self) -> Duration {
        Duration::from_millis(self.copied_badge_ms)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl AppConfig {
    /// Loads the config from the default location, falling back to the
    /// built-in defaults when no file was created yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("pl", "nbprates", "nbprates")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
