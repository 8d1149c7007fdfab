use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;
use crate::feed::DEFAULT_PAGE_SIZE;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub feed: FeedConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Key stored in the config file. The `NEWS_API_KEY` environment
    /// variable takes precedence; see [`ApiConfig::resolved_key`].
    pub api_key: String,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub country: String,
    pub page_size: u32,
    pub search_debounce_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Where bookmarks live; `None` means the default file under the
    /// config directory.
    pub bookmarks_file: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org/".to_string(),
            api_key: String::new(),
            request_timeout_seconds: 10,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            country: "us".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce_ms: 500,
        }
    }
}

impl ApiConfig {
    /// The API key to use for requests: the environment wins over the file.
    pub fn resolved_key(&self) -> String {
        std::env::var("NEWS_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .unwrap_or_else(|| self.api_key.clone())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl FeedConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

impl AppConfig {
    fn app_config_dir() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        let app_config_dir = config_dir.join("news-core");
        std::fs::create_dir_all(&app_config_dir)?;
        Ok(app_config_dir)
    }

    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::app_config_dir()?.join("config.json"))
    }

    /// Resolved location of the bookmark store file.
    pub fn bookmarks_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.storage.bookmarks_file {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::app_config_dir()?.join("bookmarks.json")),
        }
    }

    /// Load the configuration file, falling back to defaults when it is
    /// missing or unreadable. The defaults are written back on a best
    /// effort basis so the user has a file to edit.
    pub fn load() -> Self {
        match Self::load_from_file() {
            Ok(config) => config,
            Err(err) => {
                warn!(%err, "could not load configuration, using defaults");
                let default_config = Self::default();
                if let Err(save_err) = default_config.save() {
                    warn!(%save_err, "could not save default configuration");
                }
                default_config
            }
        }
    }

    fn load_from_file() -> Result<Self, ConfigError> {
        let config_path = Self::config_file_path()?;
        let config_content = std::fs::read_to_string(config_path)?;
        let config: AppConfig = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_file_path()?;
        let config_json = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, config_json)?;
        Ok(())
    }
}
