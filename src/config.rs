use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::common::constants::{
    APP_DIR_NAME, CACHE_FILE_NAME, CATALOG_URL, CONFIG_FILE_NAME, DETAIL_BASE_URL,
    HTTP_TIMEOUT_SECS, LOG_DIR_NAME, MAX_REDIRECTS,
};
use crate::common::error::{FontError, Result};
use crate::infra::http_client::HttpSettings;

pub const CONFIG_PATH_ENV: &str = "WEBFONT_DL_CONFIG";
pub const CATALOG_URL_ENV: &str = "WEBFONT_DL_CATALOG_URL";
pub const DETAIL_BASE_URL_ENV: &str = "WEBFONT_DL_DETAIL_BASE_URL";
pub const CACHE_PATH_ENV: &str = "WEBFONT_DL_CACHE_PATH";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub http: HttpConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub catalog_url: String,
    pub detail_base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            catalog_url: CATALOG_URL.to_string(),
            detail_base_url: DETAIL_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub max_redirects: u8,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: HTTP_TIMEOUT_SECS,
            max_redirects: MAX_REDIRECTS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Overrides the default `<data dir>/webfont-dl/cache.json`
    pub path: Option<PathBuf>,
}

impl Config {
    /// Loads from `$WEBFONT_DL_CONFIG`, else the per-user config file.
    /// A missing file yields the defaults; environment overrides apply last.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .or_else(|| dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME)));

        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            FontError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&config_content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.http.timeout_seconds == 0 {
            return Err(FontError::Config("http.timeout_seconds must be greater than 0".to_string()));
        }
        Ok(config)
    }

    fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies endpoint and cache overrides looked up through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(CATALOG_URL_ENV) {
            self.api.catalog_url = url;
        }
        if let Some(url) = lookup(DETAIL_BASE_URL_ENV) {
            self.api.detail_base_url = url;
        }
        if let Some(path) = lookup(CACHE_PATH_ENV) {
            self.cache.path = Some(PathBuf::from(path));
        }
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            timeout: Duration::from_secs(self.http.timeout_seconds),
            max_redirects: self.http.max_redirects,
        }
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache
            .path
            .clone()
            .unwrap_or_else(|| app_data_dir().join(CACHE_FILE_NAME))
    }

    pub fn log_dir(&self) -> PathBuf {
        app_data_dir().join(LOG_DIR_NAME)
    }
}

/// Per-user application data directory, falling back to the temp dir.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}
