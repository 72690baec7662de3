//! Configuration loading from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use jobline_core::HttpConfig;
use jobline_jsearch::api::DEFAULT_BASE_URL;
use jobline_jsearch::config::{HOST_ENV, KEY_ENV};
use jobline_jsearch::{Credentials, FetchError, FetchPolicy};
use serde::Deserialize;

/// Global configuration for jobline
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub fetch: FetchConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub key: Option<String>,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub host: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            key: std::env::var(KEY_ENV).ok(),
            host: std::env::var(HOST_ENV).ok(),
            timeout_secs: 10,
        }
    }
}

impl ApiConfig {
    pub fn credentials(&self) -> Result<Credentials, FetchError> {
        Credentials::new(self.key.clone(), self.host.clone())
    }

    pub fn http(&self) -> HttpConfig {
        HttpConfig {
            request_timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub query: String,
    pub start_page: u32,
    pub num_pages: u32,
    pub page_delay_ms: u64,
    pub retry_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            query: "Data Analyst".to_string(),
            start_page: 1,
            num_pages: 3,
            page_delay_ms: 1000,
            retry_delay_ms: 2000,
        }
    }
}

impl FetchConfig {
    pub fn policy(&self) -> FetchPolicy {
        FetchPolicy {
            page_delay: Duration::from_millis(self.page_delay_ms),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// Also write `.parquet` copies of the cleaned and validated tables
    pub parquet: bool,
    pub compression_level: i32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            parquet: false,
            compression_level: jobline_core::codec::DEFAULT_ZSTD_LEVEL,
        }
    }
}

/// Deserialize a string that may contain environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./jobline.toml (current directory)
    /// 2. ~/.config/jobline/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("jobline.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "jobline") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
