use crate::http::HttpOptions;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.yaml";

const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
const DEFAULT_APP_URL: &str = "http://localhost:8080";
/// Metadata of an item rarely changes
const DEFAULT_METADATA_TTL_SECS: u64 = 60 * 60 * 24 * 7;
const DEFAULT_RESULT_TTL_SECS: u64 = 60 * 60 * 24;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    File,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,

    #[serde(default = "default_metadata_ttl_secs")]
    pub metadata_ttl_secs: u64,

    #[serde(default = "default_result_ttl_secs")]
    pub result_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            metadata_ttl_secs: DEFAULT_METADATA_TTL_SECS,
            result_ttl_secs: DEFAULT_RESULT_TTL_SECS,
        }
    }
}

fn default_metadata_ttl_secs() -> u64 {
    DEFAULT_METADATA_TTL_SECS
}

fn default_result_ttl_secs() -> u64 {
    DEFAULT_RESULT_TTL_SECS
}

/// Link shortening service. Universal links are left as they are unless
/// both fields are set.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShortenerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct YouTubeConfig {
    /// YouTube Data API v3 key. Without it YouTube links are never found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Base of universal links
    #[serde(default = "default_app_url")]
    pub app_url: String,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub shortener: ShortenerConfig,

    #[serde(default)]
    pub youtube: YouTubeConfig,

    #[serde(default)]
    pub http: HttpOptions,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            app_url: default_app_url(),
            cache: CacheConfig::default(),
            shortener: ShortenerConfig::default(),
            youtube: YouTubeConfig::default(),
            http: HttpOptions::default(),
            base_path: PathBuf::new(),
        }
    }
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

fn default_app_url() -> String {
    DEFAULT_APP_URL.to_string()
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Config {
    fn validate(&mut self) -> anyhow::Result<()> {
        self.app_url = self.app_url.trim().trim_end_matches('/').to_string();
        if self.app_url.is_empty() {
            bail!("app_url must not be empty");
        }
        url::Url::parse(&self.app_url)
            .with_context(|| format!("app_url is not a valid url: {}", self.app_url))?;

        if self.cache.metadata_ttl_secs == 0 {
            bail!("cache.metadata_ttl_secs must be greater than 0");
        }

        if self.cache.result_ttl_secs == 0 {
            bail!("cache.result_ttl_secs must be greater than 0");
        }

        if self.http.retries == 0 {
            bail!("http.retries must be greater than 0");
        }

        if self.http.timeout_secs == 0 {
            bail!("http.timeout_secs must be greater than 0");
        }

        if self.shortener.api_url.is_some() != self.shortener.api_key.is_some() {
            log::warn!("shortener needs both api_url and api_key, universal links stay long");
        }

        Ok(())
    }

    /// Load `config.yaml` from `base_path`, writing the defaults first if it
    /// does not exist yet.
    pub fn load_with(base_path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let base_path = base_path.as_ref();
        let config_path = base_path.join(CONFIG_FILE);

        // create new if does not exist
        if !config_path.exists() {
            std::fs::create_dir_all(base_path)
                .with_context(|| format!("failed to create {}", base_path.display()))?;
            std::fs::write(&config_path, serde_yml::to_string(&Self::default())?)
                .with_context(|| format!("failed to write {}", config_path.display()))?;
        }

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let mut config: Self = serde_yml::from_str(&config_str).context("config is malformed")?;

        config.base_path = base_path.to_path_buf();
        config.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        config.apply_env();

        Ok(config)
    }

    /// Secrets from the environment win over the file and are never saved.
    fn apply_env(&mut self) {
        if let Some(key) = non_empty_env("TUNELINK_YOUTUBE_API_KEY") {
            self.youtube.api_key = Some(key);
        }

        if let Some(key) = non_empty_env("TUNELINK_SHORTENER_API_KEY") {
            self.shortener.api_key = Some(key);
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_str = serde_yml::to_string(&self)?;
        std::fs::write(self.base_path.join(CONFIG_FILE), config_str)?;
        Ok(())
    }
}
