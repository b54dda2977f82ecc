use crate::{
    cache::{Cache, CacheStore, FileCache, MemoryCache},
    config::{CacheBackend, Config},
    http::{HttpClient, ReqwestClient},
    resolver::{Resolver, ResolverOptions},
    shortener::{HttpShortener, NoopShortener, Shortener},
    stats::SearchCounter,
};
use anyhow::{Context, Result};
use homedir::my_home;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub struct AppPaths {
    pub base_path: PathBuf,
    pub cache_path: PathBuf,
}

/// Wires configuration into a ready [`Resolver`].
pub struct AppFactory;

impl AppFactory {
    /// Application paths. `base_override` comes from `--config`.
    pub fn get_paths(base_override: Option<&str>) -> Result<AppPaths> {
        let base_path = match base_override {
            Some(path) => PathBuf::from(path),
            None => Self::get_base_path()?,
        };

        std::fs::create_dir_all(&base_path)
            .context("Failed to create application base directory")?;

        Ok(AppPaths {
            cache_path: base_path.join("cache"),
            base_path,
        })
    }

    fn get_base_path() -> Result<PathBuf> {
        if let Ok(base_path) = std::env::var("TUNELINK_BASE_PATH") {
            return Ok(PathBuf::from(base_path));
        }

        let home = my_home()
            .context("Could not determine home directory")?
            .context("Home directory path is empty")?;

        Ok(home.join(".local/share/tunelink"))
    }

    pub fn create_config(paths: &AppPaths) -> Result<Config> {
        Config::load_with(&paths.base_path).context("Failed to load config")
    }

    fn create_cache(config: &Config, paths: &AppPaths) -> Result<CacheStore> {
        let cache: Arc<dyn Cache> = match config.cache.backend {
            CacheBackend::Memory => Arc::new(MemoryCache::new()),
            CacheBackend::File => {
                let cache_path = paths.cache_path.to_string_lossy();
                Arc::new(FileCache::new(&cache_path).with_context(|| {
                    format!("Failed to create cache directory {cache_path}")
                })?)
            }
        };

        log::debug!("cache backend={:?}", config.cache.backend);

        Ok(CacheStore::new(
            cache,
            Duration::from_secs(config.cache.metadata_ttl_secs),
            Duration::from_secs(config.cache.result_ttl_secs),
        ))
    }

    fn create_shortener(config: &Config, http: Arc<dyn HttpClient>) -> Arc<dyn Shortener> {
        match (&config.shortener.api_url, &config.shortener.api_key) {
            (Some(api_url), Some(api_key)) => {
                log::debug!("universal links shortened via {api_url}");
                Arc::new(HttpShortener::new(http, api_url.clone(), api_key.clone()))
            }
            _ => Arc::new(NoopShortener),
        }
    }

    pub fn create_resolver(config: &Config, paths: &AppPaths) -> Result<Resolver> {
        let http: Arc<dyn HttpClient> =
            Arc::new(ReqwestClient::new(&config.http).context("Failed to build http client")?);

        if config.youtube.api_key.is_none() {
            log::warn!("youtube.api_key is not set, YouTube links will not be found");
        }

        Ok(Resolver::new(
            http.clone(),
            Self::create_cache(config, paths)?,
            Self::create_shortener(config, http),
            Arc::new(SearchCounter::new()),
            ResolverOptions {
                app_url: config.app_url.clone(),
                youtube_api_key: config.youtube.api_key.clone(),
            },
        ))
    }
}
