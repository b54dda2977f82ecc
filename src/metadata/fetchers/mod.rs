pub mod spotify;
pub mod youtube;

use crate::{
    cache::CacheStore,
    errors::ResolveError,
    http::HttpClient,
    link::{CanonicalLink, Provider},
    metadata::types::Metadata,
};
use std::sync::Arc;

/// Reads the public page of a source provider and extracts its metadata.
pub trait MetadataFetcher: Send + Sync {
    /// Source provider this fetcher understands.
    fn provider(&self) -> Provider;

    /// Fetch and extract. Missing required fields are errors.
    fn fetch(&self, link: &CanonicalLink) -> anyhow::Result<Metadata>;

    /// Get the name of this fetcher for logging/debugging
    fn name(&self) -> &'static str;
}

/// All source providers with an implemented metadata path, fronted by the
/// metadata cache.
pub struct FetcherRegistry {
    fetchers: Vec<Box<dyn MetadataFetcher>>,
    cache: CacheStore,
}

impl FetcherRegistry {
    pub fn new(http: Arc<dyn HttpClient>, cache: CacheStore) -> Self {
        let fetchers: Vec<Box<dyn MetadataFetcher>> = vec![
            Box::new(spotify::SpotifyFetcher::new(http.clone())),
            Box::new(youtube::YouTubeFetcher::new(http)),
        ];

        Self { fetchers, cache }
    }

    fn fetcher_for(&self, provider: Provider) -> Option<&dyn MetadataFetcher> {
        self.fetchers
            .iter()
            .find(|f| f.provider() == provider)
            .map(|f| f.as_ref())
    }

    pub fn supports(&self, provider: Provider) -> bool {
        self.fetcher_for(provider).is_some()
    }

    /// Cached metadata for the link, or a fresh fetch that is then cached.
    pub fn fetch_metadata(&self, link: &CanonicalLink) -> Result<Metadata, ResolveError> {
        let fetcher = self
            .fetcher_for(link.provider)
            .ok_or(ResolveError::UnsupportedSource(link.provider))?;

        if let Some(metadata) = self.cache.get_metadata(&link.source_url) {
            return Ok(metadata);
        }

        let name = fetcher.name();
        let metadata = fetcher.fetch(link).map_err(|err| {
            log::warn!("fetcher={name} url={} outcome=error err={err:#}", link.source_url);
            ResolveError::metadata_fetch(&link.source_url, format!("{err:#}"))
        })?;

        log::info!(
            "fetcher={name} url={} outcome=success type={:?}",
            link.source_url,
            metadata.media_type
        );

        self.cache.set_metadata(&link.source_url, &metadata);

        Ok(metadata)
    }
}
