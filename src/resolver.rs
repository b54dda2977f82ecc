use crate::{
    adapters::{self, AdapterResult, AdapterSet},
    cache::{result_key, CacheStore},
    errors::ResolveError,
    http::HttpClient,
    link::{match_canonical, CanonicalLink, LinkParser, MediaType, Provider},
    metadata::{FetcherRegistry, Metadata},
    query::build_query,
    search_id::SearchId,
    shortener::{shorten_or_keep, Shortener},
    stats::SearchCounter,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeSet, HashSet},
    sync::Arc,
    thread,
};

/// Everything known about one linked item, plus where to find it elsewhere.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: SearchId,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub title: String,
    pub description: String,
    pub image: String,
    #[serde(rename = "audio", default, skip_serializing_if = "Option::is_none")]
    pub audio_preview: Option<String>,
    #[serde(rename = "source")]
    pub source_url: String,
    #[serde(rename = "universalLink")]
    pub universal_url: String,
    pub links: Vec<AdapterResult>,
}

impl SearchResult {
    fn new(id: SearchId, metadata: Metadata, source_url: String, universal_url: String) -> Self {
        Self {
            id,
            media_type: metadata.media_type,
            title: metadata.title,
            description: metadata.description,
            image: metadata.image,
            audio_preview: metadata.audio_preview,
            source_url,
            universal_url,
            links: Vec::new(),
        }
    }
}

pub struct ResolverOptions {
    /// Base of universal links, `{app_url}?id={id}`
    pub app_url: String,
    pub youtube_api_key: Option<String>,
}

/// Turns one link into a [`SearchResult`] with links on every other provider.
pub struct Resolver {
    parser: LinkParser,
    fetchers: FetcherRegistry,
    adapters: AdapterSet,
    cache: CacheStore,
    shortener: Arc<dyn Shortener>,
    counter: Arc<SearchCounter>,
    app_url: String,
}

/// Requested adapters as a set; nothing or an empty list means all of them.
fn selection_set(selected: Option<&[Provider]>) -> BTreeSet<Provider> {
    match selected {
        Some(selected) if !selected.is_empty() => selected.iter().copied().collect(),
        _ => Provider::ALL.into_iter().collect(),
    }
}

impl Resolver {
    pub fn new(
        http: Arc<dyn HttpClient>,
        cache: CacheStore,
        shortener: Arc<dyn Shortener>,
        counter: Arc<SearchCounter>,
        opts: ResolverOptions,
    ) -> Self {
        Self {
            parser: LinkParser::new(http.clone()),
            fetchers: FetcherRegistry::new(http.clone(), cache.clone()),
            adapters: AdapterSet::new(http, opts.youtube_api_key),
            cache,
            shortener,
            counter,
            app_url: opts.app_url,
        }
    }

    pub fn parse(&self, link: &str) -> Result<CanonicalLink, ResolveError> {
        self.parser.parse(link)
    }

    /// Resolve an inbound link against the selected adapters (all by default).
    pub fn resolve(
        &self,
        link: &str,
        selected: Option<&[Provider]>,
    ) -> Result<SearchResult, ResolveError> {
        let source = self.parser.parse(link)?;
        self.resolve_link(&source, &selection_set(selected))
    }

    /// Resolve from an id, going back to the source link if the cached
    /// result is gone.
    pub fn resolve_id(
        &self,
        id: &str,
        selected: Option<&[Provider]>,
    ) -> Result<SearchResult, ResolveError> {
        let id = SearchId::parse(id)?;
        self.resolve(&id.source_url()?, selected)
    }

    /// Cache-only lookup of a full result.
    pub fn lookup(&self, id: &str) -> Result<SearchResult, ResolveError> {
        let id = SearchId::parse(id)?;
        let key = result_key(&id, &selection_set(None));

        self.cache.get_result(&key).ok_or(ResolveError::NotFound)
    }

    pub fn search_count(&self) -> u64 {
        self.counter.get()
    }

    fn resolve_link(
        &self,
        source: &CanonicalLink,
        selection: &BTreeSet<Provider>,
    ) -> Result<SearchResult, ResolveError> {
        if !self.fetchers.supports(source.provider) {
            return Err(ResolveError::UnsupportedSource(source.provider));
        }

        let id = SearchId::from_source(&source.source_url);
        let key = result_key(&id, selection);

        if let Some(result) = self.cache.get_result(&key) {
            log::info!("resolve id={id} outcome=cached");
            return Ok(result);
        }

        let mut metadata = self.fetchers.fetch_metadata(source)?;
        let query = build_query(&metadata);
        let universal_url = format!("{}?id={id}", self.app_url);

        log::info!(
            "resolve id={id} source={} type={:?} query={query:?}",
            source.provider,
            metadata.media_type
        );

        // asking only for the source provider needs no searching at all
        if selection.len() == 1 && selection.contains(&source.provider) {
            log::info!("resolve id={id} outcome=self_link");
            let mut result = SearchResult::new(id, metadata, source.source_url.clone(), universal_url);
            result.links.push(AdapterResult {
                provider: source.provider,
                url: source.source_url.clone(),
                is_verified: true,
            });
            return Ok(result);
        }

        let (mut links, universal_url) = self.fan_out(source, selection, &query, &metadata, &universal_url);

        if source.provider != Provider::Spotify {
            if let Some(found) = links.iter().find(|link| link.provider == Provider::Spotify) {
                match self.spotify_metadata(&found.url) {
                    Ok(spotify) => metadata = spotify,
                    Err(err) => log::warn!("resolve id={id} spotify metadata refresh failed: {err}"),
                }
            }
        }

        let mut seen = HashSet::new();
        links.retain(|link| seen.insert(link.provider));

        if links.iter().any(|link| link.is_verified) {
            let gated = self.adapters.iter().filter(|adapter| {
                adapter.requires_verified_peer()
                    && adapter.provider() != source.provider
                    && selection.contains(&adapter.provider())
            });

            links.extend(gated.filter_map(|adapter| adapters::resolve(adapter, &query, &metadata)));
        }

        let mut result = SearchResult::new(id, metadata, source.source_url.clone(), universal_url);
        result.links = links;

        self.cache.set_result(&key, &result);
        let searches = self.counter.increment();

        log::info!(
            "resolve id={} outcome=resolved links={} searches={searches}",
            result.id,
            result.links.len()
        );

        Ok(result)
    }

    /// Run every eligible adapter and the shortener in parallel. Results keep
    /// adapter order; an adapter that fails or panics is simply absent.
    fn fan_out(
        &self,
        source: &CanonicalLink,
        selection: &BTreeSet<Provider>,
        query: &str,
        metadata: &Metadata,
        universal_url: &str,
    ) -> (Vec<AdapterResult>, String) {
        thread::scope(|s| {
            let short_url = s.spawn(move || shorten_or_keep(self.shortener.as_ref(), universal_url));

            let handles: Vec<_> = self
                .adapters
                .iter()
                .filter(|adapter| {
                    let provider = adapter.provider();
                    provider != source.provider
                        && selection.contains(&provider)
                        && !adapter.requires_verified_peer()
                })
                .map(|adapter| s.spawn(move || adapters::resolve(adapter, query, metadata)))
                .collect();

            let links = handles
                .into_iter()
                .filter_map(|h| h.join().ok().flatten())
                .collect();

            let short_url = short_url.join().unwrap_or_else(|_| universal_url.to_string());

            (links, short_url)
        })
    }

    fn spotify_metadata(&self, url: &str) -> Result<Metadata, ResolveError> {
        let link = match_canonical(url).ok_or_else(|| ResolveError::invalid_link(url))?;
        self.fetchers.fetch_metadata(&link)
    }
}
