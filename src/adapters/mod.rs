pub mod apple_music;
pub mod deezer;
pub mod soundcloud;
pub mod spotify;
pub mod tidal;
pub mod youtube;

use crate::{http::HttpClient, link::Provider, metadata::Metadata, verify};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

/// One link in a result, pointing at the item on a target provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterResult {
    #[serde(rename = "type")]
    pub provider: Provider,
    pub url: String,
    #[serde(rename = "isVerified")]
    pub is_verified: bool,
}

/// Top hit of a provider search, before verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub url: String,
}

/// What an adapter returns when it has no verified hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnMismatch {
    /// Nothing, the provider is left out of the result.
    Omit,
    /// An unverified link to the provider's own search page.
    SearchUrl,
}

/// A target provider.
///
/// Implementations only talk to the provider. Verification and the fallback
/// policy live in [`resolve`], which is the only way the aggregator calls an
/// adapter.
pub trait Adapter: Send + Sync {
    fn provider(&self) -> Provider;

    fn on_mismatch(&self) -> OnMismatch;

    /// Only offered when some other adapter produced a verified link.
    fn requires_verified_peer(&self) -> bool {
        false
    }

    /// The provider's human search page for `query`.
    fn search_url(&self, query: &str) -> anyhow::Result<String>;

    /// Ask the provider for its best match. `Ok(None)` means the provider
    /// had nothing, or has no search this adapter can use.
    fn search(&self, _query: &str, _metadata: &Metadata) -> anyhow::Result<Option<Candidate>> {
        Ok(None)
    }
}

/// Run one adapter. Never fails: errors are logged and folded into the
/// adapter's mismatch policy.
pub fn resolve(adapter: &dyn Adapter, query: &str, metadata: &Metadata) -> Option<AdapterResult> {
    let provider = adapter.provider();

    let candidate = adapter.search(query, metadata).unwrap_or_else(|err| {
        log::warn!("adapter={provider} outcome=error err={err:#}");
        None
    });

    if let Some(candidate) = candidate {
        if verify::matches_item(&candidate.title, query, &metadata.title) {
            log::info!("adapter={provider} outcome=verified url={}", candidate.url);
            return Some(AdapterResult {
                provider,
                url: candidate.url,
                is_verified: true,
            });
        }

        log::debug!(
            "adapter={provider} outcome=mismatch title={:?} query={query:?}",
            candidate.title
        );
    }

    match adapter.on_mismatch() {
        OnMismatch::Omit => {
            log::debug!("adapter={provider} outcome=omitted");
            None
        }
        OnMismatch::SearchUrl => match adapter.search_url(query) {
            Ok(url) => {
                log::debug!("adapter={provider} outcome=search_url");
                Some(AdapterResult {
                    provider,
                    url,
                    is_verified: false,
                })
            }
            Err(err) => {
                log::warn!("adapter={provider} outcome=error err={err:#}");
                None
            }
        },
    }
}

/// Every target adapter, in result order.
pub struct AdapterSet {
    adapters: Vec<Box<dyn Adapter>>,
}

impl AdapterSet {
    pub fn new(http: Arc<dyn HttpClient>, youtube_api_key: Option<String>) -> Self {
        let adapters: Vec<Box<dyn Adapter>> = vec![
            Box::new(spotify::SpotifyAdapter::new(http.clone())),
            Box::new(youtube::YouTubeAdapter::new(http.clone(), youtube_api_key)),
            Box::new(apple_music::AppleMusicAdapter::new(http.clone())),
            Box::new(deezer::DeezerAdapter::new(http)),
            Box::new(soundcloud::SoundCloudAdapter),
            Box::new(tidal::TidalAdapter),
        ];

        Self { adapters }
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Adapter> {
        self.adapters.iter().map(|a| a.as_ref())
    }
}

/// `base` with `params` as a form-encoded query string (spaces become `+`).
pub(crate) fn url_with_query(base: &str, params: &[(&str, &str)]) -> anyhow::Result<String> {
    Ok(Url::parse_with_params(base, params)?.into())
}

/// `base` with `segment` appended as one percent-encoded path segment.
pub(crate) fn url_with_segment(base: &str, segment: &str) -> anyhow::Result<String> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("{base} cannot be a base url"))?
        .pop_if_empty()
        .push(segment);
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::MediaType;

    struct Stub {
        policy: OnMismatch,
        reply: fn() -> anyhow::Result<Option<Candidate>>,
    }

    impl Adapter for Stub {
        fn provider(&self) -> Provider {
            Provider::Deezer
        }

        fn on_mismatch(&self) -> OnMismatch {
            self.policy
        }

        fn search_url(&self, query: &str) -> anyhow::Result<String> {
            url_with_query("https://example.com/search", &[("q", query)])
        }

        fn search(&self, _query: &str, _metadata: &Metadata) -> anyhow::Result<Option<Candidate>> {
            (self.reply)()
        }
    }

    fn metadata() -> Metadata {
        Metadata {
            title: "Do Not Disturb".into(),
            description: "Drake · Song · 2017".into(),
            media_type: MediaType::Song,
            image: String::new(),
            audio_preview: None,
        }
    }

    fn hit() -> anyhow::Result<Option<Candidate>> {
        Ok(Some(Candidate {
            title: "Do Not Disturb".into(),
            url: "https://example.com/track/1".into(),
        }))
    }

    fn wrong_hit() -> anyhow::Result<Option<Candidate>> {
        Ok(Some(Candidate {
            title: "Hotline Bling".into(),
            url: "https://example.com/track/2".into(),
        }))
    }

    fn failure() -> anyhow::Result<Option<Candidate>> {
        anyhow::bail!("connection reset")
    }

    #[test]
    fn test_verified_hit() {
        let stub = Stub { policy: OnMismatch::Omit, reply: hit };
        let result = resolve(&stub, "Do Not Disturb Drake", &metadata()).unwrap();
        assert!(result.is_verified);
        assert_eq!(result.url, "https://example.com/track/1");
    }

    #[test]
    fn test_mismatch_policies() {
        let omit = Stub { policy: OnMismatch::Omit, reply: wrong_hit };
        assert_eq!(resolve(&omit, "Do Not Disturb Drake", &metadata()), None);

        let fallback = Stub { policy: OnMismatch::SearchUrl, reply: wrong_hit };
        let result = resolve(&fallback, "Do Not Disturb Drake", &metadata()).unwrap();
        assert!(!result.is_verified);
        assert_eq!(result.url, "https://example.com/search?q=Do+Not+Disturb+Drake");
    }

    #[test]
    fn test_errors_are_absorbed() {
        let omit = Stub { policy: OnMismatch::Omit, reply: failure };
        assert_eq!(resolve(&omit, "Do Not Disturb Drake", &metadata()), None);

        let fallback = Stub { policy: OnMismatch::SearchUrl, reply: failure };
        assert!(!resolve(&fallback, "Do Not Disturb Drake", &metadata()).unwrap().is_verified);
    }

    #[test]
    fn test_set_order() {
        let http = Arc::new(crate::tests::support::FakeHttp::new());
        let set = AdapterSet::new(http, None);
        let order: Vec<Provider> = set.iter().map(|a| a.provider()).collect();
        assert_eq!(order, Provider::ALL.to_vec());
        let gated: Vec<Provider> = set
            .iter()
            .filter(|a| a.requires_verified_peer())
            .map(|a| a.provider())
            .collect();
        assert_eq!(gated, vec![Provider::Tidal]);
    }

    #[test]
    fn test_url_helpers() {
        assert_eq!(
            url_with_segment("https://www.deezer.com/search/", "Do Not Disturb").unwrap(),
            "https://www.deezer.com/search/Do%20Not%20Disturb"
        );
        assert_eq!(
            url_with_query("https://listen.tidal.com/search", &[("q", "a&b c")]).unwrap(),
            "https://listen.tidal.com/search?q=a%26b+c"
        );
    }
}
