use crate::adapters::{url_with_query, Adapter, OnMismatch};
use crate::link::Provider;

const SEARCH_URL: &str = "https://soundcloud.com/search/sounds";

/// No usable public search, always links to the web search page.
pub struct SoundCloudAdapter;

impl Adapter for SoundCloudAdapter {
    fn provider(&self) -> Provider {
        Provider::SoundCloud
    }

    fn on_mismatch(&self) -> OnMismatch {
        OnMismatch::SearchUrl
    }

    fn search_url(&self, query: &str) -> anyhow::Result<String> {
        url_with_query(SEARCH_URL, &[("q", query)])
    }
}
