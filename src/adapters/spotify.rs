use crate::adapters::{url_with_query, url_with_segment, Adapter, Candidate, OnMismatch};
use crate::http::HttpClient;
use crate::link::{clean_link, match_canonical, Provider};
use crate::metadata::Metadata;
use std::sync::Arc;
use url::Url;

const DDG_URL: &str = "https://lite.duckduckgo.com/lite/";
const SEARCH_URL: &str = "https://open.spotify.com/search/";

/// Spotify as a target. Spotify search needs OAuth, so this goes through a
/// site-restricted DuckDuckGo lite search and takes the first result that is
/// a Spotify link of the wanted type.
pub struct SpotifyAdapter {
    http: Arc<dyn HttpClient>,
}

impl SpotifyAdapter {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    pub fn ddg_url(query: &str, metadata: &Metadata) -> anyhow::Result<String> {
        let q = format!(
            "site:open.spotify.com/{} {query}",
            metadata.media_type.spotify_segment()
        );
        url_with_query(DDG_URL, &[("q", q.as_str())])
    }
}

/// DuckDuckGo wraps result links in `/l/?uddg=<target>` redirects.
fn unwrap_redirect(href: &str) -> Option<String> {
    let base = Url::parse("https://duckduckgo.com/").ok()?;
    let url = base.join(href).ok()?;

    if url.path() == "/l/" {
        return url
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned());
    }

    Some(url.into())
}

/// First DuckDuckGo lite result that is a canonical Spotify link.
pub fn first_spotify_result(html: &str, metadata: &Metadata) -> Option<Candidate> {
    let document = scraper::Html::parse_document(html);
    let result_selector = scraper::Selector::parse(".result-link").ok()?;

    document.select(&result_selector).find_map(|el| {
        let target = unwrap_redirect(el.attr("href")?)?;
        let link = match_canonical(&clean_link(&target))?;

        if link.provider != Provider::Spotify || link.media_type != metadata.media_type {
            return None;
        }

        let title = el.text().collect::<String>().trim().to_string();
        Some(Candidate {
            title,
            url: link.source_url,
        })
    })
}

impl Adapter for SpotifyAdapter {
    fn provider(&self) -> Provider {
        Provider::Spotify
    }

    fn on_mismatch(&self) -> OnMismatch {
        OnMismatch::Omit
    }

    fn search_url(&self, query: &str) -> anyhow::Result<String> {
        url_with_segment(SEARCH_URL, query)
    }

    fn search(&self, query: &str, metadata: &Metadata) -> anyhow::Result<Option<Candidate>> {
        let html = self.http.get_text(&Self::ddg_url(query, metadata)?)?;
        Ok(first_spotify_result(&html, metadata))
    }
}
