use crate::adapters::{url_with_query, Adapter, Candidate, OnMismatch};
use crate::http::HttpClient;
use crate::link::{MediaType, Provider};
use crate::metadata::Metadata;
use std::sync::Arc;

const SEARCH_URL: &str = "https://music.apple.com/us/search";
const LINK_SELECTOR: &str = r#"a[href^="https://music.apple.com/"]"#;

/// Scrapes the Apple Music web search page. Each media type has its own
/// shelf on the page; podcasts and shows have none.
pub struct AppleMusicAdapter {
    http: Arc<dyn HttpClient>,
}

impl AppleMusicAdapter {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    fn shelf(media_type: MediaType) -> Option<&'static str> {
        match media_type {
            MediaType::Song => Some("Songs"),
            MediaType::Album => Some("Albums"),
            MediaType::Playlist => Some("Playlists"),
            MediaType::Artist => Some("Artists"),
            MediaType::Podcast | MediaType::Show => None,
        }
    }
}

/// First link on the named shelf of a search page.
pub fn first_on_shelf(html: &str, shelf: &str) -> anyhow::Result<Option<Candidate>> {
    let document = scraper::Html::parse_document(html);
    let selector = scraper::Selector::parse(&format!(r#"div[aria-label="{shelf}"] {LINK_SELECTOR}"#))
        .map_err(|err| anyhow::anyhow!("bad selector for shelf {shelf}: {err:?}"))?;

    Ok(document.select(&selector).next().and_then(|el| {
        let url = el.attr("href")?.to_string();
        let title = el.text().collect::<String>().trim().to_string();
        Some(Candidate { title, url })
    }))
}

impl Adapter for AppleMusicAdapter {
    fn provider(&self) -> Provider {
        Provider::AppleMusic
    }

    fn on_mismatch(&self) -> OnMismatch {
        OnMismatch::Omit
    }

    fn search_url(&self, query: &str) -> anyhow::Result<String> {
        url_with_query(SEARCH_URL, &[("term", query)])
    }

    fn search(&self, query: &str, metadata: &Metadata) -> anyhow::Result<Option<Candidate>> {
        let Some(shelf) = Self::shelf(metadata.media_type) else {
            return Ok(None);
        };

        let html = self.http.get_text(&self.search_url(query)?)?;
        first_on_shelf(&html, shelf)
    }
}
