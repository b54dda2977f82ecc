use crate::adapters::{url_with_query, url_with_segment, Adapter, Candidate, OnMismatch};
use crate::http::HttpClient;
use crate::link::{MediaType, Provider};
use crate::metadata::Metadata;
use anyhow::Context;
use serde::Deserialize;
use std::sync::Arc;

const API_URL: &str = "https://api.deezer.com/search/";
const SEARCH_URL: &str = "https://www.deezer.com/search/";

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    /// tracks, albums and playlists
    title: Option<String>,
    /// artists
    name: Option<String>,
    link: String,
}

/// Deezer public search API, no key needed.
pub struct DeezerAdapter {
    http: Arc<dyn HttpClient>,
}

impl DeezerAdapter {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    fn kind(media_type: MediaType) -> Option<&'static str> {
        match media_type {
            MediaType::Song => Some("track"),
            MediaType::Album => Some("album"),
            MediaType::Playlist => Some("playlist"),
            MediaType::Artist => Some("artist"),
            MediaType::Podcast | MediaType::Show => None,
        }
    }

    pub fn api_url(query: &str, kind: &str) -> anyhow::Result<String> {
        url_with_query(&format!("{API_URL}{kind}"), &[("q", query), ("limit", "1")])
    }
}

/// Top item of a search API response.
pub fn first_item(body: &str) -> anyhow::Result<Option<Candidate>> {
    let response: SearchResponse =
        serde_json::from_str(body).context("unexpected deezer search response")?;

    Ok(response.data.into_iter().next().map(|item| Candidate {
        title: item.title.or(item.name).unwrap_or_default(),
        url: item.link,
    }))
}

impl Adapter for DeezerAdapter {
    fn provider(&self) -> Provider {
        Provider::Deezer
    }

    fn on_mismatch(&self) -> OnMismatch {
        OnMismatch::Omit
    }

    fn search_url(&self, query: &str) -> anyhow::Result<String> {
        url_with_segment(SEARCH_URL, query)
    }

    fn search(&self, query: &str, metadata: &Metadata) -> anyhow::Result<Option<Candidate>> {
        let Some(kind) = Self::kind(metadata.media_type) else {
            return Ok(None);
        };

        let body = self.http.get_text(&Self::api_url(query, kind)?)?;
        first_item(&body)
    }
}
