use crate::adapters::{url_with_query, Adapter, Candidate, OnMismatch};
use crate::http::HttpClient;
use crate::link::{MediaType, Provider};
use crate::metadata::Metadata;
use anyhow::Context;
use serde::Deserialize;
use std::sync::Arc;

const API_URL: &str = "https://www.googleapis.com/youtube/v3/search";
const SEARCH_URL: &str = "https://www.youtube.com/results";

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: ItemId,
    snippet: Snippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemId {
    video_id: Option<String>,
    playlist_id: Option<String>,
    channel_id: Option<String>,
}

#[derive(Deserialize)]
struct Snippet {
    title: String,
}

/// YouTube Data API search. Without an api key every search fails, which
/// the adapter boundary turns into an omitted link.
pub struct YouTubeAdapter {
    http: Arc<dyn HttpClient>,
    api_key: Option<String>,
}

impl YouTubeAdapter {
    pub fn new(http: Arc<dyn HttpClient>, api_key: Option<String>) -> Self {
        Self { http, api_key }
    }

    fn kind(media_type: MediaType) -> &'static str {
        match media_type {
            MediaType::Song | MediaType::Podcast => "video",
            MediaType::Album | MediaType::Playlist => "playlist",
            MediaType::Artist | MediaType::Show => "channel",
        }
    }

    pub fn api_url(query: &str, kind: &str, api_key: &str) -> anyhow::Result<String> {
        url_with_query(
            API_URL,
            &[
                ("part", "snippet"),
                ("maxResults", "1"),
                ("q", query),
                ("type", kind),
                ("key", api_key),
            ],
        )
    }
}

/// Titles in API snippets come HTML-escaped, named and numeric entities alike.
fn unescape(title: &str) -> String {
    scraper::Html::parse_fragment(title)
        .root_element()
        .text()
        .collect()
}

/// Top item of a search API response, as a watch, playlist or channel url.
pub fn first_item(body: &str) -> anyhow::Result<Option<Candidate>> {
    let response: SearchResponse =
        serde_json::from_str(body).context("unexpected youtube search response")?;

    Ok(response.items.into_iter().find_map(|item| {
        let url = match item.id {
            ItemId { video_id: Some(id), .. } => format!("https://www.youtube.com/watch?v={id}"),
            ItemId { playlist_id: Some(id), .. } => {
                format!("https://www.youtube.com/playlist?list={id}")
            }
            ItemId { channel_id: Some(id), .. } => format!("https://www.youtube.com/channel/{id}"),
            _ => return None,
        };

        Some(Candidate {
            title: unescape(&item.snippet.title),
            url,
        })
    }))
}

impl Adapter for YouTubeAdapter {
    fn provider(&self) -> Provider {
        Provider::YouTube
    }

    fn on_mismatch(&self) -> OnMismatch {
        OnMismatch::Omit
    }

    fn search_url(&self, query: &str) -> anyhow::Result<String> {
        url_with_query(SEARCH_URL, &[("search_query", query)])
    }

    fn search(&self, query: &str, metadata: &Metadata) -> anyhow::Result<Option<Candidate>> {
        let api_key = self
            .api_key
            .as_deref()
            .context("youtube api key is not configured")?;

        let url = Self::api_url(query, Self::kind(metadata.media_type), api_key)?;
        let body = self.http.get_text(&url)?;
        first_item(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::{fixtures, FakeHttp};

    fn podcast() -> Metadata {
        Metadata {
            title: "The End of Twitter as We Know It".into(),
            description: String::new(),
            media_type: MediaType::Podcast,
            image: String::new(),
            audio_preview: None,
        }
    }

    #[test]
    fn test_first_video() {
        let candidate = first_item(&fixtures::youtube_podcast_response()).unwrap().unwrap();
        assert_eq!(candidate.url, "https://www.youtube.com/watch?v=0atwuUWhKWs");
        assert!(candidate.title.starts_with("The End of Twitter as We Know It"));
    }

    #[test]
    fn test_playlist_and_escaped_title() {
        let body = r#"{"items":[{"id":{"kind":"youtube#playlist","playlistId":"PL123"},"snippet":{"title":"Views &amp; More &#39;16"}}]}"#;
        let candidate = first_item(body).unwrap().unwrap();
        assert_eq!(candidate.url, "https://www.youtube.com/playlist?list=PL123");
        assert_eq!(candidate.title, "Views & More '16");
    }

    #[test]
    fn test_numeric_entities_are_decoded() {
        let body = r#"{"items":[{"id":{"videoId":"abc"},"snippet":{"title":"Don&#8217;t Stop Me Now &lt;Live&gt;"}}]}"#;
        let candidate = first_item(body).unwrap().unwrap();
        assert_eq!(candidate.title, "Don\u{2019}t Stop Me Now <Live>");
    }

    #[test]
    fn test_no_items() {
        assert_eq!(first_item(r#"{"items":[]}"#).unwrap(), None);
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        let http = Arc::new(FakeHttp::new());
        let adapter = YouTubeAdapter::new(http.clone(), None);

        assert!(adapter.search("anything", &podcast()).is_err());
        assert_eq!(http.total_calls(), 0);
    }

    #[test]
    fn test_search_with_key() {
        let http = Arc::new(FakeHttp::new());
        let query = "The End of Twitter as We Know It Waveform: The MKBHD Podcast";
        http.text(
            &YouTubeAdapter::api_url(query, "video", "test-key").unwrap(),
            &fixtures::youtube_podcast_response(),
        );

        let adapter = YouTubeAdapter::new(http, Some("test-key".into()));
        let candidate = adapter.search(query, &podcast()).unwrap().unwrap();
        assert_eq!(candidate.url, "https://www.youtube.com/watch?v=0atwuUWhKWs");
    }
}
