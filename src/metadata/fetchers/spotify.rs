use crate::http::HttpClient;
use crate::link::{CanonicalLink, MediaType, Provider};
use crate::metadata::fetchers::MetadataFetcher;
use crate::metadata::page::parse_page_meta;
use crate::metadata::types::Metadata;
use anyhow::Context;
use std::sync::Arc;

pub struct SpotifyFetcher {
    http: Arc<dyn HttpClient>,
}

impl SpotifyFetcher {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

impl MetadataFetcher for SpotifyFetcher {
    fn provider(&self) -> Provider {
        Provider::Spotify
    }

    fn fetch(&self, link: &CanonicalLink) -> anyhow::Result<Metadata> {
        let html = self.http.get_text(&link.source_url)?;
        let page = parse_page_meta(&html);
        log::debug!("fetcher=spotify fields=[{}]", page.describe_fields());

        // og:type is what Spotify itself reports, the path is the fallback
        let media_type = page
            .og_type
            .as_deref()
            .and_then(MediaType::from_og_type)
            .unwrap_or(link.media_type);

        Ok(Metadata {
            title: page.title.context("og:title not found")?,
            description: page.description.unwrap_or_default(),
            media_type,
            image: page.image.context("og:image not found")?,
            audio_preview: page.audio,
        })
    }

    fn name(&self) -> &'static str {
        "Spotify"
    }
}
