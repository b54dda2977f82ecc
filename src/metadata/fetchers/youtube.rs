use crate::http::HttpClient;
use crate::link::{CanonicalLink, Provider};
use crate::metadata::fetchers::MetadataFetcher;
use crate::metadata::page::parse_page_meta;
use crate::metadata::types::Metadata;
use anyhow::Context;
use std::sync::Arc;

pub struct YouTubeFetcher {
    http: Arc<dyn HttpClient>,
}

impl YouTubeFetcher {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    fn thumbnail_url(video_id: &str) -> String {
        format!("https://i.ytimg.com/vi/{video_id}/hqdefault.jpg")
    }
}

impl MetadataFetcher for YouTubeFetcher {
    fn provider(&self) -> Provider {
        Provider::YouTube
    }

    fn fetch(&self, link: &CanonicalLink) -> anyhow::Result<Metadata> {
        let html = self.http.get_text(&link.source_url)?;
        let page = parse_page_meta(&html);
        log::debug!("fetcher=youtube fields=[{}]", page.describe_fields());

        // YouTube's og:type says "video" for everything, the link knows better
        let image = match page.image {
            Some(image) => image,
            None if link.media_type == crate::link::MediaType::Song => {
                Self::thumbnail_url(&link.id)
            }
            None => anyhow::bail!("og:image not found"),
        };

        Ok(Metadata {
            title: page.title.context("og:title not found")?,
            description: page.description.unwrap_or_default(),
            media_type: link.media_type,
            image,
            audio_preview: None,
        })
    }

    fn name(&self) -> &'static str {
        "YouTube"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::MediaType;
    use crate::tests::support::{fixtures, FakeHttp};

    fn link() -> CanonicalLink {
        CanonicalLink {
            provider: Provider::YouTube,
            media_type: MediaType::Song,
            id: "dQw4w9WgXcQ".into(),
            source_url: fixtures::YOUTUBE_VIDEO_URL.into(),
        }
    }

    #[test]
    fn test_watch_page() {
        let http = Arc::new(FakeHttp::new());
        http.text(fixtures::YOUTUBE_VIDEO_URL, fixtures::youtube_video_page());

        let metadata = YouTubeFetcher::new(http).fetch(&link()).unwrap();
        assert_eq!(metadata.title, "Never Gonna Give You Up");
        assert_eq!(metadata.media_type, MediaType::Song);
        assert_eq!(metadata.audio_preview, None);
    }

    #[test]
    fn test_missing_image_uses_thumbnail() {
        let http = Arc::new(FakeHttp::new());
        http.text(
            fixtures::YOUTUBE_VIDEO_URL,
            r#"<html><head><meta property="og:title" content="Some Video"/></head></html>"#,
        );

        let metadata = YouTubeFetcher::new(http).fetch(&link()).unwrap();
        assert_eq!(metadata.image, "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg");
    }

    #[test]
    fn test_network_error_propagates() {
        let http = Arc::new(FakeHttp::new());
        http.status(fixtures::YOUTUBE_VIDEO_URL, 500);

        assert!(YouTubeFetcher::new(http).fetch(&link()).is_err());
    }
}
