use crate::metadata::types::PageMeta;

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Read Open Graph / twitter meta tags from an HTML document.
///
/// The first non-empty value wins for every field. `<title>` is only used
/// when no `og:title` / `twitter:title` is present.
pub fn parse_page_meta(html: &str) -> PageMeta {
    let document = scraper::Html::parse_document(html);
    let meta_selector = scraper::Selector::parse("meta").expect("static selector");
    let title_selector = scraper::Selector::parse("head title").expect("static selector");
    let link_selector = scraper::Selector::parse(r#"head link[rel="canonical"]"#)
        .expect("static selector");

    let mut meta = PageMeta::default();

    for element in document.select(&meta_selector) {
        let meta_prop = element.attr("property").unwrap_or_default();
        let meta_key = element.attr("name").unwrap_or(meta_prop);
        let meta_value = element.attr("content").unwrap_or_default();

        let slot = match meta_key {
            "og:title" | "twitter:title" => &mut meta.title,
            "og:description" | "twitter:description" | "description" => &mut meta.description,
            "og:type" => &mut meta.og_type,
            "og:image" | "twitter:image" => &mut meta.image,
            "og:audio" | "og:audio:url" => &mut meta.audio,
            "og:url" => &mut meta.canonical_url,
            _ => continue,
        };

        if slot.is_none() {
            *slot = non_empty(meta_value);
        }
    }

    if meta.title.is_none() {
        meta.title = document
            .select(&title_selector)
            .next()
            .and_then(|el| non_empty(&el.text().collect::<String>()));
    }

    if meta.canonical_url.is_none() {
        meta.canonical_url = document
            .select(&link_selector)
            .next()
            .and_then(|el| el.attr("href"))
            .and_then(non_empty);
    }

    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_graph_fields() {
        let html = r#"<html><head>
            <title>Do Not Disturb - song and lyrics by Drake | Spotify</title>
            <meta property="og:title" content="Do Not Disturb"/>
            <meta property="og:description" content="Drake · Song · 2017"/>
            <meta property="og:type" content="music.song"/>
            <meta property="og:image" content="https://i.scdn.co/image/cover"/>
            <meta property="og:audio" content="https://p.scdn.co/mp3-preview/clip"/>
            <meta property="og:url" content="https://open.spotify.com/track/2KvHC9z14GSl4YpkNMX384"/>
        </head><body></body></html>"#;

        let meta = parse_page_meta(html);
        assert_eq!(meta.title.as_deref(), Some("Do Not Disturb"));
        assert_eq!(meta.description.as_deref(), Some("Drake · Song · 2017"));
        assert_eq!(meta.og_type.as_deref(), Some("music.song"));
        assert_eq!(meta.image.as_deref(), Some("https://i.scdn.co/image/cover"));
        assert_eq!(meta.audio.as_deref(), Some("https://p.scdn.co/mp3-preview/clip"));
        assert_eq!(
            meta.canonical_url.as_deref(),
            Some("https://open.spotify.com/track/2KvHC9z14GSl4YpkNMX384")
        );
    }

    #[test]
    fn test_first_non_empty_value_wins() {
        let html = r#"<html><head>
            <meta property="og:title" content="  "/>
            <meta name="twitter:title" content="Twitter Title"/>
            <meta property="og:title" content="Late Title"/>
        </head></html>"#;

        assert_eq!(parse_page_meta(html).title.as_deref(), Some("Twitter Title"));
    }

    #[test]
    fn test_title_tag_fallback() {
        let html = "<html><head><title> Plain Title </title></head></html>";
        let meta = parse_page_meta(html);
        assert_eq!(meta.title.as_deref(), Some("Plain Title"));
        assert_eq!(meta.description, None);
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(parse_page_meta(""), PageMeta::default());
    }
}
