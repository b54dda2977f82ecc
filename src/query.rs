use crate::{link::MediaType, metadata::Metadata};
use once_cell::sync::Lazy;
use regex::Regex;

static PICTOGRAPHIC_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"[\x{1F600}-\x{1F64F}\x{1F300}-\x{1F5FF}\x{1F680}-\x{1F6FF}\x{2600}-\x{26FF}\x{2700}-\x{27BF}\x{1F900}-\x{1F9FF}\x{1F1E0}-\x{1F1FF}]",
    )
    .expect("Failed to compile pictographic regex")
});

static SONG_ARTIST_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^·]+) · Song · \d+$").expect("Failed to compile song artist regex")
});

static ALBUM_ARTIST_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(.+?) · Album ·").expect("Failed to compile album artist regex")
});

static PODCAST_SHOW_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"from (.+?) on Spotify\.").expect("Failed to compile podcast show regex")
});

const PLAYLIST_PREFIX: &str = "This is ";
const PLAYLIST_SUFFIX: &str = " Playlist";

fn capture(regex: &Regex, text: &str) -> Option<String> {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}

fn with_suffix(title: String, suffix: Option<String>) -> String {
    match suffix {
        Some(suffix) => format!("{title} {suffix}"),
        None => title,
    }
}

/// Provider-agnostic search string for the item described by `metadata`.
///
/// Each media type has its own rule and rules never combine. When a rule
/// finds nothing the stripped title is returned as is.
pub fn build_query(metadata: &Metadata) -> String {
    let title = PICTOGRAPHIC_REGEX
        .replace_all(&metadata.title, "")
        .trim()
        .to_string();
    let description = metadata.description.as_str();

    match metadata.media_type {
        MediaType::Song => with_suffix(title, capture(&SONG_ARTIST_REGEX, description)),
        MediaType::Album => with_suffix(title, capture(&ALBUM_ARTIST_REGEX, description)),
        MediaType::Playlist => {
            let title = title.strip_prefix(PLAYLIST_PREFIX).unwrap_or(&title);
            format!("{title}{PLAYLIST_SUFFIX}")
        }
        MediaType::Podcast => with_suffix(title, capture(&PODCAST_SHOW_REGEX, description)),
        MediaType::Artist | MediaType::Show => title,
    }
}
