pub mod normalize;

use crate::{errors::ResolveError, http::HttpClient};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr, sync::Arc};

pub use normalize::clean_link;

static SPOTIFY_LINK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https://open\.spotify\.com/(?:intl-[a-z]{2}(?:-[A-Za-z]{2})?/)?(track|album|playlist|artist|episode|show)/(\w+)(?:[?#].*)?$",
    )
    .expect("Failed to compile Spotify link regex")
});

static SPOTIFY_LINK_MOBILE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://spotify\.link/(\w+)(?:[?#].*)?$")
        .expect("Failed to compile Spotify mobile link regex")
});

/// Unanchored, used to find the canonical link inside a redirect target.
static SPOTIFY_LINK_DESKTOP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"https://open\.spotify\.com/(?:intl-[a-z]{2}(?:-[A-Za-z]{2})?/)?(track|album|playlist|artist|episode|show)/(\w+)",
    )
    .expect("Failed to compile Spotify desktop link regex")
});

static YOUTUBE_VIDEO_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https://(?:(?:www\.|m\.|music\.)?youtube\.com/(?:watch\?(?:[^#]*&)?v=|shorts/)|youtu\.be/)([A-Za-z0-9_-]{11})(?:[&?#/].*)?$",
    )
    .expect("Failed to compile YouTube video regex")
});

static YOUTUBE_PLAYLIST_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https://(?:www\.|m\.|music\.)?youtube\.com/playlist\?(?:[^#]*&)?list=([A-Za-z0-9_-]+)",
    )
    .expect("Failed to compile YouTube playlist regex")
});

static APPLE_MUSIC_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https://(?:music|itunes)\.apple\.com/[a-z]{2}/(album|playlist|artist|song)/(?:[^/?#]+/)?([A-Za-z0-9.-]+)(?:[?#].*)?$",
    )
    .expect("Failed to compile Apple Music regex")
});

static DEEZER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https://(?:www\.)?deezer\.com/(?:[a-z]{2}/)?(track|album|playlist|artist|episode|show)/(\d+)(?:[?#].*)?$",
    )
    .expect("Failed to compile Deezer regex")
});

static SOUNDCLOUD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://(?:www\.|m\.)?soundcloud\.com/([\w-]+/(?:sets/)?[\w-]+)(?:[?#].*)?$")
        .expect("Failed to compile SoundCloud regex")
});

static TIDAL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https://(?:listen\.|www\.)?tidal\.com/(?:browse/)?(track|album|playlist|artist)/([A-Za-z0-9-]+)(?:[?#].*)?$",
    )
    .expect("Failed to compile Tidal regex")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Provider {
    Spotify,
    YouTube,
    AppleMusic,
    Deezer,
    SoundCloud,
    Tidal,
}

impl Provider {
    /// Default adapter set, in result order.
    pub const ALL: [Provider; 6] = [
        Provider::Spotify,
        Provider::YouTube,
        Provider::AppleMusic,
        Provider::Deezer,
        Provider::SoundCloud,
        Provider::Tidal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Spotify => "spotify",
            Provider::YouTube => "youTube",
            Provider::AppleMusic => "appleMusic",
            Provider::Deezer => "deezer",
            Provider::SoundCloud => "soundCloud",
            Provider::Tidal => "tidal",
        }
    }
}

impl Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    /// Case-insensitive, ignores `-`, `_` and spaces ("apple-music", "YouTube").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();

        Provider::ALL
            .into_iter()
            .find(|provider| provider.as_str().to_lowercase() == wanted)
            .ok_or_else(|| format!("unknown provider '{s}'"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "music.song")]
    Song,
    #[serde(rename = "music.album")]
    Album,
    #[serde(rename = "music.playlist")]
    Playlist,
    #[serde(rename = "profile")]
    Artist,
    #[serde(rename = "music.episode")]
    Podcast,
    #[serde(rename = "website")]
    Show,
}

impl MediaType {
    /// Map an Open Graph `og:type` value.
    pub fn from_og_type(og_type: &str) -> Option<Self> {
        match og_type.trim() {
            "music.song" | "video.other" | "video" => Some(MediaType::Song),
            "music.album" => Some(MediaType::Album),
            "music.playlist" => Some(MediaType::Playlist),
            "profile" | "music.musician" => Some(MediaType::Artist),
            "music.episode" | "video.episode" => Some(MediaType::Podcast),
            "website" | "music.radio_station" => Some(MediaType::Show),
            _ => None,
        }
    }

    fn from_path_segment(segment: &str) -> Option<Self> {
        match segment {
            "track" | "song" | "video" => Some(MediaType::Song),
            "album" => Some(MediaType::Album),
            "playlist" | "sets" => Some(MediaType::Playlist),
            "artist" => Some(MediaType::Artist),
            "episode" => Some(MediaType::Podcast),
            "show" => Some(MediaType::Show),
            _ => None,
        }
    }

    /// Path segment Spotify uses for this media type.
    pub fn spotify_segment(&self) -> &'static str {
        match self {
            MediaType::Song => "track",
            MediaType::Album => "album",
            MediaType::Playlist => "playlist",
            MediaType::Artist => "artist",
            MediaType::Podcast => "episode",
            MediaType::Show => "show",
        }
    }
}

/// A recognized link, reduced to the provider's own identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalLink {
    pub provider: Provider,
    pub media_type: MediaType,
    pub id: String,
    pub source_url: String,
}

impl CanonicalLink {
    fn spotify(media_type: MediaType, id: &str) -> Self {
        Self {
            provider: Provider::Spotify,
            media_type,
            id: id.to_string(),
            source_url: format!("https://open.spotify.com/{}/{id}", media_type.spotify_segment()),
        }
    }
}

/// Match a cleaned link against the canonical patterns of every provider.
/// Pure: never touches the network.
pub fn match_canonical(url: &str) -> Option<CanonicalLink> {
    if let Some(caps) = SPOTIFY_LINK_REGEX.captures(url) {
        let media_type = MediaType::from_path_segment(&caps[1])?;
        return Some(CanonicalLink::spotify(media_type, &caps[2]));
    }

    if let Some(caps) = YOUTUBE_VIDEO_REGEX.captures(url) {
        let id = caps[1].to_string();
        return Some(CanonicalLink {
            provider: Provider::YouTube,
            media_type: MediaType::Song,
            source_url: format!("https://www.youtube.com/watch?v={id}"),
            id,
        });
    }

    if let Some(caps) = YOUTUBE_PLAYLIST_REGEX.captures(url) {
        let id = caps[1].to_string();
        return Some(CanonicalLink {
            provider: Provider::YouTube,
            media_type: MediaType::Playlist,
            source_url: format!("https://www.youtube.com/playlist?list={id}"),
            id,
        });
    }

    if let Some(caps) = APPLE_MUSIC_REGEX.captures(url) {
        return Some(CanonicalLink {
            provider: Provider::AppleMusic,
            media_type: MediaType::from_path_segment(&caps[1])?,
            id: caps[2].to_string(),
            source_url: url.to_string(),
        });
    }

    if let Some(caps) = DEEZER_REGEX.captures(url) {
        let media_type = MediaType::from_path_segment(&caps[1])?;
        let id = caps[2].to_string();
        return Some(CanonicalLink {
            provider: Provider::Deezer,
            media_type,
            source_url: format!("https://www.deezer.com/{}/{id}", &caps[1]),
            id,
        });
    }

    if let Some(caps) = TIDAL_REGEX.captures(url) {
        let media_type = MediaType::from_path_segment(&caps[1])?;
        let id = caps[2].to_string();
        return Some(CanonicalLink {
            provider: Provider::Tidal,
            media_type,
            source_url: format!("https://tidal.com/browse/{}/{id}", &caps[1]),
            id,
        });
    }

    if let Some(caps) = SOUNDCLOUD_REGEX.captures(url) {
        let id = caps[1].to_string();
        let media_type = if id.contains("/sets/") {
            MediaType::Playlist
        } else {
            MediaType::Song
        };
        return Some(CanonicalLink {
            provider: Provider::SoundCloud,
            media_type,
            source_url: format!("https://soundcloud.com/{id}"),
            id,
        });
    }

    None
}

/// Turns inbound strings into [`CanonicalLink`]s.
///
/// Short mobile links (`spotify.link/...`) are expanded with a single HEAD
/// request; the redirect itself is never cached.
pub struct LinkParser {
    http: Arc<dyn HttpClient>,
}

impl LinkParser {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    pub fn parse(&self, input: &str) -> Result<CanonicalLink, ResolveError> {
        if input.trim().is_empty() {
            return Err(ResolveError::invalid_link(input));
        }

        let url = clean_link(input);

        if let Some(link) = match_canonical(&url) {
            return Ok(link);
        }

        if SPOTIFY_LINK_MOBILE_REGEX.is_match(&url) {
            return self.expand_short_link(&url);
        }

        log::debug!("no provider pattern matches {url}");
        Err(ResolveError::invalid_link(input.trim()))
    }

    fn expand_short_link(&self, url: &str) -> Result<CanonicalLink, ResolveError> {
        let location = match self.http.head_location(url) {
            Ok(Some(location)) => location,
            Ok(None) => {
                log::warn!("{url}: short link did not redirect");
                return Err(ResolveError::invalid_link(url));
            }
            Err(err) => {
                log::warn!("{url}: short link lookup failed: {err}");
                return Err(ResolveError::invalid_link(url));
            }
        };

        log::debug!("{url}: expanded to {location}");

        SPOTIFY_LINK_DESKTOP_REGEX
            .captures(&location)
            .and_then(|caps| {
                MediaType::from_path_segment(&caps[1])
                    .map(|media_type| CanonicalLink::spotify(media_type, &caps[2]))
            })
            .ok_or_else(|| ResolveError::invalid_link(url))
    }
}
