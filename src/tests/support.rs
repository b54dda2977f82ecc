use crate::cache::{CacheStore, MemoryCache};
use crate::http::{HttpClient, HttpError};
use crate::resolver::{Resolver, ResolverOptions};
use crate::shortener::{NoopShortener, Shortener};
use crate::stats::SearchCounter;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const APP_URL: &str = "https://tunelink.test";
pub const YOUTUBE_API_KEY: &str = "test-key";

enum Reply {
    Text(String),
    Status(u16),
}

/// [`HttpClient`] answering from exact-url routes. Unknown GET and POST urls
/// are a 404, unknown HEAD urls do not redirect. Every request is counted.
#[derive(Default)]
pub struct FakeHttp {
    get: Mutex<HashMap<String, Reply>>,
    post: Mutex<HashMap<String, String>>,
    redirects: Mutex<HashMap<String, String>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self, url: &str, body: impl Into<String>) {
        self.get
            .lock()
            .unwrap()
            .insert(url.to_string(), Reply::Text(body.into()));
    }

    pub fn status(&self, url: &str, status: u16) {
        self.get
            .lock()
            .unwrap()
            .insert(url.to_string(), Reply::Status(status));
    }

    pub fn redirect(&self, from: &str, to: &str) {
        self.redirects
            .lock()
            .unwrap()
            .insert(from.to_string(), to.to_string());
    }

    pub fn post(&self, url: &str, body: impl Into<String>) {
        self.post.lock().unwrap().insert(url.to_string(), body.into());
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    fn count(&self, url: &str) {
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;
    }

    fn not_found(url: &str) -> HttpError {
        HttpError::Status {
            url: url.to_string(),
            status: 404,
        }
    }
}

impl HttpClient for FakeHttp {
    fn get_text(&self, url: &str) -> Result<String, HttpError> {
        self.count(url);

        match self.get.lock().unwrap().get(url) {
            Some(Reply::Text(body)) => Ok(body.clone()),
            Some(Reply::Status(status)) => Err(HttpError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(Self::not_found(url)),
        }
    }

    fn head_location(&self, url: &str) -> Result<Option<String>, HttpError> {
        self.count(url);
        Ok(self.redirects.lock().unwrap().get(url).cloned())
    }

    fn post_json(
        &self,
        url: &str,
        _body: &serde_json::Value,
        _headers: &[(&str, &str)],
    ) -> Result<String, HttpError> {
        self.count(url);

        self.post
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| Self::not_found(url))
    }
}

pub fn resolver(http: Arc<FakeHttp>) -> Resolver {
    resolver_with(http, Arc::new(NoopShortener))
}

pub fn resolver_with(http: Arc<FakeHttp>, shortener: Arc<dyn Shortener>) -> Resolver {
    let hour = Duration::from_secs(60 * 60);
    let cache = CacheStore::new(Arc::new(MemoryCache::new()), hour, hour);

    Resolver::new(
        http,
        cache,
        shortener,
        Arc::new(SearchCounter::new()),
        ResolverOptions {
            app_url: APP_URL.to_string(),
            youtube_api_key: Some(YOUTUBE_API_KEY.to_string()),
        },
    )
}

/// Canned provider pages and API responses.
pub mod fixtures {
    pub const SPOTIFY_SONG_URL: &str = "https://open.spotify.com/track/2KvHC9z14GSl4YpkNMX384";
    pub const SPOTIFY_PODCAST_URL: &str = "https://open.spotify.com/episode/43TCrgmP23qkLcAXZQN8qT";
    pub const SPOTIFY_RICK_URL: &str = "https://open.spotify.com/track/4PTG3Z6ehGkBFwjybzWkR8";
    pub const YOUTUBE_VIDEO_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    pub const PODCAST_DESCRIPTION: &str = "Listen to this episode from Waveform: The MKBHD Podcast on Spotify. So much happened this week! Not only did Twitter get renamed but Samsung Unpacked happened as well.";

    fn og_page(title: &str, description: &str, og_type: &str, image: &str, audio: Option<&str>) -> String {
        let audio = audio
            .map(|audio| format!(r#"<meta property="og:audio" content="{audio}"/>"#))
            .unwrap_or_default();

        format!(
            r#"<!DOCTYPE html><html><head>
<title>{title} | Spotify</title>
<meta property="og:site_name" content="Spotify"/>
<meta property="og:title" content="{title}"/>
<meta property="og:description" content="{description}"/>
<meta property="og:type" content="{og_type}"/>
<meta property="og:image" content="{image}"/>
{audio}
</head><body><div id="main"></div></body></html>"#
        )
    }

    pub fn spotify_song_page() -> String {
        og_page(
            "Do Not Disturb",
            "Drake · Song · 2017",
            "music.song",
            "https://i.scdn.co/image/ab67616d0000b2734f0fd9dad63977146e685700",
            Some("https://p.scdn.co/mp3-preview/df989a31c8233f46b6a997c59025f9c8021784aa"),
        )
    }

    pub fn spotify_podcast_page() -> String {
        og_page(
            "The End of Twitter as We Know It",
            PODCAST_DESCRIPTION,
            "music.episode",
            "https://i.scdn.co/image/ab6765630000ba8aa05ac56dbc44378f45ef693a",
            Some("https://podz-content.spotifycdn.com/audio/clips/0Dijh26Vc2UoFrsXfkACQ8/clip_2900584_2965529.mp3"),
        )
    }

    pub fn spotify_rick_page() -> String {
        og_page(
            "Never Gonna Give You Up",
            "Rick Astley · Song · 1987",
            "music.song",
            "https://i.scdn.co/image/ab67616d0000b27315ebbedaacef61af244262a8",
            None,
        )
    }

    pub fn youtube_video_page() -> String {
        r#"<!DOCTYPE html><html><head>
<title>Rick Astley - Never Gonna Give You Up (Official Music Video) - YouTube</title>
<link rel="canonical" href="https://www.youtube.com/watch?v=dQw4w9WgXcQ">
</head><body>
<meta property="og:site_name" content="YouTube">
<meta property="og:title" content="Never Gonna Give You Up">
<meta property="og:type" content="video.other">
<meta property="og:image" content="https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg">
<meta property="og:description" content="The official video for “Never Gonna Give You Up” by Rick Astley.">
</body></html>"#
            .to_string()
    }

    pub fn apple_music_search_page() -> String {
        r#"<!DOCTYPE html><html><head><title>Search - Apple Music</title></head><body>
<div aria-label="Top Results">
  <a href="https://music.apple.com/us/artist/drake/271256">Drake</a>
</div>
<div aria-label="Songs">
  <ul>
    <li><a href="https://music.apple.com/us/album/do-not-disturb/1440890708?i=1440892237">Do Not Disturb</a></li>
    <li><a href="https://music.apple.com/us/album/hotline-bling/1440841363?i=1440841730">Hotline Bling</a></li>
  </ul>
</div>
<div aria-label="Albums">
  <a href="https://music.apple.com/us/album/more-life/1440890708">More Life</a>
</div>
</body></html>"#
            .to_string()
    }

    pub fn deezer_song_response() -> String {
        r#"{"data":[{"id":144572248,"readable":true,"title":"Do Not Disturb","title_short":"Do Not Disturb","link":"https://www.deezer.com/track/144572248","duration":283,"artist":{"id":246791,"name":"Drake"},"type":"track"}],"total":1,"next":"https://api.deezer.com/search/track?q=Do%20Not%20Disturb%20Drake&limit=1&index=1"}"#
            .to_string()
    }

    pub fn youtube_podcast_response() -> String {
        r#"{
  "kind": "youtube#searchListResponse",
  "regionCode": "US",
  "pageInfo": {"totalResults": 1000000, "resultsPerPage": 1},
  "items": [
    {
      "kind": "youtube#searchResult",
      "id": {"kind": "youtube#video", "videoId": "0atwuUWhKWs"},
      "snippet": {
        "channelId": "UCEcrRXW3oEYfUctetZTAWLw",
        "title": "The End of Twitter as We Know It | Waveform Podcast",
        "channelTitle": "Waveform Podcast"
      }
    }
  ]
}"#
        .to_string()
    }

    pub fn ddg_spotify_results() -> String {
        r#"<html><body><table>
<tr><td><a rel="nofollow" href="https://www.youtube.com/watch?v=dQw4w9WgXcQ" class='result-link'>Rick Astley - Never Gonna Give You Up - YouTube</a></td></tr>
<tr><td class='result-snippet'>The official video</td></tr>
<tr><td><a rel="nofollow" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fopen.spotify.com%2Fartist%2F0gxyHStUsqpMadRV0Di1Qt&amp;rut=abc" class='result-link'>Rick Astley | Spotify</a></td></tr>
<tr><td><a rel="nofollow" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fopen.spotify.com%2Ftrack%2F4PTG3Z6ehGkBFwjybzWkR8%3Fsi%3Dxyz&amp;rut=def" class='result-link'>Never Gonna Give You Up - song and lyrics by Rick Astley | Spotify</a></td></tr>
</table></body></html>"#
            .to_string()
    }
}
