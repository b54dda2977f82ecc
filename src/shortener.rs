use crate::http::HttpClient;
use anyhow::Context;
use serde::Deserialize;
use std::sync::Arc;

pub trait Shortener: Send + Sync {
    fn shorten(&self, url: &str) -> anyhow::Result<String>;
}

/// Used when no shortener is configured.
pub struct NoopShortener;

impl Shortener for NoopShortener {
    fn shorten(&self, url: &str) -> anyhow::Result<String> {
        Ok(url.to_string())
    }
}

#[derive(Deserialize)]
struct ShortenResponse {
    data: ShortenData,
}

#[derive(Deserialize)]
struct ShortenData {
    refer: String,
}

/// Link shortening service: `POST {api_url}` with `{"url": ...}` and an
/// `x-api-key` header, answering `{"data": {"refer": <short url>}}`.
pub struct HttpShortener {
    http: Arc<dyn HttpClient>,
    api_url: String,
    api_key: String,
}

impl HttpShortener {
    pub fn new(http: Arc<dyn HttpClient>, api_url: String, api_key: String) -> Self {
        Self {
            http,
            api_url,
            api_key,
        }
    }
}

impl Shortener for HttpShortener {
    fn shorten(&self, url: &str) -> anyhow::Result<String> {
        let body = serde_json::json!({ "url": url });
        let raw = self
            .http
            .post_json(&self.api_url, &body, &[("x-api-key", self.api_key.as_str())])?;

        let response: ShortenResponse =
            serde_json::from_str(&raw).context("unexpected shortener response")?;

        Ok(response.data.refer)
    }
}

/// The short form of `url`, or `url` itself when shortening fails.
pub fn shorten_or_keep(shortener: &dyn Shortener, url: &str) -> String {
    match shortener.shorten(url) {
        Ok(short) => short,
        Err(err) => {
            log::warn!("shortener url={url} outcome=error err={err:#}");
            url.to_string()
        }
    }
}
