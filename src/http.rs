use reqwest::{header, StatusCode};
use serde::{Deserialize, Serialize};
use std::{error::Error, thread::sleep, time::Duration};

const USER_AGENT_DEFAULT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:124.0) Gecko/20100101 Firefox/124.0";

#[derive(thiserror::Error, Debug)]
pub enum HttpError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("{url}: unexpected status {status}")]
    Status { url: String, status: u16 },

    #[error("{url}: {message}")]
    Transport { url: String, message: String },
}

/// Outbound HTTP used by the parser, metadata fetchers, adapters and the shortener.
pub trait HttpClient: Send + Sync {
    /// GET a url and return the body as text. Non-2xx responses are errors.
    fn get_text(&self, url: &str) -> Result<String, HttpError>;

    /// Issue a HEAD request without following redirects and return the
    /// absolute `Location` target, if the response was a redirect.
    fn head_location(&self, url: &str) -> Result<Option<String>, HttpError>;

    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        headers: &[(&str, &str)],
    ) -> Result<String, HttpError>;
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpOptions {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_retries() -> u32 {
    3
}

fn default_user_agent() -> String {
    USER_AGENT_DEFAULT.to_string()
}

fn get_error(error: &reqwest::Error) -> String {
    match error.source() {
        Some(e) => match e.source() {
            Some(e) => e.to_string(),
            None => e.to_string(),
        },
        None => error.to_string(),
    }
}

/// Blocking reqwest client with retries.
///
/// Transport errors, 429 and 5xx are retried (switching to `OPT_PROXY` when
/// set), 4xx is returned right away.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
    proxied: Option<reqwest::blocking::Client>,
    no_redirect: reqwest::blocking::Client,
    retries: u32,
}

impl ReqwestClient {
    pub fn new(opts: &HttpOptions) -> anyhow::Result<Self> {
        let builder = || {
            reqwest::blocking::Client::builder()
                .user_agent(opts.user_agent.as_str())
                .timeout(Duration::from_secs(opts.timeout_secs))
                .pool_idle_timeout(Duration::from_secs(10))
        };

        let opt_proxy = std::env::var("OPT_PROXY").unwrap_or_default();
        let proxied = if opt_proxy.is_empty() {
            None
        } else {
            log::debug!("retries will use proxy {opt_proxy:#?}");
            Some(builder().proxy(reqwest::Proxy::all(opt_proxy.as_str())?).build()?)
        };

        Ok(Self {
            client: builder().build()?,
            proxied,
            no_redirect: builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()?,
            retries: opts.retries.max(1),
        })
    }

    fn client_for(&self, force_proxy: bool) -> &reqwest::blocking::Client {
        match (&self.proxied, force_proxy) {
            (Some(proxied), true) => proxied,
            _ => &self.client,
        }
    }
}

fn iden(url: &reqwest::Url) -> String {
    format!("{}{}", url.host_str().unwrap_or_default(), url.path())
}

impl HttpClient for ReqwestClient {
    fn get_text(&self, url: &str) -> Result<String, HttpError> {
        let url_parsed =
            reqwest::Url::parse(url).map_err(|_| HttpError::InvalidUrl(url.to_string()))?;
        let iden = iden(&url_parsed);

        let mut force_proxy = false;
        let mut last_error = None;

        for r in 0..self.retries {
            if r > 0 {
                log::debug!("{iden}: retrying");
            }

            let resp = match self.client_for(force_proxy).get(url_parsed.clone()).send() {
                Ok(resp) => resp,
                Err(err) => {
                    log::warn!("{iden}: {err}: {:#?}", get_error(&err));
                    force_proxy = true;
                    last_error = Some(HttpError::Transport {
                        url: url.to_string(),
                        message: get_error(&err),
                    });
                    continue;
                }
            };

            let status = resp.status();

            if status.is_success() {
                return resp.text().map_err(|err| HttpError::Transport {
                    url: url.to_string(),
                    message: get_error(&err),
                });
            }

            log::debug!("{iden}: {}", status);

            let error = HttpError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            };

            if status == StatusCode::TOO_MANY_REQUESTS {
                sleep(Duration::from_secs(u64::from(r + 1) * 2));
            } else if status.is_client_error() {
                // no need to try again, it's over...
                return Err(error);
            }

            last_error = Some(error);
        }

        Err(last_error.unwrap_or_else(|| HttpError::Transport {
            url: url.to_string(),
            message: "no attempts made".to_string(),
        }))
    }

    fn head_location(&self, url: &str) -> Result<Option<String>, HttpError> {
        let url_parsed =
            reqwest::Url::parse(url).map_err(|_| HttpError::InvalidUrl(url.to_string()))?;

        let resp = self
            .no_redirect
            .head(url_parsed.clone())
            .send()
            .map_err(|err| HttpError::Transport {
                url: url.to_string(),
                message: get_error(&err),
            })?;

        if !resp.status().is_redirection() {
            log::debug!("{}: no redirect ({})", iden(&url_parsed), resp.status());
            return Ok(None);
        }

        let location = resp
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| url_parsed.join(value).ok())
            .map(|target| target.to_string());

        Ok(location)
    }

    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        headers: &[(&str, &str)],
    ) -> Result<String, HttpError> {
        let mut request = self.client.post(url).json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let resp = request.send().map_err(|err| HttpError::Transport {
            url: url.to_string(),
            message: get_error(&err),
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(HttpError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().map_err(|err| HttpError::Transport {
            url: url.to_string(),
            message: get_error(&err),
        })
    }
}
