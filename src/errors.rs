use crate::link::Provider;

#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    #[error("invalid link: {0}")]
    InvalidLink(String),

    #[error("source provider not supported yet: {0}")]
    UnsupportedSource(Provider),

    #[error("failed to fetch metadata for {url}: {reason}")]
    MetadataFetch { url: String, reason: String },

    #[error("search result not found")]
    NotFound,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ResolveError {
    pub fn invalid_link(input: impl Into<String>) -> Self {
        Self::InvalidLink(input.into())
    }

    pub fn metadata_fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::MetadataFetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
