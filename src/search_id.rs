use crate::errors::ResolveError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, ops::Deref};

/// Stable id of a resolved link: the URL-safe base64 of its canonical source
/// URL. The same source always yields the same id, and the id can be turned
/// back into the link once the cached result is gone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct SearchId(String);

impl Display for SearchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for SearchId {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<SearchId> for String {
    fn from(fr: SearchId) -> Self {
        fr.0
    }
}

impl SearchId {
    #[inline]
    pub fn from_source(source_url: &str) -> SearchId {
        SearchId(URL_SAFE_NO_PAD.encode(source_url.as_bytes()))
    }

    /// Validate an id received from outside.
    pub fn parse(raw: &str) -> Result<SearchId, ResolveError> {
        let id = SearchId(raw.trim().to_string());
        id.source_url()?;
        Ok(id)
    }

    pub fn source_url(&self) -> Result<String, ResolveError> {
        URL_SAFE_NO_PAD
            .decode(self.0.as_bytes())
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .filter(|url| url.starts_with("https://"))
            .ok_or_else(|| ResolveError::invalid_link(self.0.clone()))
    }
}
