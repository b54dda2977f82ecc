use crate::adapters::{url_with_query, Adapter, OnMismatch};
use crate::link::Provider;

const SEARCH_URL: &str = "https://listen.tidal.com/search";

/// Search-page link, only offered next to at least one verified link so a
/// result is never made of guesses alone.
pub struct TidalAdapter;

impl Adapter for TidalAdapter {
    fn provider(&self) -> Provider {
        Provider::Tidal
    }

    fn on_mismatch(&self) -> OnMismatch {
        OnMismatch::SearchUrl
    }

    fn requires_verified_peer(&self) -> bool {
        true
    }

    fn search_url(&self, query: &str) -> anyhow::Result<String> {
        url_with_query(SEARCH_URL, &[("q", query)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url() {
        assert_eq!(
            TidalAdapter.search_url("Waveform: The MKBHD Podcast").unwrap(),
            "https://listen.tidal.com/search?q=Waveform%3A+The+MKBHD+Podcast"
        );
        assert!(TidalAdapter.requires_verified_peer());
    }
}
