use url::Url;

/// Query parameters that only carry share/tracking state.
const TRACKING_PARAMS: [&str; 13] = [
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "ref",
    "si",
    "nd",
    "context",
    "feature",
    "pp",
];

/// Clean a pasted music link before it is matched against provider patterns.
///
/// - trims surrounding whitespace
/// - adds a missing scheme and upgrades `http` to `https`
/// - strips share/tracking query parameters (utm_*, si, fbclid, ...)
/// - drops the fragment and trailing slashes (keeps root `/`)
///
/// Returns the trimmed input if it cannot be parsed as a URL.
pub fn clean_link(input: &str) -> String {
    let input = input.trim();

    let to_parse = if input.starts_with("//") {
        format!("https:{input}")
    } else if !input.contains("://") {
        format!("https://{input}")
    } else {
        input.to_string()
    };

    let mut parsed = match Url::parse(&to_parse) {
        Ok(u) if u.host_str().is_some() => u,
        _ => return input.to_string(),
    };

    if parsed.scheme() == "http" && parsed.set_scheme("https").is_err() {
        return input.to_string();
    }

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(kept);
    }

    parsed.set_fragment(None);

    let path = parsed.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(path.trim_end_matches('/'));
    }

    parsed.to_string()
}
