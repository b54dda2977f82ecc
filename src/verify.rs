use std::collections::HashSet;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Candidates must cover more than this share of the significant query tokens.
const MIN_TOKEN_COVERAGE: f64 = 0.5;

/// Filler words that say nothing about which item a title names. "playlist"
/// is the suffix the query builder adds to playlist titles.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "by", "feat", "featuring", "ft", "in", "is", "of", "on", "playlist", "the",
    "this", "to", "with",
];

/// Lowercase, strip diacritics, and turn everything that is not a letter or
/// a digit into a single space.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Distinct tokens of already normalized text, stopwords left out. Text made
/// only of stopwords keeps all of its tokens.
fn significant_tokens(normalized: &str) -> HashSet<&str> {
    let all: HashSet<&str> = normalized.split_whitespace().collect();
    let significant: HashSet<&str> = all
        .iter()
        .copied()
        .filter(|token| !STOPWORDS.contains(token))
        .collect();

    if significant.is_empty() {
        all
    } else {
        significant
    }
}

/// Whether a provider's top result plausibly names the same item as `query`.
///
/// The candidate is accepted when it contains more than half of the
/// significant query tokens after normalization. An empty candidate never
/// matches.
pub fn matches(candidate: &str, query: &str) -> bool {
    let candidate = normalize(candidate);
    if candidate.is_empty() {
        return false;
    }

    let query = normalize(query);
    let wanted = significant_tokens(&query);
    if wanted.is_empty() {
        return candidate == query;
    }

    let found: HashSet<&str> = candidate.split(' ').collect();
    let hits = wanted.iter().filter(|token| found.contains(*token)).count();

    hits as f64 / wanted.len() as f64 > MIN_TOKEN_COVERAGE
}

/// [`matches`], and the candidate also shares a significant token with the
/// item's own title, so an artist or show name alone never verifies.
pub fn matches_item(candidate: &str, query: &str, title: &str) -> bool {
    if !matches(candidate, query) {
        return false;
    }

    let title = normalize(title);
    let title_tokens = significant_tokens(&title);
    if title_tokens.is_empty() {
        return true;
    }

    let candidate = normalize(candidate);
    candidate
        .split(' ')
        .any(|token| title_tokens.contains(token))
}
