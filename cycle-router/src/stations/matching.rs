//! Station name matching.

use strsim::{jaro_winkler, normalized_levenshtein};

/// Minimum blended similarity for a name to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.6;

/// Maximum number of suggestions offered.
const MAX_SUGGESTIONS: usize = 3;

/// Reduce a name to a comparable search key.
///
/// Lowercases, drops punctuation and collapses runs of whitespace, so
/// `"King's Cross  Station"` and `"kings cross station"` compare equal.
///
/// # Examples
///
/// ```
/// use cycle_router::stations::normalize_name;
///
/// assert_eq!(normalize_name("  St. James's  Park "), "st jamess park");
/// ```
pub fn normalize_name(name: &str) -> String {
    let stripped: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Similarity of two search keys in `[0, 1]`.
fn similarity(a: &str, b: &str) -> f64 {
    0.7 * jaro_winkler(a, b) + 0.3 * normalized_levenshtein(a, b)
}

/// Names most similar to `query`, best first.
///
/// `candidates` yields `(search_key, display_name)` pairs. Names below the
/// similarity threshold are dropped; duplicates are reported once.
pub fn suggest<'a>(
    query: &str,
    candidates: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Vec<String> {
    let key = normalize_name(query);
    if key.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(f64, &str)> = candidates
        .into_iter()
        .map(|(candidate, name)| (similarity(&key, candidate), name))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));

    let mut names: Vec<String> = Vec::with_capacity(MAX_SUGGESTIONS);
    for (_, name) in scored {
        if names.len() == MAX_SUGGESTIONS {
            break;
        }
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
