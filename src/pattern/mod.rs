//! Wildcard URL pattern matching.
//!
//! Patterns are plain strings where `*` matches any sequence of characters,
//! including the empty one. Every other character matches literally and
//! case-insensitively. Matches are anchored at both ends: a pattern without
//! any `*` must equal the URL exactly, and partial matches never count.
//!
//! A trailing `/*` additionally matches the bare URL with no path segment,
//! so `https://a.com/*` covers both `https://a.com` and `https://a.com/x`.

use regex::Regex;

/// Check whether `url` matches the wildcard `pattern`.
pub fn matches(url: &str, pattern: &str) -> bool {
    let body = if let Some(prefix) = pattern.strip_suffix("/*") {
        format!("{}(/.*)?", wildcard_to_regex(prefix))
    } else {
        wildcard_to_regex(pattern)
    };
    let anchored = format!("(?i)^{}$", body);
    Regex::new(&anchored)
        .map(|re| re.is_match(url))
        .unwrap_or(false)
}

/// Escape all regex metacharacters except `*`, which becomes `.*`.
fn wildcard_to_regex(pattern: &str) -> String {
    pattern
        .split('*')
        .map(|part| regex::escape(part))
        .collect::<Vec<_>>()
        .join(".*")
}
