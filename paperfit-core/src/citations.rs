//! Citation mining from extracted paper text.
//!
//! A citation token is either a bracketed reference number (`[12]`) or a
//! parenthesized span that mentions a four-digit year (`(Jones, 2019)`).
//! Tokens that are nothing but a year or a year range are dropped, since
//! those are almost always incidental dates rather than references.

use std::sync::LazyLock;

use regex::Regex;

static CITATION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\d+\]|\(.*?\d{4}.*?\)").expect("citation pattern is valid")
});

static BARE_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\(\[]?\d{4}(?:[–-]\d{2,4})?[\)\]]?$").expect("bare year pattern is valid")
});

/// Every citation-like token in `text`, in document order, unfiltered.
pub fn find_citation_tokens(text: &str) -> Vec<&str> {
    CITATION_TOKEN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Whether `token` is just a year such as `(2020)`, `[2020]` or `(2019–20)`.
pub fn is_bare_year(token: &str) -> bool {
    BARE_YEAR.is_match(token)
}

/// Extract up to `limit` citations from `text`.
///
/// Duplicates are kept; order is order of appearance.
pub fn extract_citations(text: &str, limit: usize) -> Vec<String> {
    find_citation_tokens(text)
        .into_iter()
        .filter(|token| !is_bare_year(token))
        .take(limit)
        .map(str::to_string)
        .collect()
}
