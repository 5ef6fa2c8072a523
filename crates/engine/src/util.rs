/// Canonical form for all free-text matching: lowercase, trimmed, internal
/// whitespace collapsed to single spaces. Punctuation is kept so patterns
/// like "apple.com/bill" stay meaningful.
pub fn normalize(s: &str) -> String {
    s.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `n` whitespace tokens of the normalized text. Used to cluster
/// descriptions that differ only in a trailing reference number.
pub fn token_prefix(s: &str, n: usize) -> String {
    normalize(s)
        .split(' ')
        .take(n.max(1))
        .collect::<Vec<_>>()
        .join(" ")
}
