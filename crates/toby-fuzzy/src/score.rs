//! Subsequence test and positional scorer.

/// Score for a text that starts with the query.
pub const PREFIX_SCORE: f64 = 0.0;

/// Score for a text that contains the query contiguously.
pub const SUBSTRING_SCORE: f64 = 1.0;

/// Score for a text that does not match at all.
pub const NO_MATCH: f64 = f64::INFINITY;

/// True iff every character of `needle`, in order, appears in `haystack`.
///
/// Case-insensitive. An empty needle or haystack never matches.
pub fn is_subsequence(needle: &str, haystack: &str) -> bool {
    if needle.is_empty() || haystack.is_empty() {
        return false;
    }

    let needle = needle.to_lowercase();
    let haystack = haystack.to_lowercase();
    let mut pending = needle.chars().peekable();

    for c in haystack.chars() {
        match pending.peek() {
            Some(&next) if next == c => {
                pending.next();
            }
            Some(_) => {}
            None => break,
        }
    }

    pending.peek().is_none()
}

/// Rank how closely `needle` matches `haystack`. Lower is better.
///
/// Returns [`NO_MATCH`] when the needle is not a subsequence of the haystack.
pub fn score(needle: &str, haystack: &str) -> f64 {
    if needle.is_empty() || haystack.is_empty() {
        return NO_MATCH;
    }

    let needle = needle.to_lowercase();
    let haystack = haystack.to_lowercase();

    if haystack.starts_with(&needle) {
        return PREFIX_SCORE;
    }
    if haystack.contains(&needle) {
        return SUBSTRING_SCORE;
    }

    let hay: Vec<char> = haystack.chars().collect();
    let mut total = 0usize;
    let mut last: Option<usize> = None;

    for c in needle.chars() {
        let start = last.map_or(0, |l| l + 1);
        let Some(offset) = hay.get(start..).and_then(|rest| rest.iter().position(|&h| h == c))
        else {
            return NO_MATCH;
        };
        let index = start + offset;

        // characters skipped since the previous match
        total += index - start;
        if last.is_none() {
            total += index * 2;
        }
        last = Some(index);
    }

    total as f64
}
