//! Filter-and-rank over arbitrary items.

use std::cmp::Ordering;

use crate::score::{is_subsequence, score};

/// Return the items whose text contains `query` as a subsequence, best first.
///
/// Ties keep their input order. An empty query or item slice yields nothing.
pub fn search<'a, T, F>(query: &str, items: &'a [T], extract_text: F) -> Vec<&'a T>
where
    F: Fn(&T) -> String,
{
    if query.is_empty() || items.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<(f64, &'a T)> = items
        .iter()
        .filter_map(|item| {
            let text = extract_text(item);
            is_subsequence(query, &text).then(|| (score(query, &text), item))
        })
        .collect();

    // sort_by is stable, which keeps equal scores in input order
    ranked.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    ranked.into_iter().map(|(_, item)| item).collect()
}
