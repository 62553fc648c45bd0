//! District name search.
//!
//! Plain substring filtering over the loaded records. There is no ranking:
//! suggestions are the first matches in dataset order.

use crate::domain::DistrictRecord;

/// Queries shorter than this (after trimming) produce no suggestions.
pub const MIN_QUERY_CHARS: usize = 2;
/// Upper bound on the suggestion list.
pub const MAX_SUGGESTIONS: usize = 10;

/// Lowercase and trim a raw query.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Return up to `MAX_SUGGESTIONS` records whose name contains `query`
/// (case-insensitive), in dataset order.
pub fn search<'a>(records: &'a [DistrictRecord], query: &str) -> Vec<&'a DistrictRecord> {
    search_indices(records, query)
        .into_iter()
        .map(|i| &records[i])
        .collect()
}

/// Same as [`search`], returning positions in `records`.
pub fn search_indices(records: &[DistrictRecord], query: &str) -> Vec<usize> {
    let needle = normalize_query(query);
    if needle.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }

    records
        .iter()
        .enumerate()
        .filter(|(_, r)| {
            r.name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .map(|(i, _)| i)
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Resolve a district for non-interactive use: an exact (case-insensitive)
/// name match wins, else the first search match.
pub fn find_district<'a>(records: &'a [DistrictRecord], name: &str) -> Option<&'a DistrictRecord> {
    let needle = normalize_query(name);
    records
        .iter()
        .find(|r| r.name.as_deref().is_some_and(|n| n.to_lowercase() == needle))
        .or_else(|| search(records, name).into_iter().next())
}
