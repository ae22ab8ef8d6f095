//! Substring matching over a loaded shard.

use super::index::{IndexEntry, Shard};
use super::scoring::MatchKind;

/// Entries of `shard` whose key contains `query`.
///
/// `query` must already be normalized. Entries whose key starts with the query
/// come first; otherwise build order is kept.
pub fn match_shard<'a>(shard: &'a Shard, query: &str) -> Vec<&'a IndexEntry> {
    if query.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<(MatchKind, &IndexEntry)> = shard
        .entries()
        .iter()
        .filter_map(|entry| MatchKind::classify(&entry.key, query).map(|kind| (kind, entry)))
        .collect();

    // Stable, so build order survives within each kind.
    matches.sort_by_key(|(kind, _)| *kind);

    tracing::trace!(
        "Shard {}: {} of {} entries match '{}'",
        shard.id(),
        matches.len(),
        shard.len(),
        query
    );

    matches.into_iter().map(|(_, entry)| entry).collect()
}
