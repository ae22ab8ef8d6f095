//! Ranking and aggregation of matches across shards.
//!
//! Ordering is purely structural: a key that starts with the query beats one
//! that merely contains it, shorter keys beat longer ones, and anything still
//! tied keeps build order (shard resolution order, then position in shard).
//! Whether an entry is a page heading or a code symbol plays no part.

use super::index::{IndexEntry, Target};
use crate::types::DisplayResult;
use ahash::AHashMap;

/// How a key matched the query. Orders best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchKind {
    /// The key starts with the query.
    Prefix,
    /// The query occurs later in the key.
    Substring,
}

impl MatchKind {
    /// Classify how `key` matches `query`; `None` if it does not contain it.
    pub fn classify(key: &str, query: &str) -> Option<Self> {
        if key.starts_with(query) {
            Some(Self::Prefix)
        } else if key.contains(query) {
            Some(Self::Substring)
        } else {
            None
        }
    }
}

/// Sort key of one result; smaller ranks first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Rank {
    kind: MatchKind,
    key_len: usize,
    shard: usize,
    position: usize,
}

/// Merge per-shard match lists into one ranked result list.
///
/// `per_shard` is in shard resolution order, each list in the matcher's order.
/// Entries sharing a key across shards collapse into one result at the first
/// occurrence: its targets are the first entry's targets unchanged, followed by
/// later entries' targets not already present.
pub fn aggregate(query: &str, per_shard: &[Vec<&IndexEntry>]) -> Vec<DisplayResult> {
    let mut slots: Vec<(Rank, DisplayResult)> = Vec::new();
    let mut by_key: AHashMap<&str, usize> = AHashMap::new();

    for (shard, matches) in per_shard.iter().enumerate() {
        for (position, entry) in matches.iter().enumerate() {
            let Some(kind) = MatchKind::classify(&entry.key, query) else {
                continue;
            };

            if let Some(&slot) = by_key.get(entry.key.as_str()) {
                merge_targets(&mut slots[slot].1.targets, &entry.targets);
                continue;
            }

            let rank = Rank {
                kind,
                key_len: entry.key.chars().count(),
                shard,
                position,
            };
            by_key.insert(entry.key.as_str(), slots.len());
            slots.push((rank, DisplayResult::from_entry(entry)));
        }
    }

    slots.sort_by_key(|(rank, _)| *rank);
    slots.into_iter().map(|(_, result)| result).collect()
}

fn merge_targets(existing: &mut Vec<Target>, incoming: &[Target]) {
    for target in incoming {
        let seen = existing.iter().any(|t| {
            t.anchor_url == target.anchor_url && t.scope_label == target.scope_label
        });
        if !seen {
            existing.push(target.clone());
        }
    }
}
