//! The suggestion index: immutable, prefix-queryable, built per reload cycle.
//!
//! An index is constructed from exactly one [`RawDataset`] and never mutates
//! afterwards; all state is reachable only through read-only queries, so a
//! single instance is safe to share across any number of concurrent readers
//! without locking.
//!
//! # Matching and ranking
//!
//! Keys are normalized (trimmed, Unicode-lowercased) at build time and
//! queries are normalized the same way, giving case-insensitive prefix
//! matching. Matches are ranked by ascending key length, then
//! lexicographically by normalized key, so identical input and dataset
//! always produce identical output.
//!
//! # Duplicate keys
//!
//! Two entries with the same normalized key resolve **last-write-wins**:
//! the entry appearing later in the dataset replaces the earlier one.

use crate::models::{BuildStats, Entry, RawDataset};
use std::collections::BTreeMap;

/// Normalizes a key or query for matching.
///
/// Trims leading/trailing whitespace and Unicode-lowercases the rest.
/// Idempotent: normalizing twice yields the same string.
#[must_use]
pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

/// One indexed entry: the normalized key alongside the original entry.
#[derive(Debug, Clone)]
struct IndexedEntry {
    normalized: String,
    entry: Entry,
}

/// An immutable, queryable suggestion index.
///
/// Entries are held sorted by normalized key, which makes every prefix
/// query a binary search for the start of a contiguous match range.
#[derive(Debug, Default)]
pub struct SuggestionIndex {
    entries: Vec<IndexedEntry>,
}

impl SuggestionIndex {
    /// Builds an index from a raw dataset.
    ///
    /// Deterministic: the same dataset always produces an index with
    /// identical query behavior. Entries with a missing, empty, or
    /// whitespace-only key are dropped and counted; duplicate normalized
    /// keys resolve last-write-wins. An empty dataset builds an index
    /// that answers every query with an empty result.
    #[must_use]
    pub fn build(dataset: RawDataset) -> (Self, BuildStats) {
        let mut stats = BuildStats::default();
        let mut by_key: BTreeMap<String, Entry> = BTreeMap::new();

        for raw in dataset.entries {
            let Some(key) = raw.key else {
                stats.dropped += 1;
                continue;
            };
            let normalized = normalize(&key);
            if normalized.is_empty() {
                stats.dropped += 1;
                continue;
            }
            let entry = Entry {
                key,
                payload: raw.payload,
            };
            if by_key.insert(normalized, entry).is_some() {
                stats.replaced += 1;
            }
        }

        // BTreeMap iteration order is the sorted order the queries rely on.
        let entries: Vec<IndexedEntry> = by_key
            .into_iter()
            .map(|(normalized, entry)| IndexedEntry { normalized, entry })
            .collect();
        stats.indexed = entries.len();

        (Self { entries }, stats)
    }

    /// Builds an index over no entries.
    ///
    /// Used as the boot snapshot before the first successful load.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Answers a prefix suggestion query.
    ///
    /// Returns at most `limit` entries whose normalized key starts with the
    /// normalized `input`, ranked by ascending key length then
    /// lexicographically. An empty (or whitespace-only) input yields an
    /// empty result, as does an input nothing matches.
    #[must_use]
    pub fn suggest(&self, input: &str, limit: usize) -> Vec<&Entry> {
        let prefix = normalize(input);
        if prefix.is_empty() || limit == 0 {
            return Vec::new();
        }

        let start = self
            .entries
            .partition_point(|e| e.normalized.as_str() < prefix.as_str());
        let mut matches: Vec<&IndexedEntry> = self.entries[start..]
            .iter()
            .take_while(|e| e.normalized.starts_with(&prefix))
            .collect();

        matches.sort_unstable_by(|a, b| {
            let len_a = a.normalized.chars().count();
            let len_b = b.normalized.chars().count();
            len_a
                .cmp(&len_b)
                .then_with(|| a.normalized.cmp(&b.normalized))
        });
        matches.truncate(limit);
        matches.into_iter().map(|e| &e.entry).collect()
    }

    /// Returns the number of indexed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
