//! The suggestion service: published snapshots and lock-free reads.
//!
//! The service holds the single published [`Snapshot`] in an
//! [`arc_swap::ArcSwap`]. Readers pay one atomic reference load per query
//! and then run entirely against their own `Arc` of the snapshot; the
//! reload scheduler publishes a replacement with one atomic store. Neither
//! side ever waits for the other, and a retired snapshot is reclaimed by
//! the `Arc` refcount once its last in-flight reader finishes.

mod reload;

pub use reload::{CycleOutcome, ReloadConfig, ReloadScheduler, ReloadState};

use crate::index::SuggestionIndex;
use crate::models::Entry;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// One published (or formerly published) index with its generation.
///
/// Immutable: a snapshot never changes after construction. Generations
/// increase monotonically; the boot snapshot is generation 0.
#[derive(Debug)]
pub struct Snapshot {
    index: SuggestionIndex,
    generation: u64,
}

impl Snapshot {
    /// Returns the index this snapshot serves from.
    #[must_use]
    pub const fn index(&self) -> &SuggestionIndex {
        &self.index
    }

    /// Returns this snapshot's generation number.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Service answering suggestion queries against the published snapshot.
///
/// Shared freely across tasks: reads are lock-free and publication is a
/// single atomic swap. Exactly one snapshot is published at any instant;
/// a query in flight always observes one complete snapshot, never a mix
/// of old and new data.
#[derive(Debug)]
pub struct SuggestionService {
    snapshot: ArcSwap<Snapshot>,
    max_results: usize,
}

impl SuggestionService {
    /// Creates a service serving an empty generation-0 snapshot.
    ///
    /// `max_results` is the K-cap applied to every query. The empty boot
    /// snapshot answers every query with no matches until the first
    /// successful reload publishes generation 1.
    #[must_use]
    pub fn new(max_results: usize) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(Snapshot {
                index: SuggestionIndex::empty(),
                generation: 0,
            }),
            max_results,
        }
    }

    /// Answers a suggestion query against the currently published snapshot.
    ///
    /// Never fails: empty input, no matches, and the pre-first-load boot
    /// state all yield an empty vector. Safe for unlimited concurrent
    /// callers.
    #[must_use]
    pub fn suggest(&self, input: &str) -> Vec<Entry> {
        let snapshot = self.snapshot.load_full();
        let hits = snapshot.index().suggest(input, self.max_results);

        metrics::counter!("suggest_requests_total").increment(1);
        if hits.is_empty() {
            metrics::counter!("suggest_no_match_total").increment(1);
        }

        hits.into_iter().cloned().collect()
    }

    /// Publishes a freshly built index as the next snapshot.
    ///
    /// Returns the new generation number. The swap is a single atomic
    /// store; in-flight readers keep the snapshot they already loaded and
    /// new readers observe the replacement. Only the reload scheduler may
    /// call this (single-writer invariant — generations are read-modify-
    /// write without synchronization against other publishers).
    pub fn publish(&self, index: SuggestionIndex) -> u64 {
        let generation = self.snapshot.load().generation + 1;
        self.snapshot.store(Arc::new(Snapshot { index, generation }));

        metrics::gauge!("snapshot_generation").set(generation as f64);
        generation
    }

    /// Returns the currently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.load_full()
    }

    /// Returns the generation of the currently published snapshot.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.snapshot.load().generation
    }

    /// Returns the K-cap applied to every query.
    #[must_use]
    pub const fn max_results(&self) -> usize {
        self.max_results
    }
}
