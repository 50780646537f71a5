//! Suggestion entries and raw datasets.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One suggestible item.
///
/// The `key` is the matchable string; every other field of the source
/// object rides along opaquely in `payload` and is returned verbatim
/// in responses. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    /// The matchable key (a name or phrase), as it appeared in the source.
    pub key: String,
    /// Opaque associated metadata carried by the dataset.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Entry {
    /// Creates an entry with an empty payload.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            payload: Map::new(),
        }
    }

    /// Creates an entry with a payload.
    #[must_use]
    pub fn with_payload(key: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            key: key.into(),
            payload,
        }
    }
}

/// One entry as it appears on the wire, before validation.
///
/// The key is optional at this level so that malformed entries can be
/// dropped during indexing instead of failing the whole document parse.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEntry {
    /// The matchable key, if present.
    pub key: Option<String>,
    /// Everything else the source object carried.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// An unordered collection of entries produced by one load cycle.
///
/// Transient: consumed entirely by the index builder.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RawDataset {
    /// The entries, in source order.
    pub entries: Vec<RawEntry>,
}

impl RawDataset {
    /// Parses a dataset from a JSON document (an array of entry objects).
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error if the document is not an
    /// array of objects. Individual entries with a missing key parse fine
    /// and are dropped later by the builder.
    pub fn from_json_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Returns the number of entries, including ones the builder may drop.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the dataset carries no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<RawEntry> for RawDataset {
    fn from_iter<I: IntoIterator<Item = RawEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Counters produced by one index build.
///
/// Dropped and replaced entries are observability signals, never errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Entries that made it into the index.
    pub indexed: usize,
    /// Entries dropped for a missing, empty, or whitespace-only key.
    pub dropped: usize,
    /// Entries that replaced an earlier entry with the same normalized key.
    pub replaced: usize,
}
