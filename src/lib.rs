//! # Suggestd
//!
//! A hot-reloading typeahead suggestion server.
//!
//! Suggestd answers autocomplete queries over a dataset that is refreshed
//! periodically from an external source (a JSON file or an HTTP endpoint).
//! Lookups are served from an immutable in-memory index; refreshes are
//! published as atomically swapped snapshots so readers never block and
//! never observe a partially built index.
//!
//! ## Features
//!
//! - Single-binary distribution with a small, deterministic core
//! - Lock-free reads: a query costs one atomic reference load
//! - Pluggable dataset sources (JSON file, HTTP endpoint)
//! - Background reload cycle with failure isolation (a failed load keeps
//!   the previous snapshot serving)
//! - HTTP transport compatible with the `{"input": "<string>"}` /
//!   `No suggestions` wire contract
//!
//! ## Example
//!
//! ```rust,ignore
//! use suggestd::{FileSource, ReloadScheduler, SuggestionService};
//! use std::sync::Arc;
//!
//! let service = Arc::new(SuggestionService::new(10));
//! let source = Arc::new(FileSource::new("suggestions.json"));
//! let scheduler = ReloadScheduler::new(source, Arc::clone(&service), reload_config);
//! scheduler.run_cycle().await?;
//! let hits = service.suggest("app");
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod index;
pub mod models;
pub mod observability;
pub mod server;
pub mod service;
pub mod source;

// Re-exports for convenience
pub use config::{SourceLocation, SuggestConfig};
pub use index::SuggestionIndex;
pub use models::{BuildStats, Entry, RawDataset};
pub use service::{CycleOutcome, ReloadScheduler, Snapshot, SuggestionService};
pub use source::{DatasetSource, FileSource, HttpSource};

/// Error type for suggestd operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Bad config values, missing source location, malformed CLI input |
/// | `Load` | Dataset source I/O failure (file read, HTTP transport) |
/// | `Parse` | Dataset source returned a document that is not a JSON entry array |
/// | `Timeout` | Dataset load exceeded the configured bound |
/// | `OperationFailed` | Listener bind/serve failures, runtime initialization |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - Configuration names neither a file path nor a URL
    /// - Configuration names both a file path and a URL
    /// - A config value fails validation (e.g. `max_results` of zero)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A dataset source could not be read.
    ///
    /// Recovered by the reload scheduler: the previously published snapshot
    /// keeps serving and the failure is logged and counted.
    #[error("loading dataset from {source} failed: {cause}")]
    Load {
        /// Description of the dataset source.
        r#source: String,
        /// The underlying cause.
        cause: String,
    },

    /// A dataset source returned a malformed document.
    ///
    /// Malformed *individual entries* are dropped during indexing and never
    /// raise this; only a document that fails to parse as an entry array does.
    #[error("parsing dataset from {source} failed: {cause}")]
    Parse {
        /// Description of the dataset source.
        r#source: String,
        /// The underlying cause.
        cause: String,
    },

    /// A dataset load exceeded its time bound.
    ///
    /// Raised by the reload scheduler when the configured load timeout
    /// elapses before the source returns. The cycle is abandoned; no
    /// resource needed by readers is held across the timeout.
    #[error("dataset load from {source} timed out after {elapsed_secs}s")]
    Timeout {
        /// Description of the dataset source.
        r#source: String,
        /// Seconds waited before giving up.
        elapsed_secs: u64,
    },

    /// An operation failed.
    ///
    /// Raised when:
    /// - The HTTP listener cannot bind or serve
    /// - Filesystem I/O errors occur outside the dataset load path
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for suggestd operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("test error".to_string());
        assert_eq!(err.to_string(), "invalid input: test error");

        let err = Error::Load {
            source: "file:suggestions.json".to_string(),
            cause: "no such file".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "loading dataset from file:suggestions.json failed: no such file"
        );

        let err = Error::Timeout {
            source: "http://example.com/data".to_string(),
            elapsed_secs: 30,
        };
        assert_eq!(
            err.to_string(),
            "dataset load from http://example.com/data timed out after 30s"
        );
    }
}
