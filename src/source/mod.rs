//! Dataset source backends.
//!
//! A dataset source supplies the raw suggestion dataset for one reload
//! cycle. Sources are read-only collaborators: every call to `load` is an
//! independent, idempotent re-read of the external location, and the
//! returned dataset retains no references into the source.
//!
//! # Available Implementations
//!
//! | Backend | Use Case | Location |
//! |---------|----------|----------|
//! | [`FileSource`] | Default; local JSON document | `source.path` in config |
//! | [`HttpSource`] | Dataset served by another system | `source.url` in config |
//!
//! Load failures are recovered by the reload scheduler: the previously
//! published snapshot keeps serving and the failure is logged and counted.

mod file;
mod http;

pub use file::FileSource;
pub use http::HttpSource;

use crate::Result;
use crate::models::RawDataset;
use async_trait::async_trait;

/// Trait for dataset source backends.
///
/// # Implementor Notes
///
/// - Methods use `&self` to enable sharing via `Arc<dyn DatasetSource>`
/// - `load` must be safely callable repeatedly; each call re-reads the source
/// - Return [`crate::Error::Load`] for transport failures and
///   [`crate::Error::Parse`] for documents that are not an entry array
/// - Do not apply a time bound inside `load`; the reload scheduler bounds
///   the whole load with its configured timeout
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Loads the dataset from the external source.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or the document is
    /// not a JSON array of entry objects.
    async fn load(&self) -> Result<RawDataset>;

    /// Returns a short human-readable description of the source location,
    /// used in logs and error messages.
    fn describe(&self) -> String;
}
