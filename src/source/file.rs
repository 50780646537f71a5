//! JSON file dataset source.

use super::DatasetSource;
use crate::models::RawDataset;
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Dataset source backed by a JSON file on the local filesystem.
///
/// The file holds a JSON array of entry objects. It is re-read in full on
/// every load, so edits to the file become visible at the next reload cycle.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Creates a file source for the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path this source reads from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DatasetSource for FileSource {
    async fn load(&self) -> Result<RawDataset> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| Error::Load {
            source: self.describe(),
            cause: e.to_string(),
        })?;

        RawDataset::from_json_slice(&bytes).map_err(|e| Error::Parse {
            source: self.describe(),
            cause: e.to_string(),
        })
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_dataset(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_load_reads_entry_array() {
        let file = write_dataset(r#"[{"key": "apple"}, {"key": "pear"}]"#);
        let source = FileSource::new(file.path());
        let dataset = source.load().await.unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[tokio::test]
    async fn test_load_missing_file_is_load_error() {
        let source = FileSource::new("/nonexistent/suggestions.json");
        let err = source.load().await.unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
    }

    #[tokio::test]
    async fn test_load_malformed_document_is_parse_error() {
        let file = write_dataset("{ not json ");
        let source = FileSource::new(file.path());
        let err = source.load().await.unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[tokio::test]
    async fn test_load_is_idempotent_re_read() {
        let file = write_dataset(r#"[{"key": "apple"}]"#);
        let source = FileSource::new(file.path());
        let first = source.load().await.unwrap();
        let second = source.load().await.unwrap();
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn test_describe_names_the_path() {
        let source = FileSource::new("data/suggestions.json");
        assert_eq!(source.describe(), "file:data/suggestions.json");
    }
}
