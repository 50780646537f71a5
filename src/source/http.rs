//! HTTP dataset source.

use super::DatasetSource;
use crate::models::RawDataset;
use crate::{Error, Result};
use async_trait::async_trait;

/// Dataset source backed by an HTTP(S) endpoint.
///
/// The endpoint serves the same JSON entry array a [`super::FileSource`]
/// reads from disk. Non-2xx responses are load failures; the response body
/// is parsed only on success.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    /// Creates an HTTP source for the given URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Creates an HTTP source with a caller-provided client.
    ///
    /// Useful for sharing a connection pool or injecting client-level
    /// settings such as proxies.
    #[must_use]
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    /// Returns the URL this source fetches from.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DatasetSource for HttpSource {
    async fn load(&self) -> Result<RawDataset> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| Error::Load {
                source: self.describe(),
                cause: e.to_string(),
            })?;

        let bytes = response.bytes().await.map_err(|e| Error::Load {
            source: self.describe(),
            cause: e.to_string(),
        })?;

        RawDataset::from_json_slice(&bytes).map_err(|e| Error::Parse {
            source: self.describe(),
            cause: e.to_string(),
        })
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_is_the_url() {
        let source = HttpSource::new("https://example.com/suggestions.json");
        assert_eq!(source.describe(), "https://example.com/suggestions.json");
        assert_eq!(source.url(), "https://example.com/suggestions.json");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_load_error() {
        // Port 1 on loopback refuses the connection immediately.
        let source = HttpSource::new("http://127.0.0.1:1/suggestions.json");
        let err = source.load().await;
        assert!(matches!(err, Err(Error::Load { .. })));
    }
}
