//! Byte fetching across the network/filesystem boundary
//!
//! Media sources and model assets are addressed by a location string that is
//! either an http(s) URL or a local path.

use bytes::Bytes;
use thiserror::Error;

/// Failure to materialize bytes from a location
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for {url} failed: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },
    #[error("reading {path} failed: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },
}

/// Whether a location string addresses the network
pub fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Fetch the full contents of a location
pub async fn fetch_bytes(client: &reqwest::Client, location: &str) -> Result<Bytes, FetchError> {
    if is_url(location) {
        let response = client
            .get(location)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|source| FetchError::Http {
                url: location.to_string(),
                source,
            })?;
        response.bytes().await.map_err(|source| FetchError::Http {
            url: location.to_string(),
            source,
        })
    } else {
        let data = tokio::fs::read(location)
            .await
            .map_err(|source| FetchError::File {
                path: location.to_string(),
                source,
            })?;
        Ok(Bytes::from(data))
    }
}
