//! Media source addressing
//!
//! A source is either a location string (URL or path) or an uploaded file
//! whose bytes the caller already holds.

use bytes::Bytes;

/// Where a playable media item comes from
#[derive(Debug, Clone)]
pub enum MediaSource {
    /// http(s) URL or filesystem path
    Url(String),
    /// Uploaded file: the buffer is the revocable resource token and is
    /// dropped when the owning handle is released
    Upload { name: String, data: Bytes },
}

impl MediaSource {
    /// Human-readable label for logs and UI
    pub fn label(&self) -> &str {
        match self {
            MediaSource::Url(url) => url,
            MediaSource::Upload { name, .. } => name,
        }
    }

    /// Convenience constructor for an uploaded buffer
    pub fn upload(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        MediaSource::Upload {
            name: name.into(),
            data: data.into(),
        }
    }
}

impl From<&str> for MediaSource {
    fn from(location: &str) -> Self {
        MediaSource::Url(location.to_string())
    }
}

impl From<String> for MediaSource {
    fn from(location: String) -> Self {
        MediaSource::Url(location)
    }
}
