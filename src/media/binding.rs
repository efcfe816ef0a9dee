//! Asynchronous media acquisition
//!
//! `MediaBinder` turns a `MediaSource` into a `MediaHandle`, suspending
//! until the container metadata (dimensions + duration) is available.
//! Failures come back as values; the caller decides any UI feedback.

use bytes::Bytes;
use thiserror::Error;

use super::{probe_metadata, MediaHandle, MediaSource, ProbeError};
use crate::fetch::{fetch_bytes, FetchError};

/// Why a media source failed to load
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("probing {label}: {source}")]
    Probe {
        label: String,
        #[source]
        source: ProbeError,
    },
}

/// Loads media sources into playable handles
#[derive(Debug, Clone, Default)]
pub struct MediaBinder {
    client: reqwest::Client,
}

impl MediaBinder {
    /// Create a binder with its own HTTP client
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a media source, resolving only once usable metadata is known.
    ///
    /// A failed load never leaves a half-built handle behind; either a
    /// complete `MediaHandle` comes back or nothing does.
    pub async fn load(&self, source: MediaSource) -> Result<MediaHandle, LoadError> {
        let label = source.label().to_string();
        let data = match source {
            MediaSource::Url(location) => fetch_bytes(&self.client, &location).await?,
            MediaSource::Upload { data, .. } => data,
        };
        self.load_bytes(label, data)
    }

    /// Probe an already-materialized buffer into a handle
    pub fn load_bytes(&self, label: String, data: Bytes) -> Result<MediaHandle, LoadError> {
        let info = probe_metadata(&data).map_err(|source| LoadError::Probe {
            label: label.clone(),
            source,
        })?;
        log::info!(
            "loaded media '{}': {}x{}, {:.2}s",
            label,
            info.width,
            info.height,
            info.duration
        );
        Ok(MediaHandle::new(label, info, data))
    }
}
