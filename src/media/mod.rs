//! Media acquisition and playback state
//!
//! One bound media item per logical plane: a source (URL or uploaded
//! buffer), the container metadata needed for UV mapping, and a playback
//! clock driven by the frame tick.

mod binding;
mod handle;
mod probe;
mod source;

pub use binding::{LoadError, MediaBinder};

#[cfg(test)]
pub(crate) use probe::tests_support;
pub use handle::{MediaHandle, PlaybackClock, PlaybackState};
pub use probe::{probe_metadata, MediaInfo, ProbeError};
pub use source::MediaSource;
