//! Shared transport control
//!
//! One transport drives every bound plane: play, pause, stop-and-rewind, and
//! percentage seek fan out to each plane's media handle. Per-plane audio
//! (mute, volume) lives here too.

use serde::{Deserialize, Serialize};

use super::PlaneBindingManager;
use crate::media::PlaybackState;
use crate::surface::SurfaceBackend;

/// Snapshot of the shared transport, taken from the first bound plane
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaybackSummary {
    pub current_time: f64,
    pub duration: f64,
    pub is_playing: bool,
    pub bound_plane_count: usize,
}

impl<B: SurfaceBackend> PlaneBindingManager<B> {
    /// Start playback on every bound plane
    pub fn play_all(&mut self) {
        for (name, media) in self.bindings_mut() {
            if let Some(media) = media {
                media.clock.play();
                log::debug!("play: {name}");
            }
        }
    }

    /// Pause every bound plane in place
    pub fn pause_all(&mut self) {
        for (_, media) in self.bindings_mut() {
            if let Some(media) = media {
                media.clock.pause();
            }
        }
    }

    /// Stop every bound plane and rewind to the start
    pub fn stop_and_rewind_all(&mut self) {
        for (_, media) in self.bindings_mut() {
            if let Some(media) = media {
                media.clock.stop();
            }
        }
    }

    /// Seek every bound plane to a percentage of its own duration.
    ///
    /// Handles of different lengths land on different absolute times; the
    /// percentage is what stays uniform. Out-of-range values clamp.
    pub fn seek_all(&mut self, percent: f64) {
        let percent = percent.clamp(0.0, 100.0);
        for (_, media) in self.bindings_mut() {
            if let Some(media) = media {
                media.clock.seek_percent(percent);
            }
        }
    }

    /// Advance every playing clock by `delta` seconds
    pub fn advance(&mut self, delta: f64) {
        for (_, media) in self.bindings_mut() {
            if let Some(media) = media {
                media.clock.update(delta);
            }
        }
    }

    /// Transport snapshot for display. Time and duration come from the
    /// first bound plane; with none bound, everything reads zero.
    pub fn playback_summary(&self) -> PlaybackSummary {
        let bound_plane_count = self.bound_plane_count();
        let first = self.bindings().find_map(|(_, media)| media);
        match first {
            Some(media) => PlaybackSummary {
                current_time: media.clock.current_time,
                duration: media.clock.duration,
                is_playing: media.clock.state == PlaybackState::Playing,
                bound_plane_count,
            },
            None => PlaybackSummary::default(),
        }
    }

    /// Mute or unmute one plane's audio. False for unbound planes.
    pub fn set_muted(&mut self, name: &str, muted: bool) -> bool {
        match self.media_mut(name) {
            Some(media) => {
                media.muted = muted;
                true
            }
            None => {
                log::warn!("set_muted: no media bound to '{name}'");
                false
            }
        }
    }

    /// Flip one plane's mute state, returning the new state
    pub fn toggle_muted(&mut self, name: &str) -> Option<bool> {
        let media = self.media_mut(name)?;
        media.muted = !media.muted;
        Some(media.muted)
    }

    /// Set playback volume on every unmuted plane
    pub fn set_global_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        for (_, media) in self.bindings_mut() {
            if let Some(media) = media {
                if !media.muted {
                    media.volume = volume;
                }
            }
        }
    }
}
