//! Bound media items and their playback clock
//!
//! One `MediaHandle` backs every surface of a logical plane, however many
//! meshes compose it; transport always acts on the handle, never on an
//! individual surface.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MediaInfo;
use crate::surface::TextureId;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Not playing, position at start
    #[default]
    Stopped,
    /// Currently playing
    Playing,
    /// Paused (retains position)
    Paused,
}

/// Playback clock for one media item, advanced by the frame tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackClock {
    /// Current playback state
    pub state: PlaybackState,
    /// Current time in seconds
    pub current_time: f64,
    /// Total duration in seconds
    pub duration: f64,
    /// Whether playback wraps at the end
    pub looping: bool,
}

impl PlaybackClock {
    /// Create a stopped clock with the given duration
    pub fn new(duration: f64) -> Self {
        Self {
            state: PlaybackState::Stopped,
            current_time: 0.0,
            duration,
            looping: true,
        }
    }

    /// Start playing
    pub fn play(&mut self) {
        self.state = PlaybackState::Playing;
    }

    /// Pause, retaining position
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Stop and rewind to the start
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.current_time = 0.0;
    }

    /// Check if playing
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Seek to a time, clamped to the duration
    pub fn seek(&mut self, time: f64) {
        self.current_time = time.clamp(0.0, self.duration);
    }

    /// Seek to a percentage of the duration (0-100)
    pub fn seek_percent(&mut self, percent: f64) {
        let fraction = (percent / 100.0).clamp(0.0, 1.0);
        self.current_time = self.duration * fraction;
    }

    /// Progress through the media (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Advance the clock (call each frame)
    pub fn update(&mut self, delta_time: f64) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.current_time += delta_time;
        if self.duration > 0.0 && self.current_time >= self.duration {
            if self.looping {
                self.current_time %= self.duration;
            } else {
                self.current_time = self.duration;
                self.state = PlaybackState::Stopped;
            }
        }
    }
}

/// One bound, playable media item and its derived texture
#[derive(Debug)]
pub struct MediaHandle {
    /// Stable identity for logging and per-handle reporting
    pub id: Uuid,
    /// Where the media came from (URL or upload name)
    pub source_label: String,
    /// Probed container metadata
    pub info: MediaInfo,
    /// Transport clock shared by every surface of the plane
    pub clock: PlaybackClock,
    /// Audio mute state
    pub muted: bool,
    /// Audio volume (0.0 to 1.0)
    pub volume: f32,
    /// Texture currently derived from this media, if any
    pub texture: Option<TextureId>,
    /// Retained source buffer; dropping it revokes the uploaded-file token
    buffer: Option<Bytes>,
    released: bool,
}

impl MediaHandle {
    /// Create a handle from probed metadata and its retained source bytes
    pub fn new(source_label: String, info: MediaInfo, buffer: Bytes) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_label,
            info,
            clock: PlaybackClock::new(info.duration),
            muted: false,
            volume: 1.0,
            texture: None,
            buffer: Some(buffer),
            released: false,
        }
    }

    /// Natural aspect ratio of the media
    pub fn aspect_ratio(&self) -> f32 {
        self.info.aspect_ratio()
    }

    /// Whether the handle still owns live resources
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Pause playback and revoke every owned resource.
    ///
    /// Idempotent: releasing twice is a no-op. Texture disposal is the
    /// owner's job since the render backend lives there; this returns the
    /// texture id to dispose, if one was attached.
    pub fn release(&mut self) -> Option<TextureId> {
        if self.released {
            return None;
        }
        self.released = true;
        self.clock.pause();
        self.buffer = None;
        let texture = self.texture.take();
        log::debug!("released media handle {} ({})", self.id, self.source_label);
        texture
    }
}

impl Drop for MediaHandle {
    fn drop(&mut self) {
        if !self.released && self.texture.is_some() {
            log::warn!(
                "media handle {} dropped with live texture {:?}",
                self.id,
                self.texture
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> PlaybackClock {
        PlaybackClock::new(10.0)
    }

    #[test]
    fn test_clock_transitions() {
        let mut c = clock();
        assert_eq!(c.state, PlaybackState::Stopped);
        c.play();
        assert!(c.is_playing());
        c.pause();
        assert_eq!(c.state, PlaybackState::Paused);
        c.stop();
        assert_eq!(c.state, PlaybackState::Stopped);
        assert_eq!(c.current_time, 0.0);
    }

    #[test]
    fn test_clock_update_and_loop() {
        let mut c = clock();
        c.play();
        c.update(4.0);
        assert_eq!(c.current_time, 4.0);
        c.update(8.0);
        assert_eq!(c.current_time, 2.0, "looping wraps");
        assert!(c.is_playing());

        c.looping = false;
        c.update(9.5);
        assert_eq!(c.current_time, 10.0);
        assert_eq!(c.state, PlaybackState::Stopped);
    }

    #[test]
    fn test_seek_percent() {
        let mut c = clock();
        c.seek_percent(50.0);
        assert_eq!(c.current_time, 5.0);
        c.seek_percent(150.0);
        assert_eq!(c.current_time, 10.0);
        c.seek_percent(-5.0);
        assert_eq!(c.current_time, 0.0);
    }

    #[test]
    fn test_release_idempotent() {
        let info = MediaInfo {
            width: 1920,
            height: 1080,
            duration: 12.0,
        };
        let mut handle = MediaHandle::new("clip.mp4".into(), info, Bytes::from_static(b"xx"));
        handle.texture = Some(TextureId(7));
        handle.clock.play();

        assert_eq!(handle.release(), Some(TextureId(7)));
        assert!(handle.is_released());
        assert!(!handle.clock.is_playing());

        // Second release is a no-op, never an error.
        assert_eq!(handle.release(), None);
    }
}
