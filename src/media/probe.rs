//! Container metadata probe for MP4/MOV media
//!
//! Walks the ISO BMFF box structure far enough to learn the movie duration
//! (`moov/mvhd`) and the visual track dimensions (`moov/trak/tkhd`). UV
//! mapping needs the true aspect ratio, so a load is only considered
//! successful once both are known; "enough bytes to start buffering" is not
//! enough.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Metadata required before media can be bound to a plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Visual track width in pixels
    pub width: u32,
    /// Visual track height in pixels
    pub height: u32,
    /// Movie duration in seconds
    pub duration: f64,
}

impl MediaInfo {
    /// Natural aspect ratio of the media
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Why a container could not be probed
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("container data ends inside a box header or payload")]
    Truncated,
    #[error("not an ISO base media file")]
    UnsupportedContainer,
    #[error("no movie header (mvhd) box found")]
    NoMovieHeader,
    #[error("no visual track with non-zero dimensions found")]
    NoVideoTrack,
}

/// One parsed box header
struct BoxHeader {
    kind: [u8; 4],
    /// Offset of the payload relative to the box start
    payload_start: usize,
    /// Total box length including the header
    total_len: usize,
}

fn be_u32(data: &[u8], at: usize) -> Result<u32, ProbeError> {
    let bytes = data
        .get(at..at + 4)
        .ok_or(ProbeError::Truncated)?
        .try_into()
        .expect("slice length checked");
    Ok(u32::from_be_bytes(bytes))
}

fn be_u64(data: &[u8], at: usize) -> Result<u64, ProbeError> {
    let bytes = data
        .get(at..at + 8)
        .ok_or(ProbeError::Truncated)?
        .try_into()
        .expect("slice length checked");
    Ok(u64::from_be_bytes(bytes))
}

/// Read the box starting at `offset` within `data`.
fn read_box(data: &[u8], offset: usize) -> Result<BoxHeader, ProbeError> {
    let size = be_u32(data, offset)? as u64;
    let kind: [u8; 4] = data
        .get(offset + 4..offset + 8)
        .ok_or(ProbeError::Truncated)?
        .try_into()
        .expect("slice length checked");

    let (total, payload_start) = match size {
        // Box extends to the end of the data.
        0 => ((data.len() - offset) as u64, 8),
        // 64-bit size follows the type.
        1 => (be_u64(data, offset + 8)?, 16),
        n => (n, 8),
    };

    if total < payload_start as u64 || offset as u64 + total > data.len() as u64 {
        return Err(ProbeError::Truncated);
    }

    Ok(BoxHeader {
        kind,
        payload_start,
        total_len: total as usize,
    })
}

/// Iterate the child boxes of `data[start..end]`, calling `visit` with each
/// box kind and payload.
fn walk_children<F>(data: &[u8], start: usize, end: usize, mut visit: F) -> Result<(), ProbeError>
where
    F: FnMut(&[u8; 4], &[u8]) -> Result<(), ProbeError>,
{
    let mut offset = start;
    while offset + 8 <= end {
        let header = read_box(data, offset)?;
        let payload = &data[offset + header.payload_start..offset + header.total_len];
        visit(&header.kind, payload)?;
        offset += header.total_len;
    }
    Ok(())
}

/// Parse an mvhd payload into (timescale, duration-in-units).
fn parse_mvhd(payload: &[u8]) -> Result<(u32, u64), ProbeError> {
    let version = *payload.first().ok_or(ProbeError::Truncated)?;
    match version {
        0 => {
            // creation(4) modification(4) timescale(4) duration(4)
            let timescale = be_u32(payload, 12)?;
            let duration = be_u32(payload, 16)? as u64;
            Ok((timescale, duration))
        }
        1 => {
            // creation(8) modification(8) timescale(4) duration(8)
            let timescale = be_u32(payload, 20)?;
            let duration = be_u64(payload, 24)?;
            Ok((timescale, duration))
        }
        _ => Err(ProbeError::UnsupportedContainer),
    }
}

/// Parse a tkhd payload into (width, height) from the 16.16 fixed fields.
fn parse_tkhd(payload: &[u8]) -> Result<(u32, u32), ProbeError> {
    let version = *payload.first().ok_or(ProbeError::Truncated)?;
    // Offsets past version(1)+flags(3), duration field width differs.
    let base = match version {
        0 => 4 + 4 + 4 + 4 + 4 + 4, // creation, modification, id, reserved, duration
        1 => 4 + 8 + 8 + 4 + 4 + 8,
        _ => return Err(ProbeError::UnsupportedContainer),
    };
    // reserved(8) layer(2) alternate(2) volume(2) reserved(2) matrix(36)
    let dims = base + 8 + 2 + 2 + 2 + 2 + 36;
    let width = be_u32(payload, dims)? >> 16;
    let height = be_u32(payload, dims + 4)? >> 16;
    Ok((width, height))
}

/// Probe an MP4/MOV byte buffer for the metadata UV mapping depends on.
pub fn probe_metadata(data: &[u8]) -> Result<MediaInfo, ProbeError> {
    if data.len() < 8 {
        return Err(ProbeError::Truncated);
    }
    // The first box type must be ASCII; anything else is not BMFF at all.
    if !data[4..8].iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        return Err(ProbeError::UnsupportedContainer);
    }

    let mut movie: Option<(u32, u64)> = None;
    let mut dimensions: Option<(u32, u32)> = None;

    walk_children(data, 0, data.len(), |kind, payload| {
        if kind != b"moov" {
            return Ok(());
        }
        let moov = payload;
        walk_children(moov, 0, moov.len(), |kind, payload| {
            match kind {
                b"mvhd" => {
                    movie = Some(parse_mvhd(payload)?);
                }
                b"trak" if dimensions.is_none() => {
                    let trak = payload;
                    walk_children(trak, 0, trak.len(), |kind, payload| {
                        if kind == b"tkhd" && dimensions.is_none() {
                            let (w, h) = parse_tkhd(payload)?;
                            if w > 0 && h > 0 {
                                dimensions = Some((w, h));
                            }
                        }
                        Ok(())
                    })?;
                }
                _ => {}
            }
            Ok(())
        })
    })?;

    let (timescale, duration_units) = movie.ok_or(ProbeError::NoMovieHeader)?;
    let (width, height) = dimensions.ok_or(ProbeError::NoVideoTrack)?;
    if timescale == 0 {
        return Err(ProbeError::NoMovieHeader);
    }

    Ok(MediaInfo {
        width,
        height,
        duration: duration_units as f64 / timescale as f64,
    })
}
