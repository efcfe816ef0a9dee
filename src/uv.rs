//! UV crop computation
//!
//! The target surface shape is physically fixed, so media always fills it
//! and the longer axis of the source gets cropped; there is no letterboxing.
//! The crop is expressed as a scale + centred offset on the texture's
//! sampling coordinates.

use serde::{Deserialize, Serialize};

/// Ratios within this tolerance of each other need no cropping
pub const RATIO_TOLERANCE: f32 = 0.1;

/// Default minimum crop scale; keeps the sample window non-degenerate
pub const DEFAULT_MIN_SCALE: f32 = 0.001;

/// Hand-tuned vertical crop floors for the extreme-ratio planes.
///
/// These values encode screen-content tuning done against real footage on
/// the physical boards; they are a lookup table on purpose, not a formula.
pub const CROP_FLOORS: &[(&str, f32)] = &[("A1", 0.1), ("A2", 0.05), ("HALO", 0.08)];

/// Crop scale floor for a plane
pub fn min_scale_for(plane_name: &str) -> f32 {
    CROP_FLOORS
        .iter()
        .find(|(name, _)| *name == plane_name)
        .map(|(_, floor)| *floor)
        .unwrap_or(DEFAULT_MIN_SCALE)
}

/// Scale + offset applied to texture sampling coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UvCrop {
    pub scale_x: f32,
    pub scale_y: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl UvCrop {
    /// No cropping
    pub const IDENTITY: UvCrop = UvCrop {
        scale_x: 1.0,
        scale_y: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    /// Whether this crop leaves the texture untouched
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for UvCrop {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Compute the crop that fills `target_ratio` with `media_ratio` content
/// without distortion.
///
/// Media narrower than the target loses top/bottom; media wider than the
/// target loses left/right. The vertical scale is clamped to the plane's
/// configured floor so extreme boards keep a usable sliver of the source.
pub fn compute_crop(target_ratio: f32, media_ratio: f32, plane_name: &str) -> UvCrop {
    if (media_ratio - target_ratio).abs() <= RATIO_TOLERANCE {
        return UvCrop::IDENTITY;
    }

    if media_ratio < target_ratio {
        // Source is taller than the board: sample a horizontal band.
        let scale_y = (media_ratio / target_ratio).max(min_scale_for(plane_name));
        UvCrop {
            scale_x: 1.0,
            scale_y,
            offset_x: 0.0,
            offset_y: (1.0 - scale_y) / 2.0,
        }
    } else {
        // Source is wider than the board: sample a vertical band.
        let scale_x = (target_ratio / media_ratio).max(DEFAULT_MIN_SCALE);
        UvCrop {
            scale_x,
            scale_y: 1.0,
            offset_x: (1.0 - scale_x) / 2.0,
            offset_y: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_ratios_identity() {
        for ratio in [0.5, 1.0, 16.0 / 9.0, 4.0, 73.0] {
            assert!(compute_crop(ratio, ratio, "B1").is_identity());
        }
    }

    #[test]
    fn test_near_equal_within_tolerance() {
        let crop = compute_crop(16.0 / 9.0, 16.0 / 9.0 + 0.09, "B1");
        assert!(crop.is_identity());
    }

    #[test]
    fn test_narrow_media_crops_vertically() {
        // 1:1 media on a 16:9 board
        let crop = compute_crop(16.0 / 9.0, 1.0, "B1");
        assert_eq!(crop.scale_x, 1.0);
        assert!((crop.scale_y - 9.0 / 16.0).abs() < 1e-6);
        assert!((crop.offset_y - (1.0 - 9.0 / 16.0) / 2.0).abs() < 1e-6);
        assert_eq!(crop.offset_x, 0.0);
    }

    #[test]
    fn test_wide_media_crops_horizontally() {
        // 21:9 media on a 16:9 board
        let target = 16.0 / 9.0;
        let media = 21.0 / 9.0;
        let crop = compute_crop(target, media, "B1");
        assert_eq!(crop.scale_y, 1.0);
        assert!((crop.scale_x - target / media).abs() < 1e-6);
        assert!((crop.offset_x - (1.0 - target / media) / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_ribbon_floor_clamps_vertical_scale() {
        // 16:9 footage on the A1 ribbon (ratio ~73). The raw quotient would
        // be ~0.024; the configured floor wins.
        let crop = compute_crop(73.0, 16.0 / 9.0, "A1");
        assert!((crop.scale_y - 0.1).abs() < 1e-6);
        assert!((crop.offset_y - 0.45).abs() < 1e-6);
    }

    #[test]
    fn test_unlisted_plane_uses_default_floor() {
        let crop = compute_crop(73.0, 16.0 / 9.0, "B1");
        assert!((crop.scale_y - (16.0 / 9.0) / 73.0).abs() < 1e-6);
    }

    #[test]
    fn test_scales_always_positive_and_bounded() {
        let ratios = [0.01, 0.5, 1.0, 1.77, 4.0, 32.5, 73.0, 500.0];
        for &target in &ratios {
            for &media in &ratios {
                for plane in ["A1", "A2", "HALO", "B1", "BIG-MAP"] {
                    let crop = compute_crop(target, media, plane);
                    assert!(crop.scale_x > 0.0 && crop.scale_x <= 1.0);
                    assert!(crop.scale_y > 0.0 && crop.scale_y <= 1.0);
                }
            }
        }
    }

    #[test]
    fn test_extreme_pair_from_the_field() {
        // 32.5:1 board fed 16:9 footage
        let crop = compute_crop(32.5, 1.77, "B1");
        assert!(crop.scale_y > 0.0 && crop.scale_y <= 1.0);
        assert_eq!(crop.scale_x, 1.0);
    }
}
