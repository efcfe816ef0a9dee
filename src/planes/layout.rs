//! Grid layout for the 2D schematic view
//!
//! Places every catalog plane on an XZ grid, scaled so the largest physical
//! dimension in the catalog maps to a target world size. Thin ribbon planes
//! get a minimum visible size so they stay clickable.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::PlaneSpec;

/// Gap between grid cells in world units
pub const GRID_GAP: f32 = 0.6;

/// Minimum visible extent per axis in world units.
///
/// When a scaled axis lands below this, the axis is raised to the floor and
/// the other axis is recomputed from the physical ratio, so the ratio
/// invariant holds for every entry.
pub const MIN_VISIBLE: f32 = 0.25;

/// Computed placement for one plane in the schematic grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneLayout {
    /// Scaled extent in world units (x = width, y = height)
    pub size: Vec2,
    /// Cell centre on the ground plane (x, z)
    pub position: Vec2,
}

/// Scale one plane, applying the minimum-visible floor without breaking
/// the aspect ratio.
fn scaled_size(spec: &PlaneSpec, scale: f32) -> (f32, f32) {
    let ratio = spec.aspect_ratio();
    let mut w = spec.physical_width * scale;
    let mut h = spec.physical_height * scale;

    // Only one axis can be under the floor for a non-square plane; the other
    // axis follows the ratio.
    if h < MIN_VISIBLE && h <= w {
        h = MIN_VISIBLE;
        w = h * ratio;
    } else if w < MIN_VISIBLE {
        w = MIN_VISIBLE;
        h = w / ratio;
    }

    (w, h)
}

/// Lay out all planes on a square-ish grid.
///
/// `target_max_dimension` is the world size the single largest physical
/// dimension across the catalog scales to. Deterministic for a fixed catalog
/// and the `GRID_GAP`/`MIN_VISIBLE` constants.
pub fn compute_layout(
    specs: &[PlaneSpec],
    target_max_dimension: f32,
) -> BTreeMap<String, PlaneLayout> {
    let mut result = BTreeMap::new();
    if specs.is_empty() {
        return result;
    }

    let max_physical = specs
        .iter()
        .flat_map(|s| [s.physical_width, s.physical_height])
        .fold(f32::MIN, f32::max);
    let scale = target_max_dimension / max_physical;

    let columns = (specs.len() as f32).sqrt().ceil() as usize;

    let sizes: Vec<(f32, f32)> = specs.iter().map(|s| scaled_size(s, scale)).collect();

    // Column width = widest member of the column, row height = tallest member
    // of the row.
    let rows = specs.len().div_ceil(columns);
    let mut col_widths = vec![0.0f32; columns];
    let mut row_heights = vec![0.0f32; rows];
    for (i, &(w, h)) in sizes.iter().enumerate() {
        let col = i % columns;
        let row = i / columns;
        col_widths[col] = col_widths[col].max(w);
        row_heights[row] = row_heights[row].max(h);
    }

    // Running offsets to each cell centre.
    let mut col_centers = vec![0.0f32; columns];
    let mut x = 0.0f32;
    for (c, width) in col_widths.iter().enumerate() {
        col_centers[c] = x + width / 2.0;
        x += width + GRID_GAP;
    }
    let mut row_centers = vec![0.0f32; rows];
    let mut z = 0.0f32;
    for (r, height) in row_heights.iter().enumerate() {
        row_centers[r] = z + height / 2.0;
        z += height + GRID_GAP;
    }

    for (i, spec) in specs.iter().enumerate() {
        let (w, h) = sizes[i];
        result.insert(
            spec.name.to_string(),
            PlaneLayout {
                size: Vec2::new(w, h),
                position: Vec2::new(col_centers[i % columns], row_centers[i / columns]),
            },
        );
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planes::PlaneRegistry;

    #[test]
    fn test_ratio_preserved_for_all_planes() {
        let registry = PlaneRegistry::new();
        let layout = compute_layout(registry.list_planes(), 10.0);
        for spec in registry.list_planes() {
            let cell = layout.get(spec.name).expect("every plane placed");
            let scaled_ratio = cell.size.x / cell.size.y;
            let physical_ratio = spec.aspect_ratio();
            assert!(
                (scaled_ratio - physical_ratio).abs() < physical_ratio * 1e-4,
                "{}: scaled ratio {} != physical ratio {}",
                spec.name,
                scaled_ratio,
                physical_ratio
            );
        }
    }

    #[test]
    fn test_minimum_visible_floor() {
        let registry = PlaneRegistry::new();
        let layout = compute_layout(registry.list_planes(), 10.0);
        for spec in registry.list_planes() {
            let cell = layout.get(spec.name).unwrap();
            assert!(cell.size.x >= MIN_VISIBLE - 1e-6, "{}", spec.name);
            assert!(cell.size.y >= MIN_VISIBLE - 1e-6, "{}", spec.name);
        }

        // A1 is a 73:1 ribbon; raw scaled height would be far below the
        // floor, so the floor must have kicked in.
        let a1 = layout.get("A1").unwrap();
        assert!((a1.size.y - MIN_VISIBLE).abs() < 1e-6);
    }

    #[test]
    fn test_layout_deterministic() {
        let registry = PlaneRegistry::new();
        let a = compute_layout(registry.list_planes(), 10.0);
        let b = compute_layout(registry.list_planes(), 10.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_cells_do_not_overlap() {
        let registry = PlaneRegistry::new();
        let layout = compute_layout(registry.list_planes(), 10.0);
        let cells: Vec<&PlaneLayout> = layout.values().collect();
        for (i, a) in cells.iter().enumerate() {
            for b in &cells[i + 1..] {
                let delta = (a.position - b.position).abs();
                let overlap_x = delta.x < (a.size.x + b.size.x) / 2.0;
                let overlap_z = delta.y < (a.size.y + b.size.y) / 2.0;
                assert!(!(overlap_x && overlap_z), "cells overlap");
            }
        }
    }

    #[test]
    fn test_empty_catalog() {
        assert!(compute_layout(&[], 10.0).is_empty());
    }
}
