//! Plane catalog for the arena venue
//!
//! A plane is a named physical display surface with a fixed pixel resolution
//! and therefore a fixed aspect ratio. The catalog is static for the process
//! lifetime; everything else in the crate refers to planes by name.

mod layout;

pub use layout::{compute_layout, PlaneLayout, GRID_GAP, MIN_VISIBLE};

use serde::Serialize;

/// A single named display surface in the venue
#[derive(Debug, Clone, Serialize)]
pub struct PlaneSpec {
    /// Unique identifier, e.g. "A1" or "BIG-MAP"
    pub name: &'static str,
    /// Physical width in pixels
    pub physical_width: f32,
    /// Physical height in pixels
    pub physical_height: f32,
    /// Fallback tint shown when no media is bound (RGB, 0.0-1.0)
    pub display_color: [f32; 3],
}

impl PlaneSpec {
    /// Aspect ratio (width / height)
    pub fn aspect_ratio(&self) -> f32 {
        self.physical_width / self.physical_height
    }
}

/// The fixed venue catalog.
///
/// Dimensions are the true LED processor canvas sizes, so the ratios here are
/// the ratios the UV crop must honor.
const CATALOG: &[PlaneSpec] = &[
    PlaneSpec {
        name: "A1",
        physical_width: 10512.0,
        physical_height: 144.0,
        display_color: [0.35, 0.08, 0.08],
    },
    PlaneSpec {
        name: "A2",
        physical_width: 4320.0,
        physical_height: 432.0,
        display_color: [0.40, 0.22, 0.05],
    },
    PlaneSpec {
        name: "A7",
        physical_width: 1728.0,
        physical_height: 1080.0,
        display_color: [0.05, 0.32, 0.30],
    },
    PlaneSpec {
        name: "B1",
        physical_width: 2880.0,
        physical_height: 1620.0,
        display_color: [0.18, 0.12, 0.38],
    },
    PlaneSpec {
        name: "B2",
        physical_width: 2880.0,
        physical_height: 1620.0,
        display_color: [0.18, 0.12, 0.38],
    },
    PlaneSpec {
        name: "BIG-MAP",
        physical_width: 4096.0,
        physical_height: 4096.0,
        display_color: [0.25, 0.28, 0.30],
    },
    PlaneSpec {
        name: "HALO",
        physical_width: 7680.0,
        physical_height: 768.0,
        display_color: [0.30, 0.10, 0.36],
    },
    PlaneSpec {
        name: "VOM-N",
        physical_width: 1152.0,
        physical_height: 192.0,
        display_color: [0.28, 0.30, 0.10],
    },
    PlaneSpec {
        name: "VOM-S",
        physical_width: 1152.0,
        physical_height: 192.0,
        display_color: [0.28, 0.30, 0.10],
    },
    PlaneSpec {
        name: "STAGE-BACK",
        physical_width: 3840.0,
        physical_height: 2160.0,
        display_color: [0.12, 0.12, 0.14],
    },
];

/// Lookup over the static plane catalog
#[derive(Debug, Clone, Default)]
pub struct PlaneRegistry;

impl PlaneRegistry {
    /// Create a registry over the built-in catalog
    pub fn new() -> Self {
        Self
    }

    /// All planes in catalog order
    pub fn list_planes(&self) -> &'static [PlaneSpec] {
        CATALOG
    }

    /// Look up a plane by exact name
    pub fn get(&self, name: &str) -> Option<&'static PlaneSpec> {
        CATALOG.iter().find(|p| p.name == name)
    }

    /// Whether a plane name exists in the catalog
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of catalog entries
    pub fn len(&self) -> usize {
        CATALOG.len()
    }

    /// Whether the catalog is empty (never, for the built-in venue)
    pub fn is_empty(&self) -> bool {
        CATALOG.is_empty()
    }
}
