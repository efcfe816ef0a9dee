//! Mesh classification by naming convention
//!
//! The venue model is authored with a naming contract: composite plane
//! members carry a numbered suffix or a known fixed name, single-surface
//! planes carry the catalog name verbatim, and decorative shells carry
//! structural keywords. Everything else keeps its authored material.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::planes::PlaneRegistry;
use crate::surface::OverrideKind;

/// Numbered-variant composite groups: meshes named `<prefix>_<digits>`
/// collectively form one logical plane.
pub const COMPOSITE_PREFIXES: &[(&str, &str)] = &[("HALO", "HALO")];

/// Fixed-set composite groups: exact mesh names mapped to one logical plane.
pub const COMPOSITE_FIXED: &[(&str, &str)] = &[
    ("BigMapEast", "BIG-MAP"),
    ("BigMapWest", "BIG-MAP"),
];

/// The one inner panel that takes a fixed override despite not matching the
/// structural keywords.
const INNER_PANEL: &str = "InnerBowl";

/// Structural keywords marking decorative shells
const STRUCTURE_KEYWORDS: &[&str] = &["ceiling", "roof", "top"];

/// One mesh discovered in the model asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshBinding {
    /// Node index in the asset's scene graph
    pub node_index: usize,
    /// Mesh index in the asset
    pub mesh_index: usize,
    /// Authored mesh name
    pub mesh_name: String,
}

/// Classification outcome for one mesh name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshClass {
    /// Member of a composite plane group
    CompositePart { plane: String },
    /// The single surface of a catalog plane
    Plane { name: String },
    /// Decorative mesh taking a fixed override material
    Override(OverrideKind),
    /// Keeps its authored material
    Untouched,
}

/// Whether `name` is `<prefix>_<digits>`.
fn matches_numbered_variant(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'))
        .map(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

/// Classify a mesh name. Rules are evaluated in precedence order: composite
/// tables, then exact catalog match, then decorative overrides.
pub fn classify_mesh(name: &str, registry: &PlaneRegistry) -> MeshClass {
    for (prefix, plane) in COMPOSITE_PREFIXES {
        if matches_numbered_variant(name, prefix) {
            return MeshClass::CompositePart {
                plane: plane.to_string(),
            };
        }
    }
    for (mesh, plane) in COMPOSITE_FIXED {
        if name == *mesh {
            return MeshClass::CompositePart {
                plane: plane.to_string(),
            };
        }
    }

    if registry.contains(name) {
        return MeshClass::Plane {
            name: name.to_string(),
        };
    }

    if name == INNER_PANEL {
        return MeshClass::Override(OverrideKind::InnerBowl);
    }
    let lowered = name.to_ascii_lowercase();
    if STRUCTURE_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        return MeshClass::Override(OverrideKind::Structure);
    }

    MeshClass::Untouched
}

/// Meshes backing one logical plane
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaneMeshes {
    /// Whether this plane is a composite group (members get the fixed
    /// identity material until media arrives)
    pub composite: bool,
    pub meshes: Vec<MeshBinding>,
}

/// Everything learned from one resolved asset version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Asset version this classification belongs to
    pub version: u32,
    /// Plane name → meshes backing it
    pub plane_meshes: BTreeMap<String, PlaneMeshes>,
    /// Decorative meshes and their override kinds
    pub overrides: Vec<(MeshBinding, OverrideKind)>,
    /// Count of meshes left with their authored material
    pub untouched: usize,
}

impl ClassificationResult {
    /// Total number of meshes registered against planes
    pub fn bound_mesh_count(&self) -> usize {
        self.plane_meshes.values().map(|p| p.meshes.len()).sum()
    }
}

/// Classify a walked mesh list into a result for `version`.
pub fn classify_meshes(
    version: u32,
    meshes: Vec<MeshBinding>,
    registry: &PlaneRegistry,
) -> ClassificationResult {
    let mut plane_meshes: BTreeMap<String, PlaneMeshes> = BTreeMap::new();
    let mut overrides = Vec::new();
    let mut untouched = 0;

    for mesh in meshes {
        match classify_mesh(&mesh.mesh_name, registry) {
            MeshClass::CompositePart { plane } => {
                let entry = plane_meshes.entry(plane).or_default();
                entry.composite = true;
                entry.meshes.push(mesh);
            }
            MeshClass::Plane { name } => {
                plane_meshes.entry(name).or_default().meshes.push(mesh);
            }
            MeshClass::Override(kind) => overrides.push((mesh, kind)),
            MeshClass::Untouched => untouched += 1,
        }
    }

    log::info!(
        "classified asset v{}: {} plane meshes across {} planes, {} overrides, {} untouched",
        version,
        plane_meshes.values().map(|p| p.meshes.len()).sum::<usize>(),
        plane_meshes.len(),
        overrides.len(),
        untouched
    );

    ClassificationResult {
        version,
        plane_meshes,
        overrides,
        untouched,
    }
}
