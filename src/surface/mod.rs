//! Render-engine seam
//!
//! The core never draws; it owns *what* each renderable rectangle currently
//! shows. The engine behind `SurfaceBackend` supplies surfaces (flat proxy
//! geometry in 2D, imported meshes in 3D), applies materials, and manages
//! texture resources. `MemoryBackend` is a GPU-less implementation for
//! headless runs and tests.

mod memory;

pub use memory::MemoryBackend;

use serde::{Deserialize, Serialize};

use crate::media::MediaInfo;
use crate::model::MeshBinding;
use crate::planes::PlaneLayout;
use crate::uv::UvCrop;

/// Opaque identity of one renderable rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(pub u64);

/// Opaque identity of one backend texture resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureId(pub u64);

/// Which presentation a surface belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenderMode {
    /// Schematic top-down grid of proxy rectangles
    TwoD,
    /// Imported venue model
    ThreeD,
}

/// Fixed material kinds for meshes the classifier excludes from binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverrideKind {
    /// Ceiling/roof/top shells rendered as neutral structure
    Structure,
    /// The inner bowl panel
    InnerBowl,
}

/// What a surface currently displays
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Material {
    /// Plane fallback tint, shown whenever no media is bound
    Tint([f32; 3]),
    /// Cropped video texture
    Video { texture: TextureId, crop: UvCrop },
    /// Fixed identity look for members of a composite plane awaiting media
    CompositeIdentity,
    /// Fixed override for decorative meshes, never video-bound
    DecorOverride(OverrideKind),
}

/// Highlight emphasis applied on top of the material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Emphasis {
    #[default]
    Normal,
    Highlighted,
    Dimmed,
}

/// Capabilities the core consumes from the render engine.
///
/// Surface and texture ids handed out here stay valid until the matching
/// `remove_surface`/`dispose_texture` call.
pub trait SurfaceBackend {
    /// Build a flat proxy rectangle for the 2D schematic
    fn create_plane_proxy(&mut self, name: &str, layout: &PlaneLayout, tint: [f32; 3])
        -> SurfaceId;

    /// Materialize one classified mesh from the loaded model asset
    fn instantiate_mesh(&mut self, mesh: &MeshBinding) -> SurfaceId;

    /// Remove a surface from the scene entirely
    fn remove_surface(&mut self, surface: SurfaceId);

    /// Replace the material a surface displays
    fn set_material(&mut self, surface: SurfaceId, material: &Material);

    /// Show or hide a surface
    fn set_visible(&mut self, surface: SurfaceId, visible: bool);

    /// Apply highlight emphasis
    fn set_emphasis(&mut self, surface: SurfaceId, emphasis: Emphasis);

    /// Create a texture sized for the given media
    fn create_video_texture(&mut self, info: &MediaInfo) -> TextureId;

    /// Dispose a texture created by `create_video_texture`
    fn dispose_texture(&mut self, texture: TextureId);
}
