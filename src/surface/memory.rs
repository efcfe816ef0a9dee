//! In-memory backend
//!
//! Records every surface's material, visibility, and emphasis without a GPU.
//! Serves headless runs the way a virtual output device does, and lets tests
//! assert on exactly what the core asked the engine to display.

use std::collections::HashMap;

use super::{Emphasis, Material, SurfaceBackend, SurfaceId, TextureId};
use crate::media::MediaInfo;
use crate::model::MeshBinding;
use crate::planes::PlaneLayout;

/// Recorded state of one surface
#[derive(Debug, Clone)]
pub struct SurfaceRecord {
    /// Name the surface was created under (plane name or mesh name)
    pub label: String,
    pub material: Option<Material>,
    pub visible: bool,
    pub emphasis: Emphasis,
}

/// GPU-less `SurfaceBackend` that records all state changes
#[derive(Debug, Default)]
pub struct MemoryBackend {
    surfaces: HashMap<SurfaceId, SurfaceRecord>,
    live_textures: HashMap<TextureId, MediaInfo>,
    next_surface: u64,
    next_texture: u64,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded state of a surface
    pub fn surface(&self, id: SurfaceId) -> Option<&SurfaceRecord> {
        self.surfaces.get(&id)
    }

    /// Number of textures created but not yet disposed
    pub fn live_texture_count(&self) -> usize {
        self.live_textures.len()
    }

    /// Number of surfaces currently in the scene
    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    fn insert(&mut self, label: String) -> SurfaceId {
        let id = SurfaceId(self.next_surface);
        self.next_surface += 1;
        self.surfaces.insert(
            id,
            SurfaceRecord {
                label,
                material: None,
                visible: true,
                emphasis: Emphasis::Normal,
            },
        );
        id
    }
}

impl SurfaceBackend for MemoryBackend {
    fn create_plane_proxy(
        &mut self,
        name: &str,
        _layout: &PlaneLayout,
        tint: [f32; 3],
    ) -> SurfaceId {
        let id = self.insert(name.to_string());
        self.set_material(id, &Material::Tint(tint));
        id
    }

    fn instantiate_mesh(&mut self, mesh: &MeshBinding) -> SurfaceId {
        self.insert(mesh.mesh_name.clone())
    }

    fn remove_surface(&mut self, surface: SurfaceId) {
        self.surfaces.remove(&surface);
    }

    fn set_material(&mut self, surface: SurfaceId, material: &Material) {
        if let Some(record) = self.surfaces.get_mut(&surface) {
            record.material = Some(*material);
        }
    }

    fn set_visible(&mut self, surface: SurfaceId, visible: bool) {
        if let Some(record) = self.surfaces.get_mut(&surface) {
            record.visible = visible;
        }
    }

    fn set_emphasis(&mut self, surface: SurfaceId, emphasis: Emphasis) {
        if let Some(record) = self.surfaces.get_mut(&surface) {
            record.emphasis = emphasis;
        }
    }

    fn create_video_texture(&mut self, info: &MediaInfo) -> TextureId {
        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        self.live_textures.insert(id, *info);
        id
    }

    fn dispose_texture(&mut self, texture: TextureId) {
        self.live_textures.remove(&texture);
    }
}
