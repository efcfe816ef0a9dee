//! Plane binding management
//!
//! The heart of the visualizer: maps each logical plane name to the concrete
//! surfaces backing it in each rendering mode, owns the one media handle per
//! plane, and keeps every surface of a plane showing the same cropped
//! texture. Composite planes (many meshes, one name) always move as a unit.

mod transport;

pub use transport::PlaybackSummary;

use std::collections::HashMap;

use crate::media::{LoadError, MediaBinder, MediaHandle, MediaSource};
use crate::planes::PlaneRegistry;
use crate::surface::{Emphasis, Material, RenderMode, SurfaceBackend, SurfaceId};
use crate::uv::compute_crop;

/// Claim on a plane's next bind; completing against a newer claim is a no-op
#[derive(Debug, Clone, Copy)]
#[must_use = "a bind ticket must be completed or the plane stays cleared"]
pub struct BindTicket {
    index: usize,
    generation: u64,
}

/// Everything tracked for one logical plane name
#[derive(Debug)]
struct PlaneBinding {
    name: String,
    fallback_tint: [f32; 3],
    target_ratio: f32,
    surfaces_2d: Vec<SurfaceId>,
    surfaces_3d: Vec<SurfaceId>,
    media: Option<MediaHandle>,
    /// Bind generation; a completed load only lands if its ticket still
    /// matches (last call wins)
    generation: u64,
}

impl PlaneBinding {
    fn surfaces(&self, mode: RenderMode) -> &[SurfaceId] {
        match mode {
            RenderMode::TwoD => &self.surfaces_2d,
            RenderMode::ThreeD => &self.surfaces_3d,
        }
    }

    fn all_surfaces(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        self.surfaces_2d.iter().chain(&self.surfaces_3d).copied()
    }
}

/// Maps plane names to renderable surfaces and bound media
pub struct PlaneBindingManager<B: SurfaceBackend> {
    registry: PlaneRegistry,
    backend: B,
    binder: MediaBinder,
    bindings: Vec<PlaneBinding>,
    index: HashMap<String, usize>,
    mode: RenderMode,
}

impl<B: SurfaceBackend> PlaneBindingManager<B> {
    /// Create a manager over the given render backend, starting in 2D
    pub fn new(registry: PlaneRegistry, backend: B, binder: MediaBinder) -> Self {
        Self {
            registry,
            backend,
            binder,
            bindings: Vec::new(),
            index: HashMap::new(),
            mode: RenderMode::TwoD,
        }
    }

    /// Currently active rendering mode
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// The render backend, for surface creation by the owner
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The render backend, read-only
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Number of planes currently holding bound media
    pub fn bound_plane_count(&self) -> usize {
        self.bindings.iter().filter(|b| b.media.is_some()).count()
    }

    /// Whether a plane currently has media bound
    pub fn has_media(&self, name: &str) -> bool {
        self.binding(name).is_some_and(|b| b.media.is_some())
    }

    /// Source label of the media bound to a plane, if any
    pub fn bound_source(&self, name: &str) -> Option<&str> {
        self.binding(name)?
            .media
            .as_ref()
            .map(|m| m.source_label.as_str())
    }

    /// Surfaces registered for a plane in a mode
    pub fn surfaces_for(&self, name: &str, mode: RenderMode) -> &[SurfaceId] {
        self.binding(name).map(|b| b.surfaces(mode)).unwrap_or(&[])
    }

    fn binding(&self, name: &str) -> Option<&PlaneBinding> {
        self.index.get(name).map(|&i| &self.bindings[i])
    }

    fn binding_index(&mut self, name: &str) -> Option<usize> {
        if let Some(&i) = self.index.get(name) {
            return Some(i);
        }
        // Only catalog planes get a binding slot.
        let spec = self.registry.get(name)?;
        let i = self.bindings.len();
        self.bindings.push(PlaneBinding {
            name: spec.name.to_string(),
            fallback_tint: spec.display_color,
            target_ratio: spec.aspect_ratio(),
            surfaces_2d: Vec::new(),
            surfaces_3d: Vec::new(),
            media: None,
            generation: 0,
        });
        self.index.insert(spec.name.to_string(), i);
        Some(i)
    }

    /// Associate surfaces with a plane name for one rendering mode.
    ///
    /// Composite planes call this with several surfaces under one name.
    /// Returns false (and registers nothing) for names not in the catalog.
    pub fn register_surfaces(
        &mut self,
        name: &str,
        surfaces: Vec<SurfaceId>,
        mode: RenderMode,
    ) -> bool {
        let Some(i) = self.binding_index(name) else {
            log::warn!("register_surfaces: unknown plane '{name}'");
            return false;
        };
        let visible = mode == self.mode;
        for &surface in &surfaces {
            self.backend.set_visible(surface, visible);
        }

        // A plane whose media was bound before these surfaces existed (a
        // model swap re-registering its meshes, say) shows it at once.
        if visible {
            let binding = &self.bindings[i];
            let material = binding.media.as_ref().and_then(|m| {
                m.texture.map(|texture| Material::Video {
                    texture,
                    crop: compute_crop(binding.target_ratio, m.aspect_ratio(), &binding.name),
                })
            });
            if let Some(material) = material {
                for &surface in &surfaces {
                    self.backend.set_material(surface, &material);
                }
            }
        }

        let binding = &mut self.bindings[i];
        match mode {
            RenderMode::TwoD => binding.surfaces_2d.extend(surfaces),
            RenderMode::ThreeD => binding.surfaces_3d.extend(surfaces),
        }
        true
    }

    /// Drop every surface registered for a mode, removing them from the
    /// scene. Media handles stay bound to their plane names; they reattach
    /// to whatever surfaces are registered next.
    pub fn unregister_mode(&mut self, mode: RenderMode) {
        for binding in &mut self.bindings {
            let surfaces = match mode {
                RenderMode::TwoD => std::mem::take(&mut binding.surfaces_2d),
                RenderMode::ThreeD => std::mem::take(&mut binding.surfaces_3d),
            };
            for surface in surfaces {
                self.backend.remove_surface(surface);
            }
        }
    }

    /// Start a bind for a plane: clears current media and claims the next
    /// generation. Returns None for names not in the catalog.
    pub fn begin_bind(&mut self, name: &str) -> Option<BindTicket> {
        let index = self.binding_index(name).or_else(|| {
            log::warn!("bind requested for unknown plane '{name}'");
            None
        })?;
        self.release_media(index);
        let binding = &mut self.bindings[index];
        binding.generation += 1;
        Some(BindTicket {
            index,
            generation: binding.generation,
        })
    }

    /// Land a finished load against its ticket.
    ///
    /// A stale ticket (a newer bind was started since) discards the result
    /// and releases its resources. A load error leaves the plane on its
    /// fallback tint. Returns whether the media was applied.
    pub fn complete_bind(
        &mut self,
        ticket: BindTicket,
        result: Result<MediaHandle, LoadError>,
    ) -> bool {
        let binding = &self.bindings[ticket.index];
        if binding.generation != ticket.generation {
            if let Ok(mut stale) = result {
                log::info!(
                    "discarding stale load of '{}' for plane {} (superseded)",
                    stale.source_label,
                    binding.name
                );
                // Never applied, so no texture to dispose.
                stale.release();
            }
            return false;
        }

        let mut handle = match result {
            Ok(handle) => handle,
            Err(err) => {
                log::warn!("load for plane {} failed: {err}", binding.name);
                return false;
            }
        };

        let crop = compute_crop(binding.target_ratio, handle.aspect_ratio(), &binding.name);
        let texture = self.backend.create_video_texture(&handle.info);
        handle.texture = Some(texture);
        let material = Material::Video { texture, crop };

        let binding = &mut self.bindings[ticket.index];
        binding.media = Some(handle);
        let visible: Vec<SurfaceId> = binding.surfaces(self.mode).to_vec();
        for surface in visible {
            self.backend.set_material(surface, &material);
        }
        log::info!("bound media to plane {}", binding.name);
        true
    }

    /// Load a source onto a plane. Convenience composition of
    /// `begin_bind` → load → `complete_bind`; last call wins when callers
    /// interleave the pieces themselves.
    pub async fn bind_media(&mut self, name: &str, source: MediaSource) -> bool {
        let Some(ticket) = self.begin_bind(name) else {
            return false;
        };
        let binder = self.binder.clone();
        let result = binder.load(source).await;
        self.complete_bind(ticket, result)
    }

    /// Bind a batch of sources by matching each label's file stem against
    /// the plane catalog (case-insensitive). Returns the number of planes
    /// bound; unmatched labels and failed loads are logged and skipped, one
    /// source's failure never aborts the rest.
    pub async fn bind_matching(&mut self, sources: Vec<MediaSource>) -> usize {
        let mut bound = 0;
        for source in sources {
            let Some(plane) = self.match_plane(source.label()) else {
                log::warn!("no plane matches media '{}'", source.label());
                continue;
            };
            if self.bind_media(&plane, source).await {
                bound += 1;
            }
        }
        bound
    }

    /// Catalog plane whose name equals a label's file stem, ignoring case
    fn match_plane(&self, label: &str) -> Option<String> {
        let stem = std::path::Path::new(label).file_stem()?.to_str()?;
        self.registry
            .list_planes()
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(stem))
            .map(|p| p.name.to_string())
    }

    /// Release a plane's media and restore its fallback tint on every
    /// surface in both modes. The surfaces themselves stay registered.
    pub fn clear(&mut self, name: &str) -> bool {
        let Some(&index) = self.index.get(name) else {
            log::warn!("clear: unknown or never-registered plane '{name}'");
            return false;
        };
        // Invalidate any in-flight load as well.
        self.bindings[index].generation += 1;
        self.release_media(index);
        true
    }

    /// Release media (if any) and repaint every surface with the tint.
    fn release_media(&mut self, index: usize) {
        let binding = &mut self.bindings[index];
        if let Some(mut media) = binding.media.take() {
            if let Some(texture) = media.release() {
                self.backend.dispose_texture(texture);
            }
        }
        let binding = &self.bindings[index];
        let tint = Material::Tint(binding.fallback_tint);
        let surfaces: Vec<SurfaceId> = binding.all_surfaces().collect();
        for surface in surfaces {
            self.backend.set_material(surface, &tint);
        }
    }

    /// Switch the active rendering mode.
    ///
    /// No-op when already in the target mode. Hides the outgoing mode's
    /// surfaces, shows the incoming mode's, and re-applies every bound
    /// plane's video material to the newly exposed set — a plane bound
    /// while the other mode was active must show its media here.
    pub fn switch_mode(&mut self, target: RenderMode) {
        if self.mode == target {
            return;
        }
        let outgoing = self.mode;
        self.mode = target;
        log::info!("switching mode {outgoing:?} -> {target:?}");

        for i in 0..self.bindings.len() {
            let binding = &self.bindings[i];
            let hide: Vec<SurfaceId> = binding.surfaces(outgoing).to_vec();
            let show: Vec<SurfaceId> = binding.surfaces(target).to_vec();
            let material = binding.media.as_ref().and_then(|m| {
                m.texture.map(|texture| Material::Video {
                    texture,
                    crop: compute_crop(binding.target_ratio, m.aspect_ratio(), &binding.name),
                })
            });

            for surface in hide {
                self.backend.set_visible(surface, false);
            }
            for surface in show {
                self.backend.set_visible(surface, true);
                if let Some(material) = &material {
                    self.backend.set_material(surface, material);
                }
            }
        }
    }

    /// Emphasize every surface of one plane and dim all others.
    ///
    /// Composite planes highlight as one unit. Unknown names reset the
    /// highlight instead.
    pub fn highlight(&mut self, name: &str) {
        if !self.index.contains_key(name) {
            log::warn!("highlight: unknown plane '{name}'");
            self.reset_highlight();
            return;
        }
        for i in 0..self.bindings.len() {
            let emphasis = if self.bindings[i].name == name {
                Emphasis::Highlighted
            } else {
                Emphasis::Dimmed
            };
            let surfaces: Vec<SurfaceId> = self.bindings[i].all_surfaces().collect();
            for surface in surfaces {
                self.backend.set_emphasis(surface, emphasis);
            }
        }
    }

    /// Return every surface to normal emphasis
    pub fn reset_highlight(&mut self) {
        for i in 0..self.bindings.len() {
            let surfaces: Vec<SurfaceId> = self.bindings[i].all_surfaces().collect();
            for surface in surfaces {
                self.backend.set_emphasis(surface, Emphasis::Normal);
            }
        }
    }

    pub(crate) fn bindings(&self) -> impl Iterator<Item = (&str, Option<&MediaHandle>)> {
        self.bindings
            .iter()
            .map(|b| (b.name.as_str(), b.media.as_ref()))
    }

    pub(crate) fn bindings_mut(
        &mut self,
    ) -> impl Iterator<Item = (&str, Option<&mut MediaHandle>)> {
        self.bindings
            .iter_mut()
            .map(|b| (b.name.as_str(), b.media.as_mut()))
    }

    pub(crate) fn media_mut(&mut self, name: &str) -> Option<&mut MediaHandle> {
        let &i = self.index.get(name)?;
        self.bindings[i].media.as_mut()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::media::tests_support::sample_movie;
    use crate::surface::Material;
    use crate::uv::UvCrop;

    #[test]
    fn test_register_unknown_plane_rejected() {
        let mut mgr = manager();
        assert!(!mgr.register_surfaces("NOT-A-PLANE", vec![SurfaceId(99)], RenderMode::TwoD));
        assert!(mgr.surfaces_for("NOT-A-PLANE", RenderMode::TwoD).is_empty());
    }

    #[test]
    fn test_bind_applies_cropped_video_to_all_surfaces() {
        let mut mgr = manager();
        // HALO is a composite plane: several surfaces under one name.
        let s1 = proxy(&mut mgr, "HALO");
        let s2 = proxy(&mut mgr, "HALO");

        let ticket = mgr.begin_bind("HALO").unwrap();
        assert!(mgr.complete_bind(ticket, Ok(loaded("show.mp4", 1920, 1080, 30.0))));

        let m1 = mgr.backend().surface(s1).unwrap().material;
        let m2 = mgr.backend().surface(s2).unwrap().material;
        assert_eq!(m1, m2, "composite surfaces share one material");
        match m1 {
            Some(Material::Video { crop, .. }) => {
                // 16:9 on the 10:1 halo: vertical crop clamped to its floor.
                assert!((crop.scale_y - 0.177_777_78).abs() < 1e-4);
                assert_eq!(crop.scale_x, 1.0);
            }
            other => panic!("expected video material, got {other:?}"),
        }
        assert_eq!(mgr.bound_plane_count(), 1);
        assert_eq!(mgr.backend().live_texture_count(), 1);
    }

    #[test]
    fn test_bind_then_clear_restores_tint_and_releases() {
        let mut mgr = manager();
        let s = proxy(&mut mgr, "A7");

        let ticket = mgr.begin_bind("A7").unwrap();
        assert!(mgr.complete_bind(ticket, Ok(loaded("clip.mp4", 1728, 1080, 10.0))));
        assert_eq!(mgr.bound_plane_count(), 1);

        assert!(mgr.clear("A7"));
        let spec = PlaneRegistry::new().get("A7").unwrap();
        assert_eq!(
            mgr.backend().surface(s).unwrap().material,
            Some(Material::Tint(spec.display_color))
        );
        assert_eq!(mgr.bound_plane_count(), 0);
        assert_eq!(mgr.backend().live_texture_count(), 0, "texture disposed");
        // Surfaces stay registered; only the material changed.
        assert_eq!(mgr.surfaces_for("A7", RenderMode::TwoD).len(), 1);
    }

    #[test]
    fn test_clear_resets_both_mode_sets() {
        let mut mgr = manager();
        let s2d = proxy(&mut mgr, "B1");
        let s3d = {
            let id = mgr
                .backend_mut()
                .create_plane_proxy("B1", &unit_layout(), [0.0; 3]);
            assert!(mgr.register_surfaces("B1", vec![id], RenderMode::ThreeD));
            id
        };

        let ticket = mgr.begin_bind("B1").unwrap();
        assert!(mgr.complete_bind(ticket, Ok(loaded("clip.mp4", 2880, 1620, 5.0))));
        assert!(mgr.clear("B1"));

        let spec = PlaneRegistry::new().get("B1").unwrap();
        for s in [s2d, s3d] {
            assert_eq!(
                mgr.backend().surface(s).unwrap().material,
                Some(Material::Tint(spec.display_color))
            );
        }
    }

    #[test]
    fn test_last_bind_wins_regardless_of_resolution_order() {
        let mut mgr = manager();
        proxy(&mut mgr, "A7");

        // Slow source starts first, fast source second; fast resolves first.
        let slow = mgr.begin_bind("A7").unwrap();
        let fast = mgr.begin_bind("A7").unwrap();

        assert!(mgr.complete_bind(fast, Ok(loaded("fast.mp4", 1280, 720, 5.0))));
        assert!(!mgr.complete_bind(slow, Ok(loaded("slow.mp4", 640, 480, 9.0))));

        assert_eq!(mgr.bound_source("A7"), Some("fast.mp4"));
        assert_eq!(
            mgr.backend().live_texture_count(),
            1,
            "stale load must not leak resources"
        );
    }

    #[test]
    fn test_clear_invalidates_inflight_bind() {
        let mut mgr = manager();
        proxy(&mut mgr, "A7");

        let ticket = mgr.begin_bind("A7").unwrap();
        assert!(mgr.clear("A7"));
        assert!(!mgr.complete_bind(ticket, Ok(loaded("late.mp4", 1280, 720, 5.0))));
        assert!(!mgr.has_media("A7"));
    }

    #[test]
    fn test_failed_load_leaves_fallback() {
        let mut mgr = manager();
        let s = proxy(&mut mgr, "A7");

        // Bind something first; a failing replacement clears but does not
        // restore the old media.
        let t1 = mgr.begin_bind("A7").unwrap();
        assert!(mgr.complete_bind(t1, Ok(loaded("old.mp4", 1728, 1080, 4.0))));

        let t2 = mgr.begin_bind("A7").unwrap();
        let binder = MediaBinder::new();
        let err = binder
            .load_bytes("broken.bin".into(), vec![0xFFu8; 32].into())
            .unwrap_err();
        assert!(!mgr.complete_bind(t2, Err(err)));

        assert!(!mgr.has_media("A7"));
        let spec = PlaneRegistry::new().get("A7").unwrap();
        assert_eq!(
            mgr.backend().surface(s).unwrap().material,
            Some(Material::Tint(spec.display_color))
        );
        assert_eq!(mgr.backend().live_texture_count(), 0);
    }

    #[tokio::test]
    async fn test_bind_media_end_to_end() {
        let mut mgr = manager();
        proxy(&mut mgr, "B2");
        let source = MediaSource::upload("upload.mp4", sample_movie(2880, 1620, 12.0));
        assert!(mgr.bind_media("B2", source).await);
        assert_eq!(mgr.bound_source("B2"), Some("upload.mp4"));
    }

    #[tokio::test]
    async fn test_bind_media_unknown_plane_reports_failure() {
        let mut mgr = manager();
        let source = MediaSource::upload("x.mp4", sample_movie(640, 480, 1.0));
        assert!(!mgr.bind_media("GHOST", source).await);
    }

    #[tokio::test]
    async fn test_bind_matching_isolates_failures() {
        let mut mgr = manager();
        proxy(&mut mgr, "A7");
        proxy(&mut mgr, "HALO");

        let sources = vec![
            MediaSource::upload("media/a7.mp4", sample_movie(1728, 1080, 4.0)),
            // Matches a plane but fails to probe.
            MediaSource::upload("HALO.mov", vec![0u8; 3]),
            // Matches nothing.
            MediaSource::upload("lobby.mp4", sample_movie(640, 480, 1.0)),
        ];
        assert_eq!(mgr.bind_matching(sources).await, 1);
        assert!(mgr.has_media("A7"));
        assert!(!mgr.has_media("HALO"));
    }

    #[test]
    fn test_mode_switch_round_trip_keeps_media() {
        let mut mgr = manager();
        let s2d = proxy(&mut mgr, "A7");
        let s3d = mgr
            .backend_mut()
            .create_plane_proxy("A7", &unit_layout(), [0.0; 3]);
        assert!(mgr.register_surfaces("A7", vec![s3d], RenderMode::ThreeD));

        // Bind while in 2D.
        let ticket = mgr.begin_bind("A7").unwrap();
        assert!(mgr.complete_bind(ticket, Ok(loaded("clip.mp4", 1728, 1080, 6.0))));

        mgr.switch_mode(RenderMode::ThreeD);
        mgr.switch_mode(RenderMode::TwoD);
        mgr.switch_mode(RenderMode::ThreeD);

        assert!(mgr.has_media("A7"), "mode switches never clear media");
        let record = mgr.backend().surface(s3d).unwrap();
        assert!(record.visible);
        assert!(
            matches!(record.material, Some(Material::Video { .. })),
            "3D surface shows the media bound while 2D was active"
        );
        let record_2d = mgr.backend().surface(s2d).unwrap();
        assert!(!record_2d.visible, "outgoing mode surfaces hidden");
    }

    #[test]
    fn test_switch_mode_same_target_is_noop() {
        let mut mgr = manager();
        let s = proxy(&mut mgr, "A7");
        mgr.switch_mode(RenderMode::TwoD);
        assert_eq!(mgr.mode(), RenderMode::TwoD);
        assert!(mgr.backend().surface(s).unwrap().visible);
    }

    #[test]
    fn test_highlight_moves_composite_as_a_unit() {
        let mut mgr = manager();
        let h1 = proxy(&mut mgr, "HALO");
        let h2 = proxy(&mut mgr, "HALO");
        let other = proxy(&mut mgr, "A1");

        mgr.highlight("HALO");
        assert_eq!(
            mgr.backend().surface(h1).unwrap().emphasis,
            Emphasis::Highlighted
        );
        assert_eq!(
            mgr.backend().surface(h2).unwrap().emphasis,
            Emphasis::Highlighted
        );
        assert_eq!(
            mgr.backend().surface(other).unwrap().emphasis,
            Emphasis::Dimmed
        );

        mgr.reset_highlight();
        for s in [h1, h2, other] {
            assert_eq!(mgr.backend().surface(s).unwrap().emphasis, Emphasis::Normal);
        }
    }

    #[test]
    fn test_unregister_mode_drops_surfaces_keeps_media() {
        let mut mgr = manager();
        proxy(&mut mgr, "A7");
        let s3d = mgr
            .backend_mut()
            .create_plane_proxy("A7", &unit_layout(), [0.0; 3]);
        assert!(mgr.register_surfaces("A7", vec![s3d], RenderMode::ThreeD));

        let ticket = mgr.begin_bind("A7").unwrap();
        assert!(mgr.complete_bind(ticket, Ok(loaded("clip.mp4", 1728, 1080, 6.0))));

        mgr.unregister_mode(RenderMode::ThreeD);
        assert!(mgr.surfaces_for("A7", RenderMode::ThreeD).is_empty());
        assert!(mgr.backend().surface(s3d).is_none(), "removed from scene");
        assert!(mgr.has_media("A7"), "media survives the surface swap");

        // Identity crop for matching ratios on the replacement mesh.
        let crop = compute_crop(1728.0 / 1080.0, 1728.0 / 1080.0, "A7");
        assert_eq!(crop, UvCrop::IDENTITY);
    }
}
