//! Application shell
//!
//! Wires the pieces into one façade: builds the 2D proxy grid at startup,
//! resolves the venue model lazily on first 3D entry, owns the persisted
//! preferences, and forwards binding and transport calls to the manager.

use std::path::PathBuf;

use crate::binding::{PlaneBindingManager, PlaybackSummary};
use crate::media::{MediaBinder, MediaSource};
use crate::model::{AssetError, ModelAssetResolver};
use crate::planes::{compute_layout, PlaneRegistry};
use crate::settings::Preferences;
use crate::surface::{Material, RenderMode, SurfaceBackend, SurfaceId};

/// World size the largest physical dimension in the catalog scales to
const GRID_TARGET_MAX: f32 = 10.0;

/// Everything the visualizer front end talks to
pub struct ArenaShell<B: SurfaceBackend> {
    manager: PlaneBindingManager<B>,
    resolver: ModelAssetResolver,
    preferences: Preferences,
    preferences_path: Option<PathBuf>,
    /// Model version whose meshes are currently instantiated, if any
    instantiated_version: Option<u32>,
    /// Decorative override meshes; 3D-only, outside the binding manager
    decor_surfaces: Vec<SurfaceId>,
}

impl<B: SurfaceBackend> ArenaShell<B> {
    /// Build the shell: load preferences, create the 2D proxy grid, and
    /// start in 2D. The model asset is not touched until 3D is entered.
    ///
    /// `preferences_path` overrides the platform config location; `None`
    /// uses it (or skips persistence entirely when the platform has none).
    pub fn new(
        backend: B,
        model_base: impl Into<String>,
        preferences_path: Option<PathBuf>,
    ) -> Self {
        let registry = PlaneRegistry::new();
        let preferences_path = preferences_path.or_else(|| {
            Preferences::default_path()
                .map_err(|err| log::warn!("preferences unavailable: {err}"))
                .ok()
        });
        let preferences = match &preferences_path {
            Some(path) => Preferences::load_from(path),
            None => Preferences::default(),
        };

        let mut manager =
            PlaneBindingManager::new(registry.clone(), backend, MediaBinder::new());
        let layout = compute_layout(registry.list_planes(), GRID_TARGET_MAX);
        for spec in registry.list_planes() {
            if let Some(cell) = layout.get(spec.name) {
                let id = manager
                    .backend_mut()
                    .create_plane_proxy(spec.name, cell, spec.display_color);
                manager.register_surfaces(spec.name, vec![id], RenderMode::TwoD);
            }
        }

        let resolver = ModelAssetResolver::new(model_base, registry);
        Self {
            manager,
            resolver,
            preferences,
            preferences_path,
            instantiated_version: None,
            decor_surfaces: Vec::new(),
        }
    }

    /// Currently active rendering mode
    pub fn mode(&self) -> RenderMode {
        self.manager.mode()
    }

    /// Selected model version
    pub fn model_version(&self) -> u32 {
        self.preferences.model_version
    }

    /// The binding manager, for anything not forwarded here
    pub fn manager(&self) -> &PlaneBindingManager<B> {
        &self.manager
    }

    /// The binding manager, mutable
    pub fn manager_mut(&mut self) -> &mut PlaneBindingManager<B> {
        &mut self.manager
    }

    /// Switch the presentation mode.
    ///
    /// Entering 3D resolves the selected model version first if needed;
    /// on a resolution failure the mode is left unchanged so the caller
    /// stays on a working presentation.
    pub async fn switch_mode(&mut self, target: RenderMode) -> Result<(), AssetError> {
        if target == RenderMode::ThreeD {
            self.ensure_model_surfaces().await?;
        }
        self.manager.switch_mode(target);
        let in_3d = self.manager.mode() == RenderMode::ThreeD;
        for &surface in &self.decor_surfaces {
            self.manager.backend_mut().set_visible(surface, in_3d);
        }
        Ok(())
    }

    /// Select a different model version and persist the choice.
    ///
    /// With 3D surfaces instantiated, the old model is torn down and the
    /// new one registered; plane media stays bound and reattaches to the
    /// new meshes. Unsupported versions are rejected without side effects.
    pub async fn set_model_version(&mut self, version: u32) -> Result<(), AssetError> {
        if !Preferences::is_supported_version(version) {
            log::warn!("ignoring unsupported model version {version}");
            return Err(AssetError::InvalidVersion);
        }
        if version == self.preferences.model_version && self.instantiated_version.is_some() {
            return Ok(());
        }

        self.preferences.model_version = version;
        if self.instantiated_version.is_some() {
            self.teardown_model_surfaces();
            self.ensure_model_surfaces().await?;
        }
        self.persist_preferences();
        Ok(())
    }

    /// Advance playback clocks by `delta` seconds; call once per frame
    pub fn tick(&mut self, delta: f64) {
        self.manager.advance(delta);
    }

    /// Bind a media source to a plane
    pub async fn bind_media(&mut self, name: &str, source: MediaSource) -> bool {
        self.manager.bind_media(name, source).await
    }

    /// Clear a plane back to its fallback tint
    pub fn clear(&mut self, name: &str) -> bool {
        self.manager.clear(name)
    }

    /// Highlight one plane, dimming the rest
    pub fn highlight(&mut self, name: &str) {
        self.manager.highlight(name);
    }

    /// Remove any highlight
    pub fn reset_highlight(&mut self) {
        self.manager.reset_highlight();
    }

    /// Shared transport: play every bound plane
    pub fn play(&mut self) {
        self.manager.play_all();
    }

    /// Shared transport: pause every bound plane
    pub fn pause(&mut self) {
        self.manager.pause_all();
    }

    /// Shared transport: stop and rewind every bound plane
    pub fn stop(&mut self) {
        self.manager.stop_and_rewind_all();
    }

    /// Shared transport: seek every bound plane to a percentage
    pub fn seek(&mut self, percent: f64) {
        self.manager.seek_all(percent);
    }

    /// Transport snapshot for the UI
    pub fn playback_summary(&self) -> PlaybackSummary {
        self.manager.playback_summary()
    }

    /// Instantiate and register the selected model version's meshes, if not
    /// already resident.
    async fn ensure_model_surfaces(&mut self) -> Result<(), AssetError> {
        let version = self.preferences.model_version;
        if self.instantiated_version == Some(version) {
            return Ok(());
        }
        if self.instantiated_version.is_some() {
            self.teardown_model_surfaces();
        }

        let classification = self.resolver.resolve(version).await?.clone();

        let in_3d = self.manager.mode() == RenderMode::ThreeD;
        for (plane, group) in &classification.plane_meshes {
            let mut surfaces = Vec::with_capacity(group.meshes.len());
            for mesh in &group.meshes {
                let id = self.manager.backend_mut().instantiate_mesh(mesh);
                if group.composite {
                    // Identity look until media arrives; registration below
                    // replaces it when the plane is already bound.
                    self.manager
                        .backend_mut()
                        .set_material(id, &Material::CompositeIdentity);
                }
                surfaces.push(id);
            }
            self.manager
                .register_surfaces(plane, surfaces, RenderMode::ThreeD);
        }

        for (mesh, kind) in &classification.overrides {
            let id = self.manager.backend_mut().instantiate_mesh(mesh);
            self.manager
                .backend_mut()
                .set_material(id, &Material::DecorOverride(*kind));
            self.manager.backend_mut().set_visible(id, in_3d);
            self.decor_surfaces.push(id);
        }

        self.instantiated_version = Some(version);
        Ok(())
    }

    /// Drop every 3D surface. Bound media stays on its plane names.
    fn teardown_model_surfaces(&mut self) {
        self.manager.unregister_mode(RenderMode::ThreeD);
        for surface in self.decor_surfaces.drain(..) {
            self.manager.backend_mut().remove_surface(surface);
        }
        self.resolver.teardown();
        self.instantiated_version = None;
    }

    fn persist_preferences(&self) {
        let Some(path) = &self.preferences_path else {
            return;
        };
        if let Err(err) = self.preferences.save_to(path) {
            log::warn!("persisting preferences: {err}");
        }
    }
}
