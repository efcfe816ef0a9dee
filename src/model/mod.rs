//! Versioned venue model resolution
//!
//! The 3D presentation is backed by an authored glTF asset published in
//! numbered versions. Resolution fetches the version's file, walks its mesh
//! hierarchy, and classifies every mesh by naming convention. At most one
//! resolved version is resident at a time.

mod classify;

pub use classify::{
    classify_mesh, classify_meshes, ClassificationResult, MeshBinding, MeshClass, PlaneMeshes,
    COMPOSITE_FIXED, COMPOSITE_PREFIXES,
};

use thiserror::Error;

use crate::fetch::{fetch_bytes, FetchError};
use crate::planes::PlaneRegistry;

/// Why a model asset version could not be resolved.
///
/// Unlike media load failures, these surface to the caller as hard errors:
/// without a resolved asset the 3D presentation cannot function and the
/// caller must pick a fallback (typically staying in 2D).
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("model version must be a positive integer")]
    InvalidVersion,
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("parsing model asset: {0}")]
    Parse(#[from] gltf::Error),
}

/// Filename for a model version, zero-padded per the publishing convention
pub fn asset_file_name(version: u32) -> String {
    format!("arena_v{version:03}.glb")
}

/// Resolves versioned model assets into mesh classifications
#[derive(Debug)]
pub struct ModelAssetResolver {
    /// Base location the versioned filenames are joined to (path or URL)
    base: String,
    registry: PlaneRegistry,
    client: reqwest::Client,
    current: Option<ClassificationResult>,
}

impl ModelAssetResolver {
    /// Create a resolver rooted at a base path or URL
    pub fn new(base: impl Into<String>, registry: PlaneRegistry) -> Self {
        Self {
            base: base.into(),
            registry,
            client: reqwest::Client::new(),
            current: None,
        }
    }

    /// The currently resident classification, if any
    pub fn current(&self) -> Option<&ClassificationResult> {
        self.current.as_ref()
    }

    /// Full location of a version's asset file
    pub fn asset_location(&self, version: u32) -> String {
        let base = self.base.trim_end_matches('/');
        format!("{}/{}", base, asset_file_name(version))
    }

    /// Resolve a model version.
    ///
    /// Re-resolving the resident version returns it without teardown or
    /// re-parsing. Otherwise the resident classification is torn down
    /// first, then the new asset is fetched and classified. Overlapping
    /// resolutions cannot be issued: the exclusive borrow serializes them.
    pub async fn resolve(&mut self, version: u32) -> Result<&ClassificationResult, AssetError> {
        if version == 0 {
            return Err(AssetError::InvalidVersion);
        }

        if self
            .current
            .as_ref()
            .is_some_and(|c| c.version == version)
        {
            log::debug!("model v{version} already resident");
            return Ok(self.current.as_ref().expect("checked above"));
        }

        self.teardown();

        let location = self.asset_location(version);
        log::info!("resolving model asset v{version} from {location}");
        let data = fetch_bytes(&self.client, &location).await?;
        let meshes = walk_asset(&data)?;
        let result = classify_meshes(version, meshes, &self.registry);

        Ok(self.current.insert(result))
    }

    /// Discard the resident classification.
    ///
    /// The caller is responsible for removing any surfaces it instantiated
    /// from the old classification; their mesh bindings are invalid after
    /// this returns.
    pub fn teardown(&mut self) {
        if let Some(old) = self.current.take() {
            log::info!(
                "tearing down model v{} ({} bound meshes)",
                old.version,
                old.bound_mesh_count()
            );
        }
    }
}

/// Walk a glTF asset's node tree, collecting every node that carries a mesh.
fn walk_asset(data: &[u8]) -> Result<Vec<MeshBinding>, gltf::Error> {
    let gltf = gltf::Gltf::from_slice(data)?;
    let mut meshes = Vec::new();
    for node in gltf.document.nodes() {
        let Some(mesh) = node.mesh() else {
            continue;
        };
        let name = node
            .name()
            .or_else(|| mesh.name())
            .map(str::to_string)
            .unwrap_or_else(|| format!("mesh_{}", mesh.index()));
        meshes.push(MeshBinding {
            node_index: node.index(),
            mesh_index: mesh.index(),
            mesh_name: name,
        });
    }
    Ok(meshes)
}


#[cfg(test)]
mod tests {
    use super::tests_support::write_model;
    use super::*;

    #[test]
    fn test_asset_file_name_zero_padded() {
        assert_eq!(asset_file_name(1), "arena_v001.glb");
        assert_eq!(asset_file_name(42), "arena_v042.glb");
    }

    #[test]
    fn test_asset_location_joins_base() {
        let resolver = ModelAssetResolver::new("/assets/models/", PlaneRegistry::new());
        assert_eq!(
            resolver.asset_location(3),
            "/assets/models/arena_v003.glb"
        );

        let remote = ModelAssetResolver::new("https://cdn.example/venue", PlaneRegistry::new());
        assert_eq!(
            remote.asset_location(3),
            "https://cdn.example/venue/arena_v003.glb"
        );
    }

    #[tokio::test]
    async fn test_resolve_rejects_version_zero() {
        let mut resolver = ModelAssetResolver::new("/assets", PlaneRegistry::new());
        assert!(matches!(
            resolver.resolve(0).await,
            Err(AssetError::InvalidVersion)
        ));
    }

    #[tokio::test]
    async fn test_resolve_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolver =
            ModelAssetResolver::new(dir.path().to_str().unwrap(), PlaneRegistry::new());
        assert!(matches!(
            resolver.resolve(1).await,
            Err(AssetError::Fetch(_))
        ));
        assert!(resolver.current().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_asset_fails_parse() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("arena_v001.glb"), b"not a model").unwrap();
        let mut resolver =
            ModelAssetResolver::new(dir.path().to_str().unwrap(), PlaneRegistry::new());
        assert!(matches!(
            resolver.resolve(1).await,
            Err(AssetError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_same_version_resolve_reuses_resident_result() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path(), 3, &["A7", "HALO_01"]);
        write_model(dir.path(), 4, &["B1"]);
        let mut resolver =
            ModelAssetResolver::new(dir.path().to_str().unwrap(), PlaneRegistry::new());

        assert_eq!(resolver.resolve(3).await.unwrap().version, 3);

        // The file is gone, so only the resident result can satisfy this.
        std::fs::remove_file(dir.path().join(asset_file_name(3))).unwrap();
        let again = resolver.resolve(3).await.unwrap();
        assert_eq!(again.version, 3);
        assert_eq!(again.plane_meshes.len(), 2);

        // A different version tears the old classification down first.
        let next = resolver.resolve(4).await.unwrap();
        assert_eq!(next.version, 4);
        assert!(next.plane_meshes.contains_key("B1"));
        assert!(!next.plane_meshes.contains_key("A7"));
        assert_eq!(resolver.current().unwrap().version, 4);
    }

    #[test]
    fn test_teardown_clears_resident() {
        let mut resolver = ModelAssetResolver::new("/assets", PlaneRegistry::new());
        resolver.current = Some(classify_meshes(3, Vec::new(), &PlaneRegistry::new()));
        resolver.teardown();
        assert!(resolver.current().is_none());
        // Idempotent.
        resolver.teardown();
    }
}
