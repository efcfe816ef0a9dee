//! Arena Previs Library
//!
//! A previsualization core for an arena venue: named display planes, video
//! binding with aspect-correct UV cropping, a shared transport, and a
//! versioned 3D venue model.

pub mod binding;
pub mod fetch;
pub mod media;
pub mod model;
pub mod planes;
pub mod settings;
pub mod shell;
pub mod surface;
pub mod uv;

// Re-export commonly used types
pub use binding::{BindTicket, PlaneBindingManager, PlaybackSummary};
pub use media::{LoadError, MediaBinder, MediaHandle, MediaInfo, MediaSource};
pub use model::{ClassificationResult, MeshClass, ModelAssetResolver};
pub use planes::{PlaneRegistry, PlaneSpec};
pub use settings::Preferences;
pub use shell::ArenaShell;
pub use surface::{MemoryBackend, RenderMode, SurfaceBackend};
pub use uv::{compute_crop, UvCrop};
