//! Persisted user preferences
//!
//! A small XML document in the platform config directory. Currently holds
//! one durable choice: which venue model version to present. Unreadable or
//! out-of-range values fall back to the default instead of failing startup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest model version with a published asset
pub const SUPPORTED_MODEL_VERSIONS: u32 = 4;

/// Model version used until the user picks another
pub const DEFAULT_MODEL_VERSION: u32 = 1;

const APP_DIR: &str = "ArenaPrevis";
const FILE_NAME: &str = "preferences.xml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("preferences io: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoding preferences: {0}")]
    Encode(#[from] quick_xml::SeError),
    #[error("no platform config directory available")]
    NoConfigDir,
}

/// Durable user choices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "Preferences", default)]
pub struct Preferences {
    /// Selected venue model version (1-based)
    pub model_version: u32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            model_version: DEFAULT_MODEL_VERSION,
        }
    }
}

impl Preferences {
    /// Whether a model version has a published asset
    pub fn is_supported_version(version: u32) -> bool {
        (1..=SUPPORTED_MODEL_VERSIONS).contains(&version)
    }

    /// Standard preferences path in the platform config directory
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        let base = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(base.join(APP_DIR).join(FILE_NAME))
    }

    /// Load preferences from a file.
    ///
    /// A missing file, a malformed document, or an out-of-range version all
    /// yield the defaults; preferences are never allowed to block startup.
    pub fn load_from(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no preferences at {}, using defaults", path.display());
                return Self::default();
            }
            Err(err) => {
                log::warn!("reading preferences {}: {err}", path.display());
                return Self::default();
            }
        };

        let mut prefs: Self = match quick_xml::de::from_str(&text) {
            Ok(prefs) => prefs,
            Err(err) => {
                log::warn!("malformed preferences {}: {err}", path.display());
                return Self::default();
            }
        };

        if !Self::is_supported_version(prefs.model_version) {
            log::warn!(
                "preferences select unsupported model v{}, using v{DEFAULT_MODEL_VERSION}",
                prefs.model_version
            );
            prefs.model_version = DEFAULT_MODEL_VERSION;
        }
        prefs
    }

    /// Write preferences to a file, creating parent directories as needed
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let xml = quick_xml::se::to_string(self)?;
        std::fs::write(path, xml)?;
        log::debug!("saved preferences to {}", path.display());
        Ok(())
    }
}
