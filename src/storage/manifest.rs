//! Tracking manifest
//!
//! An optional `sync.yml` lists entities that detail jobs always include,
//! on top of what the stored listings already reference:
//!
//! ```yaml
//! teams:
//!   - 9565
//!   - 4608
//! events:
//!   - 7148
//! matches: []
//! ```

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SyncManifest {
    #[serde(default)]
    pub teams: Vec<u64>,
    #[serde(default)]
    pub events: Vec<u64>,
    #[serde(default)]
    pub matches: Vec<u64>,
}

impl SyncManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read manifest from YAML file
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read sync manifest: {}", path.as_ref().display())
        })?;

        // An empty file parses as YAML null
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).with_context(|| {
            format!("Failed to parse sync manifest YAML: {}", path.as_ref().display())
        })
    }

    /// Read the manifest, or an empty one when the file does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::read(path)
        } else {
            log::debug!(
                "No sync manifest at {}, tracking nothing extra",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    /// Write manifest to YAML file
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)
            .with_context(|| "Failed to serialize sync manifest to YAML")?;

        std::fs::write(path.as_ref(), yaml).with_context(|| {
            format!("Failed to write sync manifest: {}", path.as_ref().display())
        })?;

        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty() && self.events.is_empty() && self.matches.is_empty()
    }
}
