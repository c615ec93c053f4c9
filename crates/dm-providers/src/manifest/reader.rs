//! `.nuspec` file reader.

use camino::Utf8Path;
use dm_core::{ArtifactKind, ManifestConfig, MetadataError, PackageManifest};
use tracing::{info, warn};

use super::nuspec::parse_manifest;
use crate::provider::{LoadSlot, MetadataProvider, read_file};

/// Reader for standalone `.nuspec` manifests.
#[derive(Debug, Default)]
pub struct NuspecProvider {
    config: ManifestConfig,
    slot: LoadSlot<PackageManifest>,
}

impl NuspecProvider {
    /// Creates an unloaded reader with default validation rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unloaded reader with custom validation rules.
    #[must_use]
    pub fn with_config(config: ManifestConfig) -> Self {
        Self {
            config,
            slot: LoadSlot::default(),
        }
    }

    /// The loaded manifest, if [`load`](MetadataProvider::load) succeeded.
    pub fn manifest(&self) -> Option<&PackageManifest> {
        self.slot.get()
    }
}

impl MetadataProvider for NuspecProvider {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::PackageManifest
    }

    fn load(&mut self, path: &Utf8Path) -> Result<(), MetadataError> {
        self.slot.ensure_empty(path)?;
        let bytes = read_file(path)?;
        let xml = String::from_utf8(bytes).map_err(|e| MetadataError::read(path, e))?;

        let manifest =
            parse_manifest(&xml, &self.config).map_err(|e| MetadataError::read(path, e))?;
        if !manifest.schema_valid {
            warn!(path = %path, "Manifest failed schema validation, read in relaxed mode");
        }
        info!(
            path = %path,
            id = manifest.metadata.id.as_deref().unwrap_or_default(),
            "Manifest read"
        );

        self.slot.fill(path, manifest);
        Ok(())
    }

    fn to_json(&self) -> Result<String, MetadataError> {
        self.slot.render()
    }
}
