//! `.sln` reader.

use camino::Utf8Path;
use dm_core::{ArtifactKind, MetadataError, SolutionConfig, SolutionReferences};

use super::resolver::SolutionResolver;
use crate::provider::{LoadSlot, MetadataProvider};

/// Reader for solution files. Loading drives a [`SolutionResolver`].
#[derive(Debug, Default)]
pub struct SolutionProvider {
    resolver: SolutionResolver,
    slot: LoadSlot<SolutionReferences>,
}

impl SolutionProvider {
    /// Creates an unloaded reader with default resolution settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unloaded reader with custom resolution settings.
    #[must_use]
    pub fn with_config(config: SolutionConfig) -> Self {
        Self {
            resolver: SolutionResolver::new(config),
            slot: LoadSlot::default(),
        }
    }

    /// The merged references, if [`load`](MetadataProvider::load) succeeded.
    pub fn references(&self) -> Option<&SolutionReferences> {
        self.slot.get()
    }
}

impl MetadataProvider for SolutionProvider {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::SolutionFile
    }

    fn load(&mut self, path: &Utf8Path) -> Result<(), MetadataError> {
        self.slot.ensure_empty(path)?;
        let merged = self.resolver.resolve(path)?;
        self.slot.fill(path, merged);
        Ok(())
    }

    fn to_json(&self) -> Result<String, MetadataError> {
        self.slot.render()
    }
}
