//! The reader contract shared by every artifact kind.
//!
//! A [`MetadataProvider`] is created by a descriptor, loaded from exactly one
//! path, and rendered to JSON once. [`LoadSlot`] holds the loaded value and
//! enforces that lifecycle for each implementation.

use camino::{Utf8Path, Utf8PathBuf};
use dm_core::{ArtifactKind, MetadataError};
use serde::Serialize;

/// A stateful reader for one artifact.
///
/// # Lifecycle
///
/// 1. Created by the descriptor that matched the path
/// 2. [`load`](Self::load) is called once with the canonical path
/// 3. [`to_json`](Self::to_json) renders what was loaded
///
/// Loading twice, or rendering before a successful load, is a
/// [`MetadataError::Read`]. A failed load leaves the reader unloaded.
pub trait MetadataProvider: std::fmt::Debug {
    /// The artifact kind this reader was registered for.
    fn kind(&self) -> ArtifactKind;

    /// Reads the artifact at `path`.
    fn load(&mut self, path: &Utf8Path) -> Result<(), MetadataError>;

    /// Renders the loaded metadata as a pretty-printed JSON object.
    fn to_json(&self) -> Result<String, MetadataError>;
}

/// Storage for a reader's loaded value.
#[derive(Debug)]
pub(crate) struct LoadSlot<T> {
    loaded: Option<(Utf8PathBuf, T)>,
}

impl<T> Default for LoadSlot<T> {
    fn default() -> Self {
        Self { loaded: None }
    }
}

impl<T: Serialize> LoadSlot<T> {
    /// Fails if a value was already loaded.
    pub(crate) fn ensure_empty(&self, path: &Utf8Path) -> Result<(), MetadataError> {
        match &self.loaded {
            Some((previous, _)) => Err(MetadataError::read(
                path,
                format!("reader was already loaded from {previous}"),
            )),
            None => Ok(()),
        }
    }

    /// Stores the value loaded from `path`.
    pub(crate) fn fill(&mut self, path: &Utf8Path, value: T) {
        self.loaded = Some((path.to_owned(), value));
    }

    /// Returns the loaded value, if any.
    pub(crate) fn get(&self) -> Option<&T> {
        self.loaded.as_ref().map(|(_, value)| value)
    }

    /// Serializes the loaded value.
    pub(crate) fn render(&self) -> Result<String, MetadataError> {
        let Some((_, value)) = &self.loaded else {
            return Err(MetadataError::read(
                Utf8PathBuf::new(),
                "metadata requested before the reader was loaded",
            ));
        };
        Ok(serde_json::to_string_pretty(value)?)
    }
}

/// Reads a whole file, mapping failures to [`MetadataError::Read`].
pub(crate) fn read_file(path: &Utf8Path) -> Result<Vec<u8>, MetadataError> {
    if !path.is_file() {
        return Err(MetadataError::read(path, "file does not exist"));
    }
    std::fs::read(path).map_err(|e| MetadataError::read(path, e))
}
