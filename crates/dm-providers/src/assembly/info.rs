//! `AssemblyInfo.cs` source reader.

use camino::Utf8Path;
use dm_core::{ArtifactKind, AssemblyMetadata, AssemblyVersion, MetadataError};
use dm_cs_parser::{CsParser, ParseResult};
use tracing::{debug, info};

use crate::provider::{LoadSlot, MetadataProvider, read_file};

/// Reader for `AssemblyInfo.cs` sources.
///
/// The source must parse as C#. Its `[assembly: ...]` attributes feed the
/// same field mapping as a compiled assembly; `version` comes from
/// `AssemblyVersion` with missing or `*` components read as 0.
#[derive(Debug, Default)]
pub struct AssemblyInfoProvider {
    slot: LoadSlot<AssemblyMetadata>,
}

impl AssemblyInfoProvider {
    /// Creates an unloaded reader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The loaded metadata, if [`load`](MetadataProvider::load) succeeded.
    pub fn metadata(&self) -> Option<&AssemblyMetadata> {
        self.slot.get()
    }
}

impl MetadataProvider for AssemblyInfoProvider {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::AssemblyInfoSource
    }

    fn load(&mut self, path: &Utf8Path) -> Result<(), MetadataError> {
        self.slot.ensure_empty(path)?;
        let bytes = read_file(path)?;
        let source = String::from_utf8(bytes).map_err(|e| MetadataError::read(path, e))?;
        // Editors often save these files with a byte order mark.
        let source = source.strip_prefix('\u{feff}').unwrap_or(&source);

        let mut parser = CsParser::new().map_err(|e| MetadataError::read(path, e))?;
        let parsed = parser
            .parse(source)
            .map_err(|e| MetadataError::read(path, e))?;
        let metadata = metadata_from_source(&parsed, path)?;

        info!(
            path = %path,
            version = %metadata.version,
            attributes = metadata.attributes.len(),
            "Assembly info read"
        );
        self.slot.fill(path, metadata);
        Ok(())
    }

    fn to_json(&self) -> Result<String, MetadataError> {
        self.slot.render()
    }
}

/// Maps parsed attributes to assembly metadata.
fn metadata_from_source(parsed: &ParseResult, path: &Utf8Path) -> Result<AssemblyMetadata, MetadataError> {
    let version = match parsed.value_of("AssemblyVersion") {
        Some(text) => text
            .parse::<AssemblyVersion>()
            .map_err(|e| MetadataError::read(path, e))?,
        None => AssemblyVersion::default(),
    };

    let mut metadata = AssemblyMetadata::new(version);
    for attribute in &parsed.attributes {
        let Some(value) = attribute.value.as_deref() else {
            continue;
        };
        if !metadata.record(&attribute.name, value) {
            debug!(attribute = %attribute.name, line = attribute.line, "Attribute not reported");
        }
    }
    Ok(metadata)
}
