//! `.nupkg` package archive reader.
//!
//! A package is an OPC zip: the manifest sits at the archive root and the
//! remaining parts are the package's payload. OPC bookkeeping parts are not
//! reported.

use std::fs::File;
use std::io::{Read, Seek};

use camino::Utf8Path;
use dm_core::{ArtifactKind, ManifestConfig, MetadataError, PackageArchive};
use tracing::{debug, info};
use zip::ZipArchive;

use super::nuspec::{ManifestError, parse_manifest};
use crate::provider::{LoadSlot, MetadataProvider};

/// Part name prefixes that belong to the packaging format, not the package.
const BOOKKEEPING_PREFIXES: [&str; 3] = ["[Content_Types].xml", "_rels/", "package/services/"];

/// Errors produced while reading a package archive.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// The file cannot be opened.
    #[error("cannot open package: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a readable zip archive.
    #[error("invalid package archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// No `.nuspec` at the archive root.
    #[error("package contains no manifest")]
    NoManifest,

    /// The embedded manifest is not UTF-8.
    #[error("manifest {0} is not valid UTF-8")]
    Encoding(String),

    /// The embedded manifest cannot be parsed.
    #[error("invalid manifest {name}: {source}")]
    Manifest {
        /// Part name of the manifest.
        name: String,
        /// Why it failed.
        source: ManifestError,
    },
}

/// Reader for `.nupkg` package archives.
#[derive(Debug, Default)]
pub struct NupkgProvider {
    config: ManifestConfig,
    slot: LoadSlot<PackageArchive>,
}

impl NupkgProvider {
    /// Creates an unloaded reader with default manifest validation rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unloaded reader with custom manifest validation rules.
    #[must_use]
    pub fn with_config(config: ManifestConfig) -> Self {
        Self {
            config,
            slot: LoadSlot::default(),
        }
    }

    /// The loaded package, if [`load`](MetadataProvider::load) succeeded.
    pub fn package(&self) -> Option<&PackageArchive> {
        self.slot.get()
    }
}

impl MetadataProvider for NupkgProvider {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::PackageArchive
    }

    fn load(&mut self, path: &Utf8Path) -> Result<(), MetadataError> {
        self.slot.ensure_empty(path)?;
        if !path.is_file() {
            return Err(MetadataError::read(path, "file does not exist"));
        }

        let package = File::open(path)
            .map_err(ArchiveError::from)
            .and_then(|file| read_package(file, &self.config))
            .map_err(|e| MetadataError::read(path, e))?;

        info!(
            path = %path,
            id = package.manifest.metadata.id.as_deref().unwrap_or_default(),
            parts = package.package_files.len(),
            "Package read"
        );
        self.slot.fill(path, package);
        Ok(())
    }

    fn to_json(&self) -> Result<String, MetadataError> {
        self.slot.render()
    }
}

/// Reads the manifest and part list of a package archive.
pub fn read_package<R: Read + Seek>(
    reader: R,
    config: &ManifestConfig,
) -> Result<PackageArchive, ArchiveError> {
    let mut archive = ZipArchive::new(reader)?;

    let mut manifest_name = None;
    let mut package_files = Vec::new();
    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_owned();

        if is_root_manifest(&name) && manifest_name.is_none() {
            manifest_name = Some((index, name));
        } else if is_bookkeeping(&name) {
            debug!(part = %name, "Skipping packaging part");
        } else {
            package_files.push(name);
        }
    }

    let (index, name) = manifest_name.ok_or(ArchiveError::NoManifest)?;
    let mut xml = String::new();
    archive
        .by_index(index)?
        .read_to_string(&mut xml)
        .map_err(|_| ArchiveError::Encoding(name.clone()))?;

    let manifest = parse_manifest(&xml, config)
        .map_err(|source| ArchiveError::Manifest { name, source })?;

    Ok(PackageArchive {
        manifest,
        package_files,
    })
}

fn is_root_manifest(name: &str) -> bool {
    !name.contains('/')
        && Utf8Path::new(name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("nuspec"))
}

fn is_bookkeeping(name: &str) -> bool {
    BOOKKEEPING_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
}
