//! NuGet manifest types.
//!
//! These mirror the `package` document of a `.nuspec` file. Every optional
//! element that is absent from the source document is omitted from the JSON
//! output rather than written as `null`.

use serde::{Deserialize, Serialize};

/// A single package dependency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDependency {
    /// Dependency package id.
    pub id: String,

    /// Version range, if given.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub version: Option<String>,

    /// Comma-separated asset types to include.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub include: Option<String>,

    /// Comma-separated asset types to exclude.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub exclude: Option<String>,
}

/// Dependencies that apply to one target framework.
///
/// Flat `<dependency>` lists (without `<group>`) become a single group with
/// no target framework.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyGroup {
    /// Target framework moniker, if the group names one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target_framework: Option<String>,

    /// Dependencies in declaration order.
    pub dependencies: Vec<ManifestDependency>,
}

/// A framework assembly the package needs from the GAC.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkAssembly {
    /// Fully qualified assembly name.
    pub assembly_name: String,

    /// Target framework moniker, if given.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target_framework: Option<String>,
}

/// A `<file>` entry from the manifest's `files` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFile {
    /// Source path or glob.
    pub src: String,

    /// Destination inside the package, if given.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target: Option<String>,

    /// Exclusion glob, if given.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub exclude: Option<String>,
}

/// The `metadata` element of a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ManifestMetadata {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub min_client_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub authors: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub owners: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub release_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub copyright: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub project_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub license_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub icon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub require_license_acceptance: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub development_dependency: Option<bool>,

    /// Dependency groups in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub dependency_groups: Vec<DependencyGroup>,

    /// Framework assemblies in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub framework_assemblies: Vec<FrameworkAssembly>,

    /// Explicit assembly references (`<reference file="..."/>`).
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub references: Vec<String>,
}

impl ManifestMetadata {
    /// Returns the text value of a simple metadata element by its XML name.
    ///
    /// Used to check required fields by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "id" => &self.id,
            "version" => &self.version,
            "title" => &self.title,
            "authors" => &self.authors,
            "owners" => &self.owners,
            "description" => &self.description,
            "summary" => &self.summary,
            "releaseNotes" => &self.release_notes,
            "copyright" => &self.copyright,
            "language" => &self.language,
            "tags" => &self.tags,
            "projectUrl" => &self.project_url,
            "licenseUrl" => &self.license_url,
            "iconUrl" => &self.icon_url,
            _ => return None,
        };
        value.as_deref()
    }

    /// Returns a mutable slot for a simple metadata element by its XML name.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        let slot = match name {
            "id" => &mut self.id,
            "version" => &mut self.version,
            "title" => &mut self.title,
            "authors" => &mut self.authors,
            "owners" => &mut self.owners,
            "description" => &mut self.description,
            "summary" => &mut self.summary,
            "releaseNotes" => &mut self.release_notes,
            "copyright" => &mut self.copyright,
            "language" => &mut self.language,
            "tags" => &mut self.tags,
            "projectUrl" => &mut self.project_url,
            "licenseUrl" => &mut self.license_url,
            "iconUrl" => &mut self.icon_url,
            _ => return None,
        };
        Some(slot)
    }
}

/// A parsed `.nuspec` document.
///
/// `schema_valid` is `false` when the document only parsed after strict
/// validation failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    /// The `metadata` element.
    pub metadata: ManifestMetadata,

    /// The `files` element, if present.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub files: Vec<ManifestFile>,

    /// Whether strict schema validation succeeded.
    pub schema_valid: bool,
}

/// A `.nupkg` archive: its manifest plus the parts it ships.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageArchive {
    /// The embedded manifest.
    #[serde(flatten)]
    pub manifest: PackageManifest,

    /// Package part names in archive order, excluding packaging bookkeeping.
    pub package_files: Vec<String>,
}
