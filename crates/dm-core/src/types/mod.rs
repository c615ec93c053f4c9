//! Domain types for dotmeta.
//!
//! # Module Organization
//!
//! - `kind` - the closed set of artifact kinds
//! - `reference` - solution projects, project references, package lists
//! - `assembly` - assembly versions and descriptive attributes
//! - `manifest` - NuGet manifest and package archive contents
//!
//! All public types are re-exported here and at the crate root:
//!
//! ```
//! use dm_core::{ArtifactKind, ReferenceEntry, PackageManifest};
//! ```

mod assembly;
mod kind;
mod manifest;
mod reference;

pub use assembly::{AssemblyMetadata, AssemblyVersion, attribute_field};
pub use kind::ArtifactKind;
pub use manifest::{
    DependencyGroup, FrameworkAssembly, ManifestDependency, ManifestFile, ManifestMetadata,
    PackageArchive, PackageManifest,
};
pub use reference::{PackageRequirement, ProjectEntry, ReferenceEntry, SolutionReferences};
