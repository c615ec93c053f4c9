//! Core types, errors, and path utilities for dotmeta.
//!
//! This crate provides the foundational types shared across the workspace:
//!
//! - [`MetadataError`] - the single error taxonomy every reader reports through
//! - [`Config`] - reader settings (MSBuild namespace, manifest schema rules)
//! - [`canonicalize`] - absolute, separator-normalized path form
//! - Domain types ([`ArtifactKind`], [`ReferenceEntry`], [`PackageManifest`], ...)

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod path;
pub mod types;

pub use config::{Config, ManifestConfig, SolutionConfig};
pub use error::MetadataError;
pub use path::{canonicalize, join_relative, normalize_separators};
pub use types::{
    ArtifactKind, AssemblyMetadata, AssemblyVersion, DependencyGroup, FrameworkAssembly,
    ManifestDependency, ManifestFile, ManifestMetadata, PackageArchive, PackageManifest,
    PackageRequirement, ProjectEntry, ReferenceEntry, SolutionReferences, attribute_field,
};
