//! Artifact classification and metadata readers for dotmeta.
//!
//! A path is classified by the first [`Descriptor`] whose predicate accepts
//! it; the descriptor creates a [`MetadataProvider`] which is loaded once and
//! rendered to JSON once.
//!
//! ```no_run
//! use camino::Utf8Path;
//! use dm_providers::Classifier;
//!
//! let path = Utf8Path::new("/src/Widgets/Widgets.sln");
//! let mut provider = Classifier::new()
//!     .classify(path)
//!     .ok_or_else(|| dm_core::MetadataError::NoMatchingDescriptor(path.to_owned()))?;
//! provider.load(path)?;
//! let json = provider.to_json()?;
//! # let _ = json;
//! # Ok::<(), dm_core::MetadataError>(())
//! ```
//!
//! # Readers
//!
//! | Kind | Reader |
//! |------|--------|
//! | `AssemblyBinary`, `ProjectFile` | [`AssemblyDllProvider`] |
//! | `AssemblyInfoSource` | [`AssemblyInfoProvider`] |
//! | `PackageManifest` | [`NuspecProvider`] |
//! | `PackageArchive` | [`NupkgProvider`] |
//! | `SolutionFile` | [`SolutionProvider`] |

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod assembly;
pub mod manifest;
mod provider;
pub mod registry;
pub mod solution;
pub mod xml;

pub use assembly::{AssemblyDllProvider, AssemblyInfoProvider};
pub use manifest::{ManifestError, NupkgProvider, NuspecProvider, ParseMode, parse_manifest};
pub use provider::MetadataProvider;
pub use registry::{Classifier, DESCRIPTORS, Descriptor};
pub use solution::{SolutionProvider, SolutionResolver};
