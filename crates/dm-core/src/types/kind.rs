//! Artifact kinds.
//!
//! This module provides [`ArtifactKind`], the closed set of .NET artifacts
//! dotmeta knows how to describe.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MetadataError;

/// The kind of .NET artifact a path refers to.
///
/// Each kind maps to exactly one descriptor in the provider registry.
///
/// # Examples
///
/// ```
/// use dm_core::ArtifactKind;
///
/// let kind: ArtifactKind = "solution".parse()?;
/// assert_eq!(kind, ArtifactKind::SolutionFile);
/// assert_eq!(kind.name(), "SolutionFile");
/// # Ok::<(), dm_core::MetadataError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// A compiled assembly (`.dll`).
    AssemblyBinary,
    /// An `AssemblyInfo.cs` source file.
    AssemblyInfoSource,
    /// A NuGet manifest (`.nuspec`).
    PackageManifest,
    /// A NuGet package archive (`.nupkg`).
    PackageArchive,
    /// An MSBuild C# project (`.csproj`).
    ProjectFile,
    /// A Visual Studio solution (`.sln`).
    SolutionFile,
}

impl ArtifactKind {
    /// Every kind, in default classification order.
    ///
    /// `AssemblyInfoSource` comes first because it matches on file name, which
    /// must win over any extension-based rule.
    pub const ALL: [Self; 6] = [
        Self::AssemblyInfoSource,
        Self::AssemblyBinary,
        Self::PackageManifest,
        Self::PackageArchive,
        Self::ProjectFile,
        Self::SolutionFile,
    ];

    /// Returns the canonical name of this kind.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AssemblyBinary => "AssemblyBinary",
            Self::AssemblyInfoSource => "AssemblyInfoSource",
            Self::PackageManifest => "PackageManifest",
            Self::PackageArchive => "PackageArchive",
            Self::ProjectFile => "ProjectFile",
            Self::SolutionFile => "SolutionFile",
        }
    }

    /// Returns the short alias accepted alongside the canonical name.
    #[inline]
    #[must_use]
    pub const fn alias(self) -> &'static str {
        match self {
            Self::AssemblyBinary => "AssemblyDll",
            Self::AssemblyInfoSource => "AssemblyInfo",
            Self::PackageManifest => "Nuspec",
            Self::PackageArchive => "Nupkg",
            Self::ProjectFile => "Project",
            Self::SolutionFile => "Solution",
        }
    }

    /// Looks up a kind by canonical name or alias, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|kind| {
            kind.name().eq_ignore_ascii_case(name) || kind.alias().eq_ignore_ascii_case(name)
        })
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ArtifactKind {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| MetadataError::UnknownDescriptor(s.to_owned()))
    }
}
