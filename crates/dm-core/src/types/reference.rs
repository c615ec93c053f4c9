//! Solution and project reference types.
//!
//! - [`ProjectEntry`] - one project declared by a solution file
//! - [`ReferenceEntry`] - one assembly reference declared by a project
//! - [`PackageRequirement`] - one package pinned by a project's `packages.config`
//! - [`SolutionReferences`] - the merged, ordered output of a solution

use std::cmp::Ordering;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::config::SOLUTION_FOLDER_TYPE;

/// A project declared in a solution file.
///
/// Entries keep the solution's declaration order. The relative path is stored
/// exactly as written, including Windows separators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    /// Display name of the project.
    pub name: String,

    /// Path to the project file, relative to the solution's directory.
    pub relative_path: String,

    /// Project type GUID, without braces.
    pub type_guid: String,

    /// Project instance GUID, without braces.
    pub project_guid: String,
}

impl ProjectEntry {
    /// Returns `true` if this entry is a solution folder rather than a project.
    ///
    /// # Examples
    ///
    /// ```
    /// use dm_core::ProjectEntry;
    ///
    /// let folder = ProjectEntry {
    ///     name: "build".to_owned(),
    ///     relative_path: "build".to_owned(),
    ///     type_guid: "2150E333-8FDC-42A3-9474-1A3956D46DE8".to_owned(),
    ///     project_guid: "0C1C3A8E-8D4B-4E3A-9F0A-7E9D1D2B6C11".to_owned(),
    /// };
    /// assert!(folder.is_solution_folder());
    /// ```
    #[must_use]
    pub fn is_solution_folder(&self) -> bool {
        self.type_guid.eq_ignore_ascii_case(SOLUTION_FOLDER_TYPE)
    }
}

/// An assembly reference declared by a project.
///
/// Ordering and equality for sorting purposes use only [`include`](Self::include),
/// compared ordinally. Two entries with the same name from different projects
/// are still distinct records; nothing deduplicates them.
///
/// # Examples
///
/// ```
/// use dm_core::ReferenceEntry;
///
/// let entry = ReferenceEntry::new("System.Xml");
/// let json = serde_json::to_string(&entry)?;
/// assert_eq!(json, r#"{"Include":"System.Xml"}"#);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    /// Assembly or reference name (the `Include` attribute).
    #[serde(rename = "Include")]
    pub include: String,

    /// Canonical path to the referenced binary, resolved against the
    /// declaring project's own directory.
    #[serde(rename = "HintPath", skip_serializing_if = "Option::is_none", default)]
    pub hint_path: Option<Utf8PathBuf>,
}

impl ReferenceEntry {
    /// Creates a reference with no hint path.
    #[must_use]
    pub fn new(include: impl Into<String>) -> Self {
        Self {
            include: include.into(),
            hint_path: None,
        }
    }

    /// Sets the resolved hint path.
    #[must_use]
    pub fn with_hint_path(mut self, hint_path: impl Into<Utf8PathBuf>) -> Self {
        self.hint_path = Some(hint_path.into());
        self
    }

    /// Ordinal comparison on `include`, the sort key for merged output.
    #[inline]
    #[must_use]
    pub fn cmp_by_include(&self, other: &Self) -> Ordering {
        self.include.as_bytes().cmp(other.include.as_bytes())
    }
}

/// A package pinned in a project's `packages.config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRequirement {
    /// Package id.
    pub id: String,

    /// Version or version range, as written.
    pub version: String,

    /// Target framework moniker, if the entry names one.
    #[serde(
        rename = "targetFramework",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub target_framework: Option<String>,
}

/// Merged references of every project in a solution.
///
/// `references` is sorted by `include`; `packages` by `id`. Both keep
/// duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionReferences {
    /// Assembly references from every project.
    pub references: Vec<ReferenceEntry>,

    /// Package requirements from every project's package list.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub packages: Vec<PackageRequirement>,
}

impl SolutionReferences {
    /// Builds the merged output from per-project results in resolution order.
    ///
    /// The sort is stable, so entries sharing a key keep the order in which
    /// their projects were resolved.
    #[must_use]
    pub fn merge(
        references: impl IntoIterator<Item = ReferenceEntry>,
        packages: impl IntoIterator<Item = PackageRequirement>,
    ) -> Self {
        let mut references: Vec<_> = references.into_iter().collect();
        references.sort_by(ReferenceEntry::cmp_by_include);

        let mut packages: Vec<_> = packages.into_iter().collect();
        packages.sort_by(|a, b| a.id.as_bytes().cmp(b.id.as_bytes()));

        Self {
            references,
            packages,
        }
    }
}
