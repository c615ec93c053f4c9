//! MSBuild project file queries.
//!
//! A project's elements are matched through a [`NamespaceScope`] chosen for
//! that document alone. Classic projects default-namespace everything into
//! the MSBuild schema; SDK-style projects declare no namespace at all.

use camino::Utf8Path;
use dm_core::{MetadataError, PackageRequirement, ReferenceEntry, SolutionConfig, join_relative};
use tracing::debug;

use crate::provider::read_file;
use crate::xml::{Element, parse_document};

/// The namespace binding in effect while one project document is queried.
///
/// The scope is derived from the document's root and dropped with it, so no
/// binding carries over from one project to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceScope<'a> {
    uri: Option<&'a str>,
}

impl<'a> NamespaceScope<'a> {
    /// Chooses the scope for a project whose root element is `root`.
    ///
    /// # Errors
    ///
    /// Returns a reason if the root is not an MSBuild `Project` element.
    pub fn for_document(root: &'a Element, config: &'a SolutionConfig) -> Result<Self, String> {
        if root.name != "Project" {
            return Err(format!("root element is '{}', expected 'Project'", root.name));
        }
        match root.namespace.as_deref() {
            Some(uri) if uri == config.msbuild_namespace => Ok(Self { uri: Some(uri) }),
            None => Ok(Self { uri: None }),
            Some(other) => Err(format!("root element is in unexpected namespace '{other}'")),
        }
    }

    /// The bound namespace, `None` for an unqualified scope.
    pub fn uri(&self) -> Option<&str> {
        self.uri
    }

    /// Iterates over children of `parent` named `name` in this scope.
    pub fn select<'e>(
        &self,
        parent: &'e Element,
        name: &'e str,
    ) -> impl Iterator<Item = &'e Element> + 'e
    where
        'a: 'e,
    {
        parent.children_named(self.uri, name)
    }

    /// The first child of `parent` named `name` in this scope.
    pub fn select_single<'e>(&self, parent: &'e Element, name: &str) -> Option<&'e Element> {
        parent.child(self.uri, name)
    }
}

/// Reads the `ItemGroup/Reference` declarations of one project.
///
/// Hint paths are resolved against the project's own directory.
///
/// # Errors
///
/// - [`MetadataError::ProjectRead`] if the file cannot be read or is not an
///   MSBuild project
/// - [`MetadataError::ReferenceParse`] if a reference has no `Include`
pub fn read_project_references(
    path: &Utf8Path,
    config: &SolutionConfig,
) -> Result<Vec<ReferenceEntry>, MetadataError> {
    let root = read_project_document(path)?;
    let scope =
        NamespaceScope::for_document(&root, config).map_err(|e| MetadataError::project_read(path, e))?;
    debug!(path = %path, namespace = ?scope.uri(), "Querying project");

    let project_dir = path.parent().unwrap_or(path);
    let mut references = Vec::new();
    for group in scope.select(&root, "ItemGroup") {
        for reference in scope.select(group, "Reference") {
            references.push(read_reference(reference, &scope, project_dir, path)?);
        }
    }
    Ok(references)
}

/// Loads a project file into an element tree.
fn read_project_document(path: &Utf8Path) -> Result<Element, MetadataError> {
    let bytes = read_file(path).map_err(|e| match e {
        MetadataError::Read { reason, .. } => MetadataError::project_read(path, reason),
        other => other,
    })?;
    let text = String::from_utf8(bytes).map_err(|e| MetadataError::project_read(path, e))?;
    parse_document(&text).map_err(|e| MetadataError::project_read(path, e))
}

fn read_reference(
    element: &Element,
    scope: &NamespaceScope<'_>,
    project_dir: &Utf8Path,
    project: &Utf8Path,
) -> Result<ReferenceEntry, MetadataError> {
    let include = element
        .attribute("Include")
        .ok_or_else(|| MetadataError::reference_parse(project, "Reference element has no Include attribute"))?;

    let entry = ReferenceEntry::new(include);
    let hint = scope
        .select_single(element, "HintPath")
        .map(Element::trimmed_text)
        .filter(|text| !text.is_empty());
    match hint {
        Some(hint) => {
            let resolved = join_relative(project_dir, hint)?;
            Ok(entry.with_hint_path(resolved))
        }
        None => Ok(entry),
    }
}

/// Reads a `packages.config` package list.
///
/// Package lists are optional during resolution: the
/// [`SolutionResolver`](super::SolutionResolver) logs and skips one that
/// fails here.
///
/// # Errors
///
/// Returns [`MetadataError::ProjectRead`] if the file cannot be read, is not
/// a `packages` document, or has a `package` without `id` or `version`.
pub fn read_package_list(path: &Utf8Path) -> Result<Vec<PackageRequirement>, MetadataError> {
    let root = read_project_document(path)?;
    if root.name != "packages" {
        return Err(MetadataError::project_read(
            path,
            format!("root element is '{}', expected 'packages'", root.name),
        ));
    }

    root.children
        .iter()
        .filter(|child| child.name == "package")
        .map(|package| {
            let id = package
                .non_empty_attribute("id")
                .ok_or_else(|| MetadataError::project_read(path, "package element has no id"))?;
            let version = package.non_empty_attribute("version").ok_or_else(|| {
                MetadataError::project_read(path, format!("package '{id}' has no version"))
            })?;
            Ok(PackageRequirement {
                id: id.to_owned(),
                version: version.to_owned(),
                target_framework: package.non_empty_attribute("targetFramework").map(str::to_owned),
            })
        })
        .collect()
}
