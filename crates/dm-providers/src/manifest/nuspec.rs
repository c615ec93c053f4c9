//! `.nuspec` manifest parsing with a strict-then-relaxed fallback.
//!
//! [`parse_manifest`] first reads the document in [`ParseMode::Strict`],
//! which demands a known nuspec schema namespace, only known elements, and
//! the required metadata fields. If that fails it makes exactly one more
//! attempt in [`ParseMode::Relaxed`], which accepts any well-formed
//! `package` document, and marks the result `schemaValid: false`.

use dm_core::{
    DependencyGroup, FrameworkAssembly, ManifestConfig, ManifestDependency, ManifestFile,
    ManifestMetadata, PackageManifest,
};
use tracing::debug;

use crate::xml::{Element, XmlError, parse_document};

/// How strictly a manifest is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Schema namespace, element set, and required fields are enforced.
    Strict,
    /// Any well-formed `package` document is accepted.
    Relaxed,
}

/// Errors produced while reading a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// The document is not well-formed XML.
    #[error(transparent)]
    Xml(#[from] XmlError),

    /// The root element is not `package`.
    #[error("root element is '{0}', expected 'package'")]
    NotPackage(String),

    /// The root namespace is not a nuspec schema.
    #[error("namespace '{0}' is not a nuspec schema")]
    Namespace(String),

    /// The `metadata` element is missing.
    #[error("manifest has no metadata element")]
    MissingMetadata,

    /// A required metadata element is missing or blank.
    #[error("required metadata element '{0}' is missing")]
    MissingField(String),

    /// An element lacks a required attribute.
    #[error("element '{element}' requires attribute '{attribute}'")]
    MissingAttribute {
        /// The element.
        element: &'static str,
        /// The attribute it lacks.
        attribute: &'static str,
    },

    /// An element is not part of the nuspec schema.
    #[error("unexpected element '{0}'")]
    UnexpectedElement(String),

    /// A boolean element holds something other than `true` or `false`.
    #[error("element '{element}' has invalid boolean value '{value}'")]
    InvalidBoolean {
        /// The element.
        element: String,
        /// Its text.
        value: String,
    },
}

/// Parses a manifest, falling back to relaxed mode once if strict mode fails.
///
/// # Errors
///
/// Returns the relaxed attempt's error if both attempts fail.
///
/// # Examples
///
/// ```
/// use dm_core::ManifestConfig;
/// use dm_providers::parse_manifest;
///
/// // No schema namespace: strict validation fails, relaxed succeeds.
/// let manifest = parse_manifest(
///     "<package><metadata><id>Widgets</id></metadata></package>",
///     &ManifestConfig::default(),
/// )?;
/// assert_eq!(manifest.metadata.id.as_deref(), Some("Widgets"));
/// assert!(!manifest.schema_valid);
/// # Ok::<(), dm_providers::ManifestError>(())
/// ```
pub fn parse_manifest(xml: &str, config: &ManifestConfig) -> Result<PackageManifest, ManifestError> {
    let root = parse_document(xml)?;

    match read_manifest(&root, ParseMode::Strict, config) {
        Ok(manifest) => Ok(manifest),
        Err(strict) => {
            debug!(error = %strict, "Strict manifest validation failed, retrying relaxed");
            read_manifest(&root, ParseMode::Relaxed, config)
        }
    }
}

/// Reads a parsed manifest document in the given mode.
pub fn read_manifest(
    root: &Element,
    mode: ParseMode,
    config: &ManifestConfig,
) -> Result<PackageManifest, ManifestError> {
    if root.name != "package" {
        return Err(ManifestError::NotPackage(root.name.clone()));
    }

    let reader = Reader {
        mode,
        namespace: root.namespace.as_deref(),
    };
    if mode == ParseMode::Strict {
        let namespace = root.namespace.as_deref().unwrap_or_default();
        if !config.is_schema_namespace(namespace) {
            return Err(ManifestError::Namespace(namespace.to_owned()));
        }
    }

    let metadata_element = reader
        .child(root, "metadata")
        .ok_or(ManifestError::MissingMetadata)?;
    let metadata = reader.metadata(metadata_element)?;

    if mode == ParseMode::Strict {
        for field in &config.required_fields {
            if metadata.field(field).is_none_or(|v| v.trim().is_empty()) {
                return Err(ManifestError::MissingField(field.clone()));
            }
        }
        if let Some(other) = root
            .children
            .iter()
            .find(|c| !reader.matches(c, "metadata") && !reader.matches(c, "files"))
        {
            return Err(ManifestError::UnexpectedElement(other.name.clone()));
        }
    }

    let files = match reader.child(root, "files") {
        Some(files) => reader.files(files)?,
        None => Vec::new(),
    };

    Ok(PackageManifest {
        metadata,
        files,
        schema_valid: mode == ParseMode::Strict,
    })
}

/// Element matching and extraction for one parse attempt.
struct Reader<'a> {
    mode: ParseMode,
    namespace: Option<&'a str>,
}

impl Reader<'_> {
    /// Strict mode requires the root's namespace on every element.
    fn matches(&self, element: &Element, name: &str) -> bool {
        match self.mode {
            ParseMode::Strict => element.is(self.namespace, name),
            ParseMode::Relaxed => element.name == name,
        }
    }

    fn child<'e>(&self, parent: &'e Element, name: &str) -> Option<&'e Element> {
        parent.children.iter().find(|c| self.matches(c, name))
    }

    fn children<'e>(&self, parent: &'e Element, name: &'e str) -> impl Iterator<Item = &'e Element> + 'e
    where
        Self: 'e,
    {
        let mode = self.mode;
        let namespace = self.namespace;
        parent.children.iter().filter(move |c| match mode {
            ParseMode::Strict => c.namespace.as_deref() == namespace && c.name == name,
            ParseMode::Relaxed => c.name == name,
        })
    }

    /// Returns a required attribute; relaxed mode tolerates its absence.
    fn required<'e>(
        &self,
        element: &'e Element,
        element_name: &'static str,
        attribute: &'static str,
    ) -> Result<Option<&'e str>, ManifestError> {
        match (element.non_empty_attribute(attribute), self.mode) {
            (Some(value), _) => Ok(Some(value)),
            (None, ParseMode::Strict) => Err(ManifestError::MissingAttribute {
                element: element_name,
                attribute,
            }),
            (None, ParseMode::Relaxed) => Ok(None),
        }
    }

    fn metadata(&self, element: &Element) -> Result<ManifestMetadata, ManifestError> {
        let mut metadata = ManifestMetadata {
            min_client_version: element.non_empty_attribute("minClientVersion").map(str::to_owned),
            ..ManifestMetadata::default()
        };

        for child in &element.children {
            if self.mode == ParseMode::Strict && child.namespace.as_deref() != self.namespace {
                return Err(ManifestError::UnexpectedElement(child.name.clone()));
            }
            match child.name.as_str() {
                "dependencies" => metadata.dependency_groups = self.dependencies(child)?,
                "frameworkAssemblies" => {
                    metadata.framework_assemblies = self.framework_assemblies(child)?;
                }
                "references" => metadata.references = self.references(child)?,
                "requireLicenseAcceptance" => {
                    metadata.require_license_acceptance = self.boolean(child)?;
                }
                "developmentDependency" => metadata.development_dependency = self.boolean(child)?,
                name => match metadata.field_mut(name) {
                    Some(slot) => {
                        let text = child.trimmed_text();
                        if !text.is_empty() {
                            *slot = Some(text.to_owned());
                        }
                    }
                    None if self.mode == ParseMode::Strict => {
                        return Err(ManifestError::UnexpectedElement(name.to_owned()));
                    }
                    None => debug!(element = name, "Ignoring unknown metadata element"),
                },
            }
        }

        Ok(metadata)
    }

    fn boolean(&self, element: &Element) -> Result<Option<bool>, ManifestError> {
        let text = element.trimmed_text();
        if text.eq_ignore_ascii_case("true") {
            Ok(Some(true))
        } else if text.eq_ignore_ascii_case("false") {
            Ok(Some(false))
        } else if self.mode == ParseMode::Strict {
            Err(ManifestError::InvalidBoolean {
                element: element.name.clone(),
                value: text.to_owned(),
            })
        } else {
            Ok(None)
        }
    }

    /// Flat dependencies form one group without a target framework, listed
    /// before any explicit groups.
    fn dependencies(&self, element: &Element) -> Result<Vec<DependencyGroup>, ManifestError> {
        let mut groups = Vec::new();

        let flat = self.dependency_list(element)?;
        if !flat.is_empty() {
            groups.push(DependencyGroup {
                target_framework: None,
                dependencies: flat,
            });
        }

        for group in self.children(element, "group") {
            groups.push(DependencyGroup {
                target_framework: group.non_empty_attribute("targetFramework").map(str::to_owned),
                dependencies: self.dependency_list(group)?,
            });
        }

        Ok(groups)
    }

    fn dependency_list(&self, element: &Element) -> Result<Vec<ManifestDependency>, ManifestError> {
        let mut dependencies = Vec::new();
        for dependency in self.children(element, "dependency") {
            let Some(id) = self.required(dependency, "dependency", "id")? else {
                continue;
            };
            dependencies.push(ManifestDependency {
                id: id.to_owned(),
                version: dependency.non_empty_attribute("version").map(str::to_owned),
                include: dependency.non_empty_attribute("include").map(str::to_owned),
                exclude: dependency.non_empty_attribute("exclude").map(str::to_owned),
            });
        }
        Ok(dependencies)
    }

    fn framework_assemblies(&self, element: &Element) -> Result<Vec<FrameworkAssembly>, ManifestError> {
        let mut assemblies = Vec::new();
        for assembly in self.children(element, "frameworkAssembly") {
            let Some(name) = self.required(assembly, "frameworkAssembly", "assemblyName")? else {
                continue;
            };
            assemblies.push(FrameworkAssembly {
                assembly_name: name.to_owned(),
                target_framework: assembly.non_empty_attribute("targetFramework").map(str::to_owned),
            });
        }
        Ok(assemblies)
    }

    /// Grouped references are flattened.
    fn references(&self, element: &Element) -> Result<Vec<String>, ManifestError> {
        let mut references = Vec::new();
        let groups = std::iter::once(element).chain(self.children(element, "group"));
        for group in groups {
            for reference in self.children(group, "reference") {
                if let Some(file) = self.required(reference, "reference", "file")? {
                    references.push(file.to_owned());
                }
            }
        }
        Ok(references)
    }

    fn files(&self, element: &Element) -> Result<Vec<ManifestFile>, ManifestError> {
        let mut files = Vec::new();
        for file in self.children(element, "file") {
            let Some(src) = self.required(file, "file", "src")? else {
                continue;
            };
            files.push(ManifestFile {
                src: src.to_owned(),
                target: file.non_empty_attribute("target").map(str::to_owned),
                exclude: file.non_empty_attribute("exclude").map(str::to_owned),
            });
        }
        Ok(files)
    }
}
