//! Configuration structures for the metadata readers.
//!
//! - [`SolutionConfig`] - how solutions and their member projects are resolved
//! - [`ManifestConfig`] - what strict nuspec validation demands
//! - [`Config`] - root configuration combining both, handed to the
//!   classifier that constructs every reader
//!
//! The CLI never reads configuration from disk; it classifies with
//! `Config::default()`. Library callers build readers with non-default
//! settings by passing their own [`Config`]. All of these types implement
//! [`Default`] with the values MSBuild and NuGet use.

use serde::{Deserialize, Serialize};

/// The namespace MSBuild project files declare on their root element.
pub const MSBUILD_NAMESPACE: &str = "http://schemas.microsoft.com/developer/msbuild/2003";

/// Project type GUID Visual Studio writes for solution folders.
pub const SOLUTION_FOLDER_TYPE: &str = "2150E333-8FDC-42A3-9474-1A3956D46DE8";

/// Configuration for solution reference resolution.
///
/// # Examples
///
/// ```
/// use dm_core::SolutionConfig;
///
/// let config = SolutionConfig::default();
/// assert_eq!(config.packages_file, "packages.config");
/// assert!(config.skip_solution_folders);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolutionConfig {
    /// Namespace URI that project-file queries are scoped to.
    pub msbuild_namespace: String,

    /// File name of the per-project package list.
    pub packages_file: String,

    /// Whether solution-folder entries are skipped during resolution.
    pub skip_solution_folders: bool,
}

impl Default for SolutionConfig {
    fn default() -> Self {
        Self {
            msbuild_namespace: MSBUILD_NAMESPACE.to_owned(),
            packages_file: "packages.config".to_owned(),
            skip_solution_folders: true,
        }
    }
}

/// Configuration for nuspec manifest validation.
///
/// Strict parsing accepts only the schema namespaces listed here and demands
/// every element in [`required_fields`](Self::required_fields).
///
/// # Examples
///
/// ```
/// use dm_core::ManifestConfig;
///
/// let config = ManifestConfig::default();
/// assert!(config.is_schema_namespace(
///     "http://schemas.microsoft.com/packaging/2013/05/nuspec.xsd"
/// ));
/// assert!(!config.is_schema_namespace("urn:example"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Namespaces that identify a schema-valid nuspec document.
    pub schema_namespaces: Vec<String>,

    /// Metadata elements that must be present and non-blank in strict mode.
    pub required_fields: Vec<String>,
}

impl ManifestConfig {
    /// Returns `true` if `namespace` is one of the accepted nuspec schemas.
    #[must_use]
    pub fn is_schema_namespace(&self, namespace: &str) -> bool {
        self.schema_namespaces.iter().any(|ns| ns == namespace)
    }
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            schema_namespaces: [
                "http://schemas.microsoft.com/packaging/2010/07/nuspec.xsd",
                "http://schemas.microsoft.com/packaging/2011/08/nuspec.xsd",
                "http://schemas.microsoft.com/packaging/2011/10/nuspec.xsd",
                "http://schemas.microsoft.com/packaging/2012/06/nuspec.xsd",
                "http://schemas.microsoft.com/packaging/2013/01/nuspec.xsd",
                "http://schemas.microsoft.com/packaging/2013/05/nuspec.xsd",
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
            required_fields: ["id", "version", "authors", "description"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

/// Root configuration for dotmeta readers.
///
/// # Examples
///
/// ```
/// use dm_core::Config;
///
/// let config = Config::default();
/// let json = serde_json::to_string_pretty(&config).unwrap();
/// assert!(json.contains("packages.config"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Solution resolution settings.
    pub solution: SolutionConfig,

    /// Manifest validation settings.
    pub manifest: ManifestConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solution_config_defaults() {
        let config = SolutionConfig::default();
        assert_eq!(config.msbuild_namespace, MSBUILD_NAMESPACE);
        assert_eq!(config.packages_file, "packages.config");
        assert!(config.skip_solution_folders);
    }

    #[test]
    fn test_manifest_config_defaults() {
        let config = ManifestConfig::default();
        assert_eq!(config.schema_namespaces.len(), 6);
        assert_eq!(
            config.required_fields,
            vec!["id", "version", "authors", "description"]
        );
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let json = r#"{"solution": {"packages_file": "deps.config"}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.solution.packages_file, "deps.config");
        assert!(config.solution.skip_solution_folders);
        assert_eq!(config.manifest, ManifestConfig::default());
    }
}
