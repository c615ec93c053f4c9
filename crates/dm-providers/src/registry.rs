//! Static descriptor registry and the artifact classifier.
//!
//! Each [`Descriptor`] pairs a path predicate with a reader factory. The
//! registry is a fixed table built at compile time; a [`Classifier`] is an
//! ordered selection from it plus the [`Config`] every reader it creates is
//! built with.
//!
//! # Usage
//!
//! ```
//! use camino::Utf8Path;
//! use dm_core::ArtifactKind;
//! use dm_providers::Classifier;
//!
//! let classifier = Classifier::new();
//! assert_eq!(
//!     classifier.find_kind(Utf8Path::new("/src/Widgets/Widgets.sln")),
//!     Some(ArtifactKind::SolutionFile)
//! );
//!
//! // Only the named kinds, tried in the given order.
//! let nuget_only = Classifier::with_kinds(["nuspec", "Nupkg"])?;
//! assert_eq!(nuget_only.find_kind(Utf8Path::new("/src/Widgets.sln")), None);
//! # Ok::<(), dm_core::MetadataError>(())
//! ```

use camino::Utf8Path;
use dm_core::{ArtifactKind, Config, MetadataError};
use smallvec::SmallVec;
use tracing::debug;

use crate::assembly::{AssemblyDllProvider, AssemblyInfoProvider};
use crate::manifest::{NupkgProvider, NuspecProvider};
use crate::provider::MetadataProvider;
use crate::solution::SolutionProvider;

/// File name that identifies an assembly-info source, compared exactly.
pub const ASSEMBLY_INFO_FILE: &str = "AssemblyInfo.cs";

/// A path predicate paired with the factory for the reader it selects.
#[derive(Clone, Copy)]
pub struct Descriptor {
    /// The kind this descriptor classifies.
    pub kind: ArtifactKind,

    matches: fn(&Utf8Path) -> bool,
    create: fn(&Config) -> Box<dyn MetadataProvider>,
}

impl Descriptor {
    /// Returns the registered descriptor for `kind`.
    #[must_use]
    pub fn for_kind(kind: ArtifactKind) -> &'static Self {
        match kind {
            ArtifactKind::AssemblyInfoSource => &DESCRIPTORS[0],
            ArtifactKind::AssemblyBinary => &DESCRIPTORS[1],
            ArtifactKind::PackageManifest => &DESCRIPTORS[2],
            ArtifactKind::PackageArchive => &DESCRIPTORS[3],
            ArtifactKind::ProjectFile => &DESCRIPTORS[4],
            ArtifactKind::SolutionFile => &DESCRIPTORS[5],
        }
    }

    /// Returns `true` if this descriptor accepts `path`.
    #[inline]
    pub fn check_path(&self, path: &Utf8Path) -> bool {
        (self.matches)(path)
    }

    /// Creates a fresh, unloaded reader configured from `config`.
    #[inline]
    pub fn create_provider(&self, config: &Config) -> Box<dyn MetadataProvider> {
        (self.create)(config)
    }
}

impl std::fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Descriptor")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Every descriptor, in default classification order.
pub static DESCRIPTORS: [Descriptor; 6] = [
    Descriptor {
        kind: ArtifactKind::AssemblyInfoSource,
        matches: is_assembly_info,
        create: create_assembly_info,
    },
    Descriptor {
        kind: ArtifactKind::AssemblyBinary,
        matches: is_dll,
        create: create_assembly_dll,
    },
    Descriptor {
        kind: ArtifactKind::PackageManifest,
        matches: is_nuspec,
        create: create_nuspec,
    },
    Descriptor {
        kind: ArtifactKind::PackageArchive,
        matches: is_nupkg,
        create: create_nupkg,
    },
    Descriptor {
        kind: ArtifactKind::ProjectFile,
        matches: is_csproj,
        create: create_project,
    },
    Descriptor {
        kind: ArtifactKind::SolutionFile,
        matches: is_sln,
        create: create_solution,
    },
];

fn has_extension(path: &Utf8Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

fn is_assembly_info(path: &Utf8Path) -> bool {
    path.file_name() == Some(ASSEMBLY_INFO_FILE)
}

fn is_dll(path: &Utf8Path) -> bool {
    has_extension(path, "dll")
}

fn is_nuspec(path: &Utf8Path) -> bool {
    has_extension(path, "nuspec")
}

fn is_nupkg(path: &Utf8Path) -> bool {
    has_extension(path, "nupkg")
}

fn is_csproj(path: &Utf8Path) -> bool {
    has_extension(path, "csproj")
}

fn is_sln(path: &Utf8Path) -> bool {
    has_extension(path, "sln")
}

fn create_assembly_info(_: &Config) -> Box<dyn MetadataProvider> {
    Box::new(AssemblyInfoProvider::new())
}

fn create_assembly_dll(_: &Config) -> Box<dyn MetadataProvider> {
    Box::new(AssemblyDllProvider::new())
}

fn create_nuspec(config: &Config) -> Box<dyn MetadataProvider> {
    Box::new(NuspecProvider::with_config(config.manifest.clone()))
}

fn create_nupkg(config: &Config) -> Box<dyn MetadataProvider> {
    Box::new(NupkgProvider::with_config(config.manifest.clone()))
}

// Project files are routed to the compiled-assembly reader.
fn create_project(_: &Config) -> Box<dyn MetadataProvider> {
    Box::new(AssemblyDllProvider::for_kind(ArtifactKind::ProjectFile))
}

fn create_solution(config: &Config) -> Box<dyn MetadataProvider> {
    Box::new(SolutionProvider::with_config(config.solution.clone()))
}

/// An ordered set of descriptors tried against a path.
///
/// The first descriptor whose predicate accepts the path wins.
#[derive(Debug, Clone)]
pub struct Classifier {
    descriptors: SmallVec<[&'static Descriptor; 6]>,
    config: Config,
}

impl Classifier {
    /// Creates a classifier over the full registry in default order.
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptors: DESCRIPTORS.iter().collect(),
            config: Config::default(),
        }
    }

    /// Replaces the configuration readers are created with.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// The configuration readers are created with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Creates a classifier over the named kinds only, tried in the given
    /// order.
    ///
    /// Names are canonical kind names or their short aliases, matched
    /// case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::UnknownDescriptor`] for the first name that is
    /// not a known kind, regardless of whether other names would match.
    pub fn with_kinds<I, S>(names: I) -> Result<Self, MetadataError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let descriptors = names
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                ArtifactKind::from_name(name)
                    .map(Descriptor::for_kind)
                    .ok_or_else(|| MetadataError::UnknownDescriptor(name.to_owned()))
            })
            .collect::<Result<SmallVec<_>, _>>()?;

        Ok(Self {
            descriptors,
            config: Config::default(),
        })
    }

    /// The kinds this classifier tries, in order.
    pub fn kinds(&self) -> impl Iterator<Item = ArtifactKind> + '_ {
        self.descriptors.iter().map(|d| d.kind)
    }

    /// Returns the first descriptor accepting `path`.
    pub fn find_descriptor(&self, path: &Utf8Path) -> Option<&'static Descriptor> {
        let found = self
            .descriptors
            .iter()
            .copied()
            .find(|descriptor| descriptor.check_path(path));

        match found {
            Some(descriptor) => debug!(path = %path, kind = %descriptor.kind, "Descriptor matched"),
            None => debug!(path = %path, "No descriptor matched"),
        }
        found
    }

    /// Returns the kind of the first descriptor accepting `path`.
    pub fn find_kind(&self, path: &Utf8Path) -> Option<ArtifactKind> {
        self.find_descriptor(path).map(|d| d.kind)
    }

    /// Returns an unloaded reader for `path`, or `None` if no descriptor
    /// accepts it.
    pub fn classify(&self, path: &Utf8Path) -> Option<Box<dyn MetadataProvider>> {
        self.find_descriptor(path)
            .map(|descriptor| descriptor.create_provider(&self.config))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_classification() {
        let classifier = Classifier::new();
        let cases = [
            ("/repo/bin/Widgets.dll", ArtifactKind::AssemblyBinary),
            ("/repo/bin/Widgets.DLL", ArtifactKind::AssemblyBinary),
            ("/repo/Properties/AssemblyInfo.cs", ArtifactKind::AssemblyInfoSource),
            ("/repo/Widgets.nuspec", ArtifactKind::PackageManifest),
            ("/repo/Widgets.1.0.0.nupkg", ArtifactKind::PackageArchive),
            ("/repo/Widgets/Widgets.csproj", ArtifactKind::ProjectFile),
            ("/repo/Widgets.sln", ArtifactKind::SolutionFile),
            ("/repo/Widgets.SLN", ArtifactKind::SolutionFile),
        ];
        for (path, expected) in cases {
            assert_eq!(classifier.find_kind(Utf8Path::new(path)), Some(expected), "{path}");
        }
    }

    #[test]
    fn test_assembly_info_name_is_exact() {
        let classifier = Classifier::new();
        assert_eq!(classifier.find_kind(Utf8Path::new("/repo/assemblyinfo.cs")), None);
        assert_eq!(classifier.find_kind(Utf8Path::new("/repo/GlobalAssemblyInfo.cs")), None);
        assert_eq!(classifier.find_kind(Utf8Path::new("/repo/Program.cs")), None);
    }

    #[test]
    fn test_unmatched_path_is_none() {
        let classifier = Classifier::new();
        assert!(classifier.classify(Utf8Path::new("/repo/README.md")).is_none());
        assert!(classifier.classify(Utf8Path::new("/repo/dll")).is_none());
    }

    #[test]
    fn test_with_kinds_preserves_order() {
        let classifier = Classifier::with_kinds(["Solution", "nuspec", "AssemblyBinary"]).unwrap();
        let kinds: Vec<_> = classifier.kinds().collect();
        assert_eq!(
            kinds,
            vec![
                ArtifactKind::SolutionFile,
                ArtifactKind::PackageManifest,
                ArtifactKind::AssemblyBinary
            ]
        );
    }

    #[test]
    fn test_with_kinds_restricts_matching() {
        let classifier = Classifier::with_kinds(["Nuspec"]).unwrap();
        assert_eq!(
            classifier.find_kind(Utf8Path::new("/repo/Widgets.nuspec")),
            Some(ArtifactKind::PackageManifest)
        );
        assert_eq!(classifier.find_kind(Utf8Path::new("/repo/Widgets.dll")), None);
    }

    #[test]
    fn test_with_kinds_unknown_name_fails_even_if_later_matches() {
        let err = Classifier::with_kinds(["Gemfile", "AssemblyDll"]).unwrap_err();
        assert!(matches!(err, MetadataError::UnknownDescriptor(ref name) if name == "Gemfile"));
    }

    #[test]
    fn test_with_kinds_empty_name_is_unknown() {
        let err = Classifier::with_kinds(["Nuspec", ""]).unwrap_err();
        assert_eq!(err.kind(), "UnknownDescriptor");
    }

    #[test]
    fn test_project_file_uses_assembly_reader() {
        let provider = Classifier::new()
            .classify(Utf8Path::new("/repo/Widgets.csproj"))
            .unwrap();
        assert_eq!(provider.kind(), ArtifactKind::ProjectFile);
        assert!(format!("{provider:?}").contains("AssemblyDllProvider"));
    }

    #[test]
    fn test_config_reaches_created_readers() {
        let dir = tempfile::tempdir().unwrap();
        let path = camino::Utf8PathBuf::try_from(dir.path().join("Widgets.nuspec")).unwrap();
        std::fs::write(
            &path,
            r#"<package xmlns="http://schemas.microsoft.com/packaging/2013/05/nuspec.xsd">
  <metadata><id>Widgets</id><version>1.0.0</version></metadata>
</package>"#,
        )
        .unwrap();

        let schema_valid = |classifier: &Classifier| {
            let mut provider = classifier.classify(&path).unwrap();
            provider.load(&path).unwrap();
            let json: serde_json::Value = serde_json::from_str(&provider.to_json().unwrap()).unwrap();
            json["schemaValid"].clone()
        };

        assert_eq!(schema_valid(&Classifier::new()), serde_json::Value::Bool(false));

        let mut config = Config::default();
        config.manifest.required_fields = vec!["id".to_owned(), "version".to_owned()];
        let classifier = Classifier::with_kinds(["Nuspec"]).unwrap().with_config(config.clone());
        assert_eq!(classifier.config(), &config);
        assert_eq!(schema_valid(&classifier), serde_json::Value::Bool(true));
    }

    #[test]
    fn test_for_kind_round_trips() {
        for kind in ArtifactKind::ALL {
            assert_eq!(Descriptor::for_kind(kind).kind, kind);
        }
    }
}
