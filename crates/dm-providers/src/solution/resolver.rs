//! Solution reference resolution.
//!
//! Resolution runs in three phases, each completing before the next starts:
//!
//! 1. **Solution parse** - the `.sln` becomes an ordered list of projects
//! 2. **Per-project resolution** - each project file is opened, queried in
//!    its own namespace scope, and closed again, in declaration order
//! 3. **Merge** - every project's references are concatenated and
//!    stable-sorted by `Include`
//!
//! The first failure in any phase aborts the whole resolution. Package lists
//! are the exception: one that cannot be read is logged and skipped.

use camino::{Utf8Path, Utf8PathBuf};
use dm_core::{
    MetadataError, PackageRequirement, ProjectEntry, ReferenceEntry, SolutionConfig,
    SolutionReferences, join_relative,
};
use tracing::{debug, info, warn};

use super::msbuild::{read_package_list, read_project_references};
use super::sln::parse_solution;
use crate::provider::read_file;

/// Resolves a solution into the merged references of its projects.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use dm_core::SolutionConfig;
/// use dm_providers::SolutionResolver;
///
/// let resolver = SolutionResolver::new(SolutionConfig::default());
/// let merged = resolver.resolve(Utf8Path::new("/src/Widgets/Widgets.sln"))?;
/// for reference in &merged.references {
///     println!("{}", reference.include);
/// }
/// # Ok::<(), dm_core::MetadataError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SolutionResolver {
    config: SolutionConfig,
}

impl SolutionResolver {
    /// Creates a resolver with the given settings.
    #[must_use]
    pub fn new(config: SolutionConfig) -> Self {
        Self { config }
    }

    /// The resolver's settings.
    pub fn config(&self) -> &SolutionConfig {
        &self.config
    }

    /// Reads and parses the solution's project declarations.
    ///
    /// # Errors
    ///
    /// - [`MetadataError::Read`] if the file does not exist or cannot be read
    /// - [`MetadataError::SolutionParse`] if it is not a solution document
    pub fn parse(&self, solution: &Utf8Path) -> Result<Vec<ProjectEntry>, MetadataError> {
        let bytes = read_file(solution)?;
        let text =
            String::from_utf8(bytes).map_err(|e| MetadataError::solution_parse(solution, e))?;
        parse_solution(&text).map_err(|e| MetadataError::solution_parse(solution, e))
    }

    /// Resolves every project of `solution` and merges their references.
    ///
    /// # Errors
    ///
    /// Any error from [`parse`](Self::parse), or from reading a project.
    /// Nothing is returned for the projects that did resolve. An unreadable
    /// package list is skipped with a warning.
    pub fn resolve(&self, solution: &Utf8Path) -> Result<SolutionReferences, MetadataError> {
        let projects = self.parse(solution)?;
        let solution_dir = solution.parent().unwrap_or(solution);
        info!(path = %solution, projects = projects.len(), "Solution parsed");

        let mut references: Vec<ReferenceEntry> = Vec::new();
        let mut packages: Vec<PackageRequirement> = Vec::new();
        for entry in &projects {
            if self.config.skip_solution_folders && entry.is_solution_folder() {
                debug!(name = %entry.name, "Skipping solution folder");
                continue;
            }

            let project = project_path(solution_dir, entry)?;
            let found = read_project_references(&project, &self.config)?;
            debug!(project = %project, references = found.len(), "Project resolved");
            references.extend(found);

            let package_list = project
                .parent()
                .unwrap_or(&project)
                .join(&self.config.packages_file);
            if package_list.is_file() {
                match read_package_list(&package_list) {
                    Ok(found) => {
                        debug!(path = %package_list, packages = found.len(), "Package list read");
                        packages.extend(found);
                    }
                    Err(e) => {
                        warn!(path = %package_list, error = %e, "Skipping unreadable package list");
                    }
                }
            }
        }

        let merged = SolutionReferences::merge(references, packages);
        info!(
            path = %solution,
            references = merged.references.len(),
            packages = merged.packages.len(),
            "Solution resolved"
        );
        Ok(merged)
    }
}

/// Joins a project's recorded path onto the solution directory.
fn project_path(solution_dir: &Utf8Path, entry: &ProjectEntry) -> Result<Utf8PathBuf, MetadataError> {
    join_relative(solution_dir, &entry.relative_path).map_err(|e| {
        MetadataError::project_read(solution_dir.join(&entry.relative_path), e)
    })
}
