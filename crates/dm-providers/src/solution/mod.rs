//! Solution (`.sln`) reading and reference resolution.
//!
//! - [`sln`] - project declarations of a solution file
//! - [`msbuild`] - namespace-scoped project and package list queries
//! - [`SolutionResolver`] - drives both and merges the results

pub mod msbuild;
mod reader;
mod resolver;
pub mod sln;

pub use msbuild::{NamespaceScope, read_package_list, read_project_references};
pub use reader::SolutionProvider;
pub use resolver::SolutionResolver;
pub use sln::{SolutionError, parse_solution};
