//! NuGet manifest (`.nuspec`) and package archive (`.nupkg`) readers.

mod archive;
pub mod nuspec;
mod reader;

pub use archive::{ArchiveError, NupkgProvider, read_package};
pub use nuspec::{ManifestError, ParseMode, parse_manifest, read_manifest};
pub use reader::NuspecProvider;
