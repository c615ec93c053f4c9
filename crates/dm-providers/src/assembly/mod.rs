//! Assembly readers: compiled images and `AssemblyInfo.cs` sources.
//!
//! Both readers produce [`dm_core::AssemblyMetadata`]: the assembly version
//! plus the descriptive attributes it declares.
//!
//! - [`AssemblyDllProvider`] - reads ECMA-335 metadata tables from a PE image
//!   through `dotscope`
//! - [`AssemblyInfoProvider`] - parses C# source with tree-sitter

mod dll;
#[cfg(test)]
mod fixture;
mod info;

pub use dll::{AssemblyDllProvider, AssemblyError, read_assembly, read_image};
pub use info::AssemblyInfoProvider;
