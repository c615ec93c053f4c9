//! Compiled assembly reader.
//!
//! Loads a managed PE image with `dotscope` and reads the assembly identity
//! version and the descriptive assembly-level attributes from its metadata
//! tables. No code is loaded or executed.

use camino::Utf8Path;
use dm_core::{ArtifactKind, AssemblyMetadata, AssemblyVersion, MetadataError, attribute_field};
use dotscope::prelude::{
    AssemblyRaw, CilObject, CodedIndex, CustomAttributeRaw, MemberRefRaw, Parser, Strings,
    TableId, TablesHeader, TypeDefRaw, TypeRefRaw,
};
use tracing::{debug, info};

use crate::provider::{LoadSlot, MetadataProvider, read_file};

/// Namespaces whose attributes are reported.
const ATTRIBUTE_NAMESPACES: [&str; 2] = ["System.Reflection", "System.Runtime.InteropServices"];

/// Errors reading assembly metadata from an image.
#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    /// The bytes are not a managed PE image.
    #[error("not a managed assembly: {0}")]
    Image(#[source] dotscope::Error),

    /// A metadata heap index does not resolve.
    #[error("malformed metadata: {0}")]
    Metadata(#[source] dotscope::Error),

    /// A metadata stream the reader needs is absent.
    #[error("metadata has no {0} stream")]
    MissingStream(&'static str),

    /// The image is a module without an assembly manifest.
    #[error("image has no Assembly table row")]
    NoAssembly,
}

/// Reader for compiled `.dll` assemblies.
///
/// Also registered for project files, which it cannot read: a project is XML,
/// not a PE image, so loading one fails with [`MetadataError::Read`].
#[derive(Debug)]
pub struct AssemblyDllProvider {
    kind: ArtifactKind,
    slot: LoadSlot<AssemblyMetadata>,
}

impl AssemblyDllProvider {
    /// Creates an unloaded reader for compiled assemblies.
    #[must_use]
    pub fn new() -> Self {
        Self::for_kind(ArtifactKind::AssemblyBinary)
    }

    /// Creates an unloaded reader registered under `kind`.
    #[must_use]
    pub fn for_kind(kind: ArtifactKind) -> Self {
        Self {
            kind,
            slot: LoadSlot::default(),
        }
    }

    /// The loaded metadata, if [`load`](MetadataProvider::load) succeeded.
    pub fn metadata(&self) -> Option<&AssemblyMetadata> {
        self.slot.get()
    }
}

impl Default for AssemblyDllProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataProvider for AssemblyDllProvider {
    fn kind(&self) -> ArtifactKind {
        self.kind
    }

    fn load(&mut self, path: &Utf8Path) -> Result<(), MetadataError> {
        self.slot.ensure_empty(path)?;
        let image = read_file(path)?;
        let metadata = read_image(image).map_err(|e| MetadataError::read(path, e))?;

        info!(
            path = %path,
            version = %metadata.version,
            attributes = metadata.attributes.len(),
            "Assembly metadata read"
        );
        self.slot.fill(path, metadata);
        Ok(())
    }

    fn to_json(&self) -> Result<String, MetadataError> {
        self.slot.render()
    }
}

/// Loads a PE image and reads its assembly metadata.
pub fn read_image(image: Vec<u8>) -> Result<AssemblyMetadata, AssemblyError> {
    let assembly = CilObject::from_mem(image).map_err(AssemblyError::Image)?;
    read_assembly(&assembly)
}

/// Reads the version and reported attributes of a loaded assembly.
pub fn read_assembly(assembly: &CilObject) -> Result<AssemblyMetadata, AssemblyError> {
    let tables = assembly.tables().ok_or(AssemblyError::MissingStream("#~"))?;
    let row = tables
        .table::<AssemblyRaw>(TableId::Assembly)
        .and_then(|table| table.get(1))
        .ok_or(AssemblyError::NoAssembly)?;
    let version = AssemblyVersion::new(
        row.major_version as u16,
        row.minor_version as u16,
        row.build_number as u16,
        row.revision_number as u16,
    );
    let mut metadata = AssemblyMetadata::new(version);

    let Some(attributes) = tables.table::<CustomAttributeRaw>(TableId::CustomAttribute) else {
        return Ok(metadata);
    };
    let strings = assembly.strings().ok_or(AssemblyError::MissingStream("#Strings"))?;
    let blobs = assembly.blob().ok_or(AssemblyError::MissingStream("#Blob"))?;

    for attribute in attributes.iter() {
        if attribute.parent.tag != TableId::Assembly {
            continue;
        }
        let Some((namespace, name)) = attribute_type(tables, strings, &attribute.constructor)?
        else {
            continue;
        };
        if !ATTRIBUTE_NAMESPACES.contains(&namespace) || attribute_field(name).is_none() {
            continue;
        }

        let blob = blobs
            .get(attribute.value as usize)
            .map_err(AssemblyError::Metadata)?;
        match first_string_argument(blob) {
            Some(value) => {
                metadata.record(name, &value);
            }
            None => debug!(attribute = name, "Attribute has no string argument"),
        }
    }

    Ok(metadata)
}

/// Resolves an attribute constructor to its declaring type's
/// (namespace, name).
fn attribute_type<'s>(
    tables: &TablesHeader<'_>,
    strings: &'s Strings<'_>,
    constructor: &CodedIndex,
) -> Result<Option<(&'s str, &'s str)>, AssemblyError> {
    let owner = match constructor.tag {
        TableId::MemberRef => tables
            .table::<MemberRefRaw>(TableId::MemberRef)
            .and_then(|table| table.get(constructor.row))
            .map(|member| (member.class.tag, member.class.row)),
        TableId::MethodDef => {
            owning_type(tables, constructor.row).map(|row| (TableId::TypeDef, row))
        }
        _ => None,
    };

    let names = match owner {
        Some((TableId::TypeRef, row)) => tables
            .table::<TypeRefRaw>(TableId::TypeRef)
            .and_then(|table| table.get(row))
            .map(|r| (r.type_namespace, r.type_name)),
        Some((TableId::TypeDef, row)) => tables
            .table::<TypeDefRaw>(TableId::TypeDef)
            .and_then(|table| table.get(row))
            .map(|r| (r.type_namespace, r.type_name)),
        _ => None,
    };
    let Some((namespace, name)) = names else {
        return Ok(None);
    };

    let namespace = strings
        .get(namespace as usize)
        .map_err(AssemblyError::Metadata)?;
    let name = strings.get(name as usize).map_err(AssemblyError::Metadata)?;
    Ok(Some((namespace, name)))
}

/// Finds the `TypeDef` whose method list contains `method`.
fn owning_type(tables: &TablesHeader<'_>, method: u32) -> Option<u32> {
    let types = tables.table::<TypeDefRaw>(TableId::TypeDef)?;
    types
        .iter()
        .take_while(|row| row.method_list <= method)
        .last()
        .map(|row| row.rid)
}

/// Decodes the first fixed argument of a custom attribute blob as a string.
///
/// Returns `None` for a missing prolog, a null string, or invalid UTF-8.
fn first_string_argument(blob: &[u8]) -> Option<String> {
    let mut parser = Parser::new(blob);
    if parser.read_le::<u16>().ok()? != 0x0001 || parser.peek_byte().ok()? == 0xFF {
        return None;
    }
    let length = parser.read_compressed_uint().ok()? as usize;
    let start = parser.pos();
    let bytes = blob.get(start..start.checked_add(length)?)?;
    std::str::from_utf8(bytes).ok().map(str::to_owned)
}
