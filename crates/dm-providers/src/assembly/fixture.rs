//! Minimal managed PE images for reader tests.
//!
//! The builder lays out what a compiler emits for a library with no types of
//! its own: one `.text` section holding the CLI header and a metadata root
//! with `Module`, `TypeRef`, `TypeDef` (`<Module>` only), `MemberRef`,
//! `CustomAttribute`, `Assembly` and `AssemblyRef` tables. Every heap and
//! table stays small, so all indexes are two bytes wide.

use std::collections::BTreeMap;

const FILE_ALIGNMENT: u32 = 0x200;
const SECTION_ALIGNMENT: u32 = 0x2000;
const TEXT_RVA: u32 = 0x2000;
const CLI_HEADER_SIZE: u32 = 72;

const MODULE: u8 = 0x00;
const TYPE_REF: u8 = 0x01;
const TYPE_DEF: u8 = 0x02;
const MEMBER_REF: u8 = 0x0A;
const CUSTOM_ATTRIBUTE: u8 = 0x0C;
const ASSEMBLY: u8 = 0x20;
const ASSEMBLY_REF: u8 = 0x23;

/// `instance void .ctor(string)`
const STRING_CTOR_SIGNATURE: [u8; 4] = [0x20, 0x01, 0x01, 0x0E];

/// Public key token of the .NET Framework core library.
const CORLIB_TOKEN: [u8; 8] = [0xB7, 0x7A, 0x5C, 0x56, 0x19, 0x34, 0xE0, 0x89];

/// An attribute type and the string passed to its constructor.
#[derive(Clone, Copy)]
struct Attribute<'a> {
    namespace: &'a str,
    name: &'a str,
    value: &'a str,
}

/// Builds the bytes of a managed `.dll`.
pub(crate) struct ManagedImage<'a> {
    name: &'a str,
    version: [u16; 4],
    module_attributes: Vec<Attribute<'a>>,
    assembly_attributes: Vec<Attribute<'a>>,
}

impl<'a> ManagedImage<'a> {
    pub(crate) fn new(name: &'a str, version: [u16; 4]) -> Self {
        Self {
            name,
            version,
            module_attributes: Vec::new(),
            assembly_attributes: Vec::new(),
        }
    }

    /// Applies `[assembly: Name(value)]`.
    pub(crate) fn attribute(mut self, namespace: &'a str, name: &'a str, value: &'a str) -> Self {
        self.assembly_attributes.push(Attribute {
            namespace,
            name,
            value,
        });
        self
    }

    /// Applies `[module: Name(value)]`.
    pub(crate) fn module_attribute(
        mut self,
        namespace: &'a str,
        name: &'a str,
        value: &'a str,
    ) -> Self {
        self.module_attributes.push(Attribute {
            namespace,
            name,
            value,
        });
        self
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let metadata = self.metadata();
        let mut text = cli_header(TEXT_RVA + CLI_HEADER_SIZE, metadata.len() as u32);
        text.extend_from_slice(&metadata);
        pe_image(&text)
    }

    fn metadata(&self) -> Vec<u8> {
        let mut strings = StringHeap::default();
        let mut blobs = BlobHeap::default();
        let signature = blobs.add(&STRING_CTOR_SIGNATURE);
        let ctor = strings.add(".ctor");

        // Module attributes sort first: the HasCustomAttribute tag of Module
        // (7) is below that of Assembly (14).
        let attributes: Vec<(u16, Attribute<'_>)> = self
            .module_attributes
            .iter()
            .map(|a| (coded(1, 7, 5), *a))
            .chain(self.assembly_attributes.iter().map(|a| (coded(1, 14, 5), *a)))
            .collect();

        let mut type_refs = Vec::new();
        let mut member_refs = Vec::new();
        let mut custom_attributes = Vec::new();
        for (row, (parent, attribute)) in (1_u16..).zip(&attributes) {
            type_refs.push(row_bytes(&[
                Cell::U16(coded(1, 2, 2)),
                Cell::U16(strings.add(attribute.name)),
                Cell::U16(strings.add(attribute.namespace)),
            ]));
            member_refs.push(row_bytes(&[
                Cell::U16(coded(row, 1, 3)),
                Cell::U16(ctor),
                Cell::U16(signature),
            ]));
            custom_attributes.push(row_bytes(&[
                Cell::U16(*parent),
                Cell::U16(coded(row, 3, 3)),
                Cell::U16(blobs.add(&string_argument(attribute.value))),
            ]));
        }

        let module = row_bytes(&[
            Cell::U16(0),
            Cell::U16(strings.add(&format!("{}.dll", self.name))),
            Cell::U16(1),
            Cell::U16(0),
            Cell::U16(0),
        ]);
        let module_type = row_bytes(&[
            Cell::U32(0),
            Cell::U16(strings.add("<Module>")),
            Cell::U16(0),
            Cell::U16(0),
            Cell::U16(1),
            Cell::U16(1),
        ]);
        let [major, minor, build, revision] = self.version;
        let assembly = row_bytes(&[
            Cell::U32(0x8004),
            Cell::U16(major),
            Cell::U16(minor),
            Cell::U16(build),
            Cell::U16(revision),
            Cell::U32(0),
            Cell::U16(0),
            Cell::U16(strings.add(self.name)),
            Cell::U16(0),
        ]);
        let corlib = row_bytes(&[
            Cell::U16(4),
            Cell::U16(0),
            Cell::U16(0),
            Cell::U16(0),
            Cell::U32(0),
            Cell::U16(blobs.add(&CORLIB_TOKEN)),
            Cell::U16(strings.add("mscorlib")),
            Cell::U16(0),
            Cell::U16(0),
        ]);

        let mut tables = vec![
            (MODULE, vec![module]),
            (TYPE_DEF, vec![module_type]),
            (ASSEMBLY, vec![assembly]),
            (ASSEMBLY_REF, vec![corlib]),
        ];
        if !attributes.is_empty() {
            tables.push((TYPE_REF, type_refs));
            tables.push((MEMBER_REF, member_refs));
            tables.push((CUSTOM_ATTRIBUTE, custom_attributes));
        }

        let guid = [
            0x85, 0xB7, 0xE7, 0xE7, 0xAD, 0xF5, 0x40, 0xEE, 0xB5, 0x25, 0xC9, 0x16, 0xA6, 0x17,
            0x12, 0xF0,
        ];
        metadata_root(&[
            ("#~", padded(tables_stream(tables))),
            ("#Strings", padded(strings.bytes)),
            ("#US", padded(vec![0])),
            ("#GUID", guid.to_vec()),
            ("#Blob", padded(blobs.bytes)),
        ])
    }
}

/// A table cell with its on-disk width.
enum Cell {
    U16(u16),
    U32(u32),
}

fn row_bytes(cells: &[Cell]) -> Vec<u8> {
    let mut out = Vec::new();
    for cell in cells {
        match cell {
            Cell::U16(value) => out.extend_from_slice(&value.to_le_bytes()),
            Cell::U32(value) => out.extend_from_slice(&value.to_le_bytes()),
        }
    }
    out
}

/// A coded index pointing at `row` of the table tagged `tag`.
fn coded(row: u16, tag: u16, tag_bits: u32) -> u16 {
    (row << tag_bits) | tag
}

/// A custom attribute blob: prolog, one `SerString`, no named arguments.
fn string_argument(value: &str) -> Vec<u8> {
    let mut blob = vec![0x01, 0x00, value.len() as u8];
    blob.extend_from_slice(value.as_bytes());
    blob.extend_from_slice(&[0x00, 0x00]);
    blob
}

#[derive(Default)]
struct StringHeap {
    bytes: Vec<u8>,
    offsets: BTreeMap<String, u16>,
}

impl StringHeap {
    fn add(&mut self, value: &str) -> u16 {
        if self.bytes.is_empty() {
            self.bytes.push(0);
        }
        if let Some(offset) = self.offsets.get(value) {
            return *offset;
        }
        let offset = self.bytes.len() as u16;
        self.bytes.extend_from_slice(value.as_bytes());
        self.bytes.push(0);
        self.offsets.insert(value.to_owned(), offset);
        offset
    }
}

#[derive(Default)]
struct BlobHeap {
    bytes: Vec<u8>,
}

impl BlobHeap {
    /// Appends a blob shorter than 128 bytes.
    fn add(&mut self, value: &[u8]) -> u16 {
        if self.bytes.is_empty() {
            self.bytes.push(0);
        }
        let offset = self.bytes.len() as u16;
        self.bytes.push(value.len() as u8);
        self.bytes.extend_from_slice(value);
        offset
    }
}

fn padded(mut bytes: Vec<u8>) -> Vec<u8> {
    while bytes.len() % 4 != 0 {
        bytes.push(0);
    }
    bytes
}

fn align(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}

/// The `#~` stream for the given tables, which must each be non-empty.
fn tables_stream(mut tables: Vec<(u8, Vec<Vec<u8>>)>) -> Vec<u8> {
    tables.sort_by_key(|(id, _)| *id);
    let valid = tables.iter().fold(0_u64, |acc, (id, _)| acc | (1 << id));

    let mut out = Vec::new();
    out.extend_from_slice(&0_u32.to_le_bytes());
    out.extend_from_slice(&[2, 0, 0, 1]);
    out.extend_from_slice(&valid.to_le_bytes());
    out.extend_from_slice(&0x0000_1600_3301_FA00_u64.to_le_bytes());
    for (_, rows) in &tables {
        out.extend_from_slice(&(rows.len() as u32).to_le_bytes());
    }
    for (_, rows) in &tables {
        for row in rows {
            out.extend_from_slice(row);
        }
    }
    out
}

fn metadata_root(streams: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let version = b"v4.0.30319\0\0";
    let mut header = Vec::new();
    header.extend_from_slice(&0x424A_5342_u32.to_le_bytes());
    header.extend_from_slice(&1_u16.to_le_bytes());
    header.extend_from_slice(&1_u16.to_le_bytes());
    header.extend_from_slice(&0_u32.to_le_bytes());
    header.extend_from_slice(&(version.len() as u32).to_le_bytes());
    header.extend_from_slice(version);
    header.extend_from_slice(&0_u16.to_le_bytes());
    header.extend_from_slice(&(streams.len() as u16).to_le_bytes());

    let directory_size: usize = streams
        .iter()
        .map(|(name, _)| 8 + (name.len() + 1).next_multiple_of(4))
        .sum();
    let mut offset = header.len() + directory_size;
    let mut body = Vec::new();
    for (name, bytes) in streams {
        header.extend_from_slice(&(offset as u32).to_le_bytes());
        header.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        let mut padded_name = name.as_bytes().to_vec();
        padded_name.push(0);
        header.extend_from_slice(&padded(padded_name));
        body.extend_from_slice(bytes);
        offset += bytes.len();
    }
    header.extend_from_slice(&body);
    header
}

/// The 72-byte CLI header of an IL-only image.
fn cli_header(metadata_rva: u32, metadata_size: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&CLI_HEADER_SIZE.to_le_bytes());
    out.extend_from_slice(&2_u16.to_le_bytes());
    out.extend_from_slice(&5_u16.to_le_bytes());
    out.extend_from_slice(&metadata_rva.to_le_bytes());
    out.extend_from_slice(&metadata_size.to_le_bytes());
    out.extend_from_slice(&1_u32.to_le_bytes());
    out.extend_from_slice(&0_u32.to_le_bytes());
    // Resources, strong name, code manager, vtable fixups, export address
    // table jumps, managed native header.
    out.resize(CLI_HEADER_SIZE as usize, 0);
    out
}

/// Wraps `text` in a PE32 DLL with a single `.text` section.
fn pe_image(text: &[u8]) -> Vec<u8> {
    let virtual_size = text.len() as u32;
    let raw_size = align(virtual_size, FILE_ALIGNMENT);
    let image_size = TEXT_RVA + align(virtual_size, SECTION_ALIGNMENT);

    let mut out = vec![0_u8; 0x80];
    out[..2].copy_from_slice(b"MZ");
    out[0x3C..0x40].copy_from_slice(&0x80_u32.to_le_bytes());

    // COFF file header.
    out.extend_from_slice(b"PE\0\0");
    out.extend_from_slice(&0x014C_u16.to_le_bytes());
    out.extend_from_slice(&1_u16.to_le_bytes());
    out.extend_from_slice(&[0; 12]);
    out.extend_from_slice(&0xE0_u16.to_le_bytes());
    out.extend_from_slice(&0x2102_u16.to_le_bytes());

    // Optional header, standard fields.
    out.extend_from_slice(&0x010B_u16.to_le_bytes());
    out.extend_from_slice(&[8, 0]);
    for value in [raw_size, 0, 0, 0, TEXT_RVA, 0] {
        out.extend_from_slice(&value.to_le_bytes());
    }

    // Optional header, Windows fields.
    for value in [0x1000_0000, SECTION_ALIGNMENT, FILE_ALIGNMENT] {
        out.extend_from_slice(&value.to_le_bytes());
    }
    for value in [4_u16, 0, 0, 0, 4, 0] {
        out.extend_from_slice(&value.to_le_bytes());
    }
    for value in [0, image_size, FILE_ALIGNMENT, 0] {
        out.extend_from_slice(&value.to_le_bytes());
    }
    out.extend_from_slice(&3_u16.to_le_bytes());
    out.extend_from_slice(&0x8540_u16.to_le_bytes());
    for value in [0x0010_0000_u32, 0x1000, 0x0010_0000, 0x1000, 0, 16] {
        out.extend_from_slice(&value.to_le_bytes());
    }

    // Data directories; only the CLI header (index 14) is present.
    for index in 0..16 {
        let (rva, size) = if index == 14 {
            (TEXT_RVA, CLI_HEADER_SIZE)
        } else {
            (0, 0)
        };
        out.extend_from_slice(&rva.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
    }

    // Section table.
    out.extend_from_slice(b".text\0\0\0");
    for value in [virtual_size, TEXT_RVA, raw_size, FILE_ALIGNMENT, 0, 0] {
        out.extend_from_slice(&value.to_le_bytes());
    }
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&0x6000_0020_u32.to_le_bytes());

    out.resize(FILE_ALIGNMENT as usize, 0);
    out.extend_from_slice(text);
    out.resize((FILE_ALIGNMENT + raw_size) as usize, 0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_layout() {
        let image = ManagedImage::new("Widgets", [1, 0, 0, 0]).build();
        assert_eq!(&image[..2], b"MZ");
        assert_eq!(&image[0x80..0x84], b"PE\0\0");
        assert_eq!(image.len() % FILE_ALIGNMENT as usize, 0);
        // Optional header ends where the section table starts.
        assert_eq!(&image[0x178..0x17D], b".text");
        // CLI header, then the metadata signature right behind it.
        assert_eq!(&image[0x200..0x204], &CLI_HEADER_SIZE.to_le_bytes());
        assert_eq!(&image[0x248..0x24C], b"BSJB");
    }

    #[test]
    fn test_string_heap_deduplicates() {
        let mut heap = StringHeap::default();
        let first = heap.add(".ctor");
        assert_eq!(first, 1);
        assert_eq!(heap.add("Widgets"), 7);
        assert_eq!(heap.add(".ctor"), first);
    }
}
