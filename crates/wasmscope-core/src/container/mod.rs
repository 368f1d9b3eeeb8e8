//! # WebAssembly Container
//!
//! Parses a WebAssembly module just far enough to find its custom sections.
//!
//! ## Layout
//!
//! ```text
//! magic    00 61 73 6d          "\0asm"
//! version  01 00 00 00
//! section* id:u8  size:varuint32  payload[size]
//! ```
//!
//! Custom sections (id 0) start their payload with a length-prefixed UTF-8
//! name; the bytes after the name belong to that name. Toolchains use them to
//! carry DWARF (`.debug_info`, `.debug_line`, ...). Every other section id is
//! skipped without being interpreted.
//!
//! ## Ownership
//!
//! [`WasmModule`] owns the whole file as one `Arc<[u8]>`. Each
//! [`NamedRange`] only records a name and an index range into that buffer, so
//! slices handed out by [`WasmModule::section_data`] live exactly as long as
//! the module that owns them.

pub mod cursor;
pub mod varint;

use std::collections::HashSet;
use std::fs;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

pub use self::cursor::ByteCursor;
use self::varint::decode_u32;
use crate::error::{Result, WasmScopeError};

/// `\0asm`
pub const WASM_MAGIC: [u8; 4] = [0x00, 0x61, 0x73, 0x6d];

/// Binary format version 1, little-endian.
pub const WASM_VERSION: [u8; 4] = [0x01, 0x00, 0x00, 0x00];

/// Section id reserved for custom (named) sections.
pub const CUSTOM_SECTION_ID: u8 = 0;

/// A named byte range inside a module's buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedRange
{
    name: String,
    range: Range<usize>,
}

impl NamedRange
{
    /// Section name as stored in the custom section header.
    pub fn name(&self) -> &str
    {
        &self.name
    }

    /// Position of the section contents within the module buffer.
    pub fn range(&self) -> Range<usize>
    {
        self.range.clone()
    }

    pub fn len(&self) -> usize
    {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.range.is_empty()
    }
}

/// A parsed WebAssembly module: the raw bytes plus the custom sections found in them.
#[derive(Debug, Clone)]
pub struct WasmModule
{
    buffer: Arc<[u8]>,
    sections: Vec<NamedRange>,
}

impl WasmModule
{
    /// Read a module from disk and parse it.
    ///
    /// The whole file is read into memory before parsing starts.
    ///
    /// ## Errors
    ///
    /// Returns `Io` if the file cannot be read, or any error from [`WasmModule::parse`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self>
    {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        info!(path = %path.display(), size = bytes.len(), "loaded module");
        Self::parse(bytes)
    }

    /// Parse a module from an in-memory buffer.
    ///
    /// ## Errors
    ///
    /// - `BadMagic` / `BadVersion` if the 8-byte header does not match
    /// - `TruncatedInput` if a section header is cut off
    /// - `VarintOverflow` if a length does not fit in 32 bits
    /// - `SectionOverrun` if a section or a custom section name runs past its container
    /// - `InvalidSectionName` if a custom section name is not UTF-8
    ///
    /// Any error aborts the whole parse; no partially parsed module is returned.
    pub fn parse(bytes: impl Into<Arc<[u8]>>) -> Result<Self>
    {
        let buffer: Arc<[u8]> = bytes.into();
        let sections = parse_sections(&buffer)?;
        debug!(count = sections.len(), "parsed custom sections");
        Ok(Self { buffer, sections })
    }

    /// Full module contents.
    pub fn bytes(&self) -> &[u8]
    {
        &self.buffer
    }

    /// Custom sections in file order.
    pub fn sections(&self) -> &[NamedRange]
    {
        &self.sections
    }

    /// Look up a custom section by exact name.
    ///
    /// If several custom sections share the name, the first one in file order wins.
    pub fn section(&self, name: &str) -> Option<&NamedRange>
    {
        self.sections.iter().find(|section| section.name == name)
    }

    /// Contents of the custom section called `name`, if present.
    pub fn section_data(&self, name: &str) -> Option<&[u8]>
    {
        self.section(name).map(|section| &self.buffer[section.range()])
    }
}

fn parse_sections(buffer: &[u8]) -> Result<Vec<NamedRange>>
{
    let mut cursor = ByteCursor::new(buffer);

    let magic: [u8; 4] = cursor.read_array()?;
    if magic != WASM_MAGIC {
        return Err(WasmScopeError::BadMagic(magic));
    }
    let version: [u8; 4] = cursor.read_array()?;
    if version != WASM_VERSION {
        return Err(WasmScopeError::BadVersion(version));
    }

    let mut sections = Vec::new();
    let mut seen = HashSet::new();
    while !cursor.is_empty() {
        let id = cursor.read_u8()?;
        let declared = decode_u32(&mut cursor)?;
        let start = cursor.position();
        let end = checked_end(&cursor, declared)?;

        if id == CUSTOM_SECTION_ID {
            let section = read_custom_section(buffer, start, end)?;
            debug!(
                name = section.name(),
                offset = section.range.start,
                size = section.len(),
                "custom section"
            );
            if !seen.insert(section.name.clone()) {
                warn!(name = section.name(), "duplicate custom section; keeping the first");
            }
            sections.push(section);
        } else {
            trace!(id, offset = start, size = declared, "skipping section");
        }

        cursor.advance_to(end)?;
    }

    Ok(sections)
}

/// End position of a `len`-byte payload starting at the cursor, or `SectionOverrun`.
fn checked_end(cursor: &ByteCursor<'_>, len: u32) -> Result<usize>
{
    let available = cursor.remaining();
    match usize::try_from(len) {
        Ok(len) if len <= available => Ok(cursor.position() + len),
        _ => Err(WasmScopeError::SectionOverrun {
            offset: cursor.position(),
            declared: u64::from(len),
            available,
        }),
    }
}

/// Read the name header of the custom section occupying `buffer[start..end]`.
fn read_custom_section(buffer: &[u8], start: usize, end: usize) -> Result<NamedRange>
{
    // Reads stop at the section end, not the buffer end.
    let mut cursor = ByteCursor::new(&buffer[..end]);
    cursor.advance_to(start)?;

    let name_len = decode_u32(&mut cursor).map_err(|err| match err {
        WasmScopeError::TruncatedInput { offset } => WasmScopeError::SectionOverrun {
            offset: start,
            declared: (offset + 1 - start) as u64,
            available: end - start,
        },
        other => other,
    })?;
    let name_start = cursor.position();

    let available = cursor.remaining();
    let name_len = match usize::try_from(name_len) {
        Ok(len) if len <= available => len,
        _ => {
            return Err(WasmScopeError::SectionOverrun {
                offset: name_start,
                declared: u64::from(name_len),
                available,
            })
        }
    };

    let raw = cursor.read_bytes(name_len)?;
    let name = std::str::from_utf8(raw)
        .map_err(|_| WasmScopeError::InvalidSectionName { offset: name_start })?
        .to_string();

    Ok(NamedRange {
        name,
        range: cursor.position()..end,
    })
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn module(sections: &[(u8, &[u8])]) -> Vec<u8>
    {
        let mut out = Vec::new();
        out.extend_from_slice(&WASM_MAGIC);
        out.extend_from_slice(&WASM_VERSION);
        for (id, payload) in sections {
            out.push(*id);
            out.push(u8::try_from(payload.len()).unwrap());
            out.extend_from_slice(payload);
        }
        out
    }

    fn custom(name: &str, data: &[u8]) -> Vec<u8>
    {
        let mut out = vec![u8::try_from(name.len()).unwrap()];
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(data);
        out
    }

    #[test]
    fn test_header_only()
    {
        let parsed = WasmModule::parse(module(&[])).unwrap();
        assert!(parsed.sections().is_empty());
    }

    #[test]
    fn test_custom_section_range()
    {
        let payload = custom("x", &[0xaa, 0xbb]);
        let parsed = WasmModule::parse(module(&[(0, &payload)])).unwrap();
        let section = parsed.section("x").unwrap();
        // 8 header bytes, id, size, name length, name
        assert_eq!(section.range(), 12..14);
        assert_eq!(parsed.section_data("x").unwrap(), &[0xaa, 0xbb]);
    }

    #[test]
    fn test_skips_other_sections()
    {
        let debug = custom(".debug_info", &[1, 2, 3]);
        let parsed = WasmModule::parse(module(&[(1, &[0x01, 0x60, 0x00, 0x00]), (0, &debug), (10, &[0x00])])).unwrap();
        assert_eq!(parsed.sections().len(), 1);
        assert_eq!(parsed.section_data(".debug_info").unwrap(), &[1, 2, 3]);
    }

    #[test]
    fn test_empty_custom_payload()
    {
        let payload = custom("empty", &[]);
        let parsed = WasmModule::parse(module(&[(0, &payload)])).unwrap();
        assert!(parsed.section("empty").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_names_first_wins()
    {
        let first = custom("dup", &[1]);
        let second = custom("dup", &[2]);
        let parsed = WasmModule::parse(module(&[(0, &first), (0, &second)])).unwrap();
        assert_eq!(parsed.sections().len(), 2);
        assert_eq!(parsed.section_data("dup").unwrap(), &[1]);
    }

    #[test]
    fn test_name_longer_than_section()
    {
        // Section holds 3 bytes but the name claims 5.
        let bytes = module(&[(0, &[5, b'a', b'b'])]);
        assert!(matches!(
            WasmModule::parse(bytes),
            Err(WasmScopeError::SectionOverrun { declared: 5, .. })
        ));
    }

    #[test]
    fn test_zero_length_custom_section()
    {
        // No room for even the name length; the next section must not be read as the name.
        let bytes = module(&[(0, &[]), (0, &[1, b'x', 0xaa])]);
        assert!(matches!(
            WasmModule::parse(bytes),
            Err(WasmScopeError::SectionOverrun {
                offset: 10,
                declared: 1,
                available: 0
            })
        ));
    }

    #[test]
    fn test_name_length_crosses_section_end()
    {
        let mut bytes = module(&[(0, &[0x80])]);
        bytes.push(0x00);
        assert!(matches!(
            WasmModule::parse(bytes),
            Err(WasmScopeError::SectionOverrun {
                offset: 10,
                declared: 2,
                available: 1
            })
        ));
    }

    #[test]
    fn test_name_length_cut_off_at_buffer_end()
    {
        let bytes = module(&[(0, &[0x80])]);
        assert!(matches!(WasmModule::parse(bytes), Err(WasmScopeError::SectionOverrun { .. })));
    }

    #[test]
    fn test_invalid_utf8_name()
    {
        let bytes = module(&[(0, &[1, 0xff])]);
        assert!(matches!(
            WasmModule::parse(bytes),
            Err(WasmScopeError::InvalidSectionName { offset: 11 })
        ));
    }
}
