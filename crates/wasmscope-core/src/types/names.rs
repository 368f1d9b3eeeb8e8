//! Linkage names and source positions.

use std::fmt;
use std::num::NonZeroU64;

/// Mangling scheme a linkage name was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mangling
{
    /// Rust legacy scheme: `_ZN...17h<hash>E`.
    RustLegacy,
    /// Rust v0 scheme: `_R...`.
    RustV0,
    /// Itanium C++ ABI; not demangled.
    Itanium,
    /// A plain C-style name.
    Unmangled,
}

impl Mangling
{
    pub fn is_rust(self) -> bool
    {
        matches!(self, Mangling::RustLegacy | Mangling::RustV0)
    }
}

impl fmt::Display for Mangling
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(match self {
            Mangling::RustLegacy => "rust-legacy",
            Mangling::RustV0 => "rust-v0",
            Mangling::Itanium => "itanium",
            Mangling::Unmangled => "unmangled",
        })
    }
}

/// A `DW_AT_linkage_name` value and, when it could be demangled, its readable form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkageName
{
    raw: String,
    demangled: Option<String>,
    mangling: Mangling,
}

impl LinkageName
{
    pub fn new(raw: String, demangled: Option<String>, mangling: Mangling) -> Self
    {
        Self {
            raw,
            demangled,
            mangling,
        }
    }

    pub fn raw(&self) -> &str
    {
        &self.raw
    }

    /// Demangled path without the trailing hash, e.g. `core::fmt::write`.
    pub fn demangled(&self) -> Option<&str>
    {
        self.demangled.as_deref()
    }

    pub fn mangling(&self) -> Mangling
    {
        self.mangling
    }
}

impl fmt::Display for LinkageName
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.demangled().unwrap_or(&self.raw))
    }
}

/// Where a line-table row points in the source.
///
/// Zero line and column numbers mean "unknown" in DWARF, hence the `NonZeroU64`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation<'a>
{
    pub file: &'a str,
    pub line: Option<NonZeroU64>,
    pub column: Option<NonZeroU64>,
}

impl fmt::Display for SourceLocation<'_>
{
    /// `file`, `file:line` or `file:line:column`; a column without a line is dropped.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.file)?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
            if let Some(column) = self.column {
                write!(f, ":{column}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_location_display()
    {
        let location = SourceLocation {
            file: "src/lib.rs",
            line: NonZeroU64::new(12),
            column: None,
        };
        assert_eq!(location.to_string(), "src/lib.rs:12");

        let location = SourceLocation {
            column: NonZeroU64::new(5),
            ..location
        };
        assert_eq!(location.to_string(), "src/lib.rs:12:5");

        let location = SourceLocation { line: None, ..location };
        assert_eq!(location.to_string(), "src/lib.rs");
    }

    #[test]
    fn test_linkage_name_prefers_demangled()
    {
        let name = LinkageName::new("_ZN1a1b17h0000000000000000E".into(), Some("a::b".into()), Mangling::RustLegacy);
        assert_eq!(name.to_string(), "a::b");
        assert!(name.mangling().is_rust());

        let name = LinkageName::new("memcpy".into(), None, Mangling::Unmangled);
        assert_eq!(name.to_string(), "memcpy");
    }
}
