//! # Error Types
//!
//! Error handling for container loading and debug-info resolution.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! Only structural failures are errors. A section that is not present, a
//! compilation unit that does not cover an address, and an address that no
//! scope contains are ordinary outcomes and are reported through `Option`
//! or an empty stack instead.

use thiserror::Error;

/// Main error type for wasmscope operations
///
/// ## Error Categories
///
/// 1. **Decode errors**: TruncatedInput, VarintOverflow, InvalidVarintWidth
/// 2. **Container errors**: BadMagic, BadVersion, SectionOverrun, InvalidSectionName
/// 3. **DWARF errors**: Dwarf (wraps `gimli::Error` with context)
/// 4. **Caller errors**: InvalidArgument
/// 5. **I/O errors**: Io (reading the module, writing reports)
#[derive(Error, Debug)]
pub enum WasmScopeError
{
    /// The byte cursor ran out before a value was fully decoded
    ///
    /// `offset` is the position at which the read was attempted.
    #[error("Truncated input at offset {offset:#x}")]
    TruncatedInput
    {
        offset: usize,
    },

    /// A variable-length integer carries bits beyond its target width
    ///
    /// `offset` is where the encoding starts.
    #[error("Varint at offset {offset:#x} does not fit in {width} bits")]
    VarintOverflow
    {
        offset: usize,
        width: u32,
    },

    /// A varint decode was requested with a width outside `1..=64`
    #[error("Unsupported varint width: {0} bits")]
    InvalidVarintWidth(u32),

    /// The module does not start with `\0asm`
    #[error("Bad magic signature: {0:02x?}")]
    BadMagic([u8; 4]),

    /// The module version is not 1
    #[error("Unsupported container version: {0:02x?}")]
    BadVersion([u8; 4]),

    /// A section (or a section name) claims more bytes than remain
    ///
    /// This happens when:
    /// - A section's declared length runs past the end of the buffer
    /// - A custom section's name length exceeds the section payload
    #[error("Section at offset {offset:#x} declares {declared} bytes but only {available} remain")]
    SectionOverrun
    {
        /// Position of the payload that overran
        offset: usize,
        /// Length claimed by the encoding
        declared: u64,
        /// Bytes actually left
        available: usize,
    },

    /// A custom section name is not valid UTF-8
    #[error("Custom section name at offset {offset:#x} is not valid UTF-8")]
    InvalidSectionName
    {
        offset: usize,
    },

    /// The DWARF data inside the module could not be decoded
    ///
    /// `context` names the operation that was running (e.g. "reading unit header").
    #[error("DWARF error while {context}: {source}")]
    Dwarf
    {
        context: String,
        #[source]
        source: gimli::Error,
    },

    /// Invalid argument passed to a wasmscope function
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error (reading the module from disk, writing reports)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WasmScopeError
{
    /// Wrap a gimli error with a description of what was being done.
    pub(crate) fn dwarf(context: &str, source: gimli::Error) -> Self
    {
        WasmScopeError::Dwarf {
            context: context.to_string(),
            source,
        }
    }
}

/// Convenience type alias for `Result<T, WasmScopeError>`
///
/// ```rust
/// use wasmscope_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, WasmScopeError>;
