//! # Section Loading
//!
//! Bridges a container that stores sections by name to gimli, which asks for
//! sections by [`SectionId`].
//!
//! ```rust,no_run
//! use wasmscope_core::container::WasmModule;
//! use wasmscope_core::loader::load_dwarf;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>>
//! {
//!     let module = WasmModule::from_path("app.wasm")?;
//!     let dwarf = load_dwarf(&module)?;
//!     let mut units = dwarf.units();
//!     while let Some(header) = units.next()? {
//!         println!("unit at {:?}", header.offset());
//!     }
//!     Ok(())
//! }
//! ```

use gimli::{Dwarf, EndianSlice, RunTimeEndian, SectionId};
use tracing::trace;

use crate::container::WasmModule;
use crate::error::{Result, WasmScopeError};

/// Reader type handed to gimli: a borrowed, little-endian slice of the module buffer.
pub type SectionReader<'a> = EndianSlice<'a, RunTimeEndian>;

/// Loaded DWARF borrowing its bytes from a [`SectionProvider`].
pub type ModuleDwarf<'a> = Dwarf<SectionReader<'a>>;

/// Source of raw debug sections, looked up by gimli's section identifier.
///
/// Returning `None` means the section is absent. gimli treats absent sections
/// as empty, so optional sections like `.debug_ranges` need no special casing.
pub trait SectionProvider
{
    /// Bytes of the section identified by `id`, if the container has it.
    fn load(&self, id: SectionId) -> Option<&[u8]>;
}

impl SectionProvider for WasmModule
{
    fn load(&self, id: SectionId) -> Option<&[u8]>
    {
        self.section_data(id.name())
    }
}

/// Build a gimli `Dwarf` over every section `provider` can supply.
///
/// WebAssembly is little-endian, so the readers are little-endian
/// regardless of the host.
///
/// ## Errors
///
/// Loading itself only slices buffers; the `Result` is kept so callers
/// handle it the same way as every other DWARF step.
pub fn load_dwarf<P>(provider: &P) -> Result<ModuleDwarf<'_>>
where
    P: SectionProvider + ?Sized,
{
    Dwarf::load(|id| {
        let data = provider.load(id);
        trace!(section = id.name(), present = data.is_some(), "loading DWARF section");
        Ok::<_, gimli::Error>(EndianSlice::new(data.unwrap_or(&[]), RunTimeEndian::Little))
    })
    .map_err(|err| WasmScopeError::dwarf("loading DWARF sections", err))
}
