//! # Debug Information
//!
//! gimli-backed views over the DWARF carried by a module: compilation units,
//! their DIE trees as [`Scope`](crate::scope::Scope)s, and their line tables.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use wasmscope_core::container::WasmModule;
//! use wasmscope_core::scope::find_containing;
//! use wasmscope_core::symbols::DebugInfo;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>>
//! {
//!     let module = WasmModule::from_path("app.wasm")?;
//!     let info = DebugInfo::load(&module)?;
//!
//!     let pc = 0x1234;
//!     if let Some(unit) = info.unit_containing(pc) {
//!         let stack = find_containing(&unit.root_scope()?, pc)?;
//!         for scope in &stack {
//!             println!("{}", scope.describe()?.tag);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub(crate) mod demangle;
mod line_program;
mod scope;

use gimli::{AttributeValue, Unit, UnitSectionOffset};
use tracing::{debug, trace, warn};

pub use self::scope::{AttributeDescription, DieScope, ScopeDescription};
use crate::error::{Result, WasmScopeError};
use crate::line_table::LineTable;
use crate::loader::{load_dwarf, ModuleDwarf, SectionProvider, SectionReader};
use crate::scope::AddressRange;

/// Every compilation unit of a module's DWARF, parsed up front.
pub struct DebugInfo<'a>
{
    dwarf: ModuleDwarf<'a>,
    units: Vec<Unit<SectionReader<'a>>>,
}

impl<'a> DebugInfo<'a>
{
    /// Load DWARF from `provider` and parse every unit header.
    ///
    /// ## Errors
    ///
    /// Returns `Dwarf` if a unit header or its abbreviations cannot be parsed.
    pub fn load<P>(provider: &'a P) -> Result<Self>
    where
        P: SectionProvider + ?Sized,
    {
        let dwarf = load_dwarf(provider)?;

        let mut units = Vec::new();
        let mut headers = dwarf.units();
        while let Some(header) = headers
            .next()
            .map_err(|err| WasmScopeError::dwarf("reading .debug_info unit header", err))?
        {
            units.push(
                dwarf
                    .unit(header)
                    .map_err(|err| WasmScopeError::dwarf("parsing compilation unit", err))?,
            );
        }
        debug!(units = units.len(), "parsed DWARF units");

        Ok(Self { dwarf, units })
    }

    /// Compilation units in `.debug_info` order.
    pub fn compilation_units(&self) -> impl Iterator<Item = CompilationUnit<'_, 'a>> + '_
    {
        self.units.iter().map(move |unit| CompilationUnit {
            dwarf: &self.dwarf,
            unit,
        })
    }

    /// The first unit whose address ranges contain `pc`.
    pub fn unit_containing(&self, pc: u64) -> Option<CompilationUnit<'_, 'a>>
    {
        self.compilation_units().find(|unit| unit.contains(pc))
    }
}

/// One compilation unit, borrowed from a [`DebugInfo`].
#[derive(Clone, Copy)]
pub struct CompilationUnit<'u, 'a>
{
    dwarf: &'u ModuleDwarf<'a>,
    unit: &'u Unit<SectionReader<'a>>,
}

impl<'u, 'a> CompilationUnit<'u, 'a>
{
    /// Offset of the unit header within `.debug_info` (or `.debug_types`).
    pub fn offset(&self) -> usize
    {
        section_offset(self.unit.header.offset())
    }

    /// Address ranges of the unit's root DIE.
    ///
    /// ## Errors
    ///
    /// Returns `Dwarf` if the range attributes cannot be decoded.
    pub fn address_ranges(&self) -> Result<Vec<AddressRange>>
    {
        let mut iter = self
            .dwarf
            .unit_ranges(self.unit)
            .map_err(|err| WasmScopeError::dwarf("reading unit ranges", err))?;
        let mut ranges = Vec::new();
        while let Some(range) = iter
            .next()
            .map_err(|err| WasmScopeError::dwarf("iterating unit ranges", err))?
        {
            ranges.push(AddressRange::new(range.begin, range.end));
        }
        Ok(ranges)
    }

    /// Whether the unit's ranges contain `pc`.
    ///
    /// A unit without usable ranges contains nothing.
    pub fn contains(&self, pc: u64) -> bool
    {
        match self.address_ranges() {
            Ok(ranges) => match ranges.iter().find(|range| range.contains(pc)) {
                Some(range) => {
                    trace!(unit = self.offset(), %range, pc, "unit contains address");
                    true
                }
                None => false,
            },
            Err(err) => {
                warn!(unit = self.offset(), error = %err, "ignoring unit with unreadable ranges");
                false
            }
        }
    }

    /// The unit's root DIE as a scope tree.
    ///
    /// ## Errors
    ///
    /// Returns `Dwarf` if the root entry cannot be read.
    pub fn root_scope(&self) -> Result<DieScope<'u, 'a>>
    {
        DieScope::root(self.dwarf, self.unit)
    }

    /// Materialise the unit's line-number program.
    ///
    /// Units without a line program have an empty table.
    ///
    /// ## Errors
    ///
    /// Returns `Dwarf` if the program or its file table is malformed.
    pub fn line_table(&self) -> Result<LineTable>
    {
        line_program::read_line_table(self.dwarf, self.unit)
    }
}

pub(crate) fn section_offset(offset: UnitSectionOffset) -> usize
{
    match offset {
        UnitSectionOffset::DebugInfoOffset(offset) => offset.0,
        UnitSectionOffset::DebugTypesOffset(offset) => offset.0,
    }
}

/// Resolve a string-form attribute (inline, `.debug_str`, `.debug_line_str`, ...) to text.
pub(crate) fn attr_text<'a>(
    dwarf: &ModuleDwarf<'a>,
    unit: &Unit<SectionReader<'a>>,
    value: AttributeValue<SectionReader<'a>>,
) -> Result<String>
{
    let text = dwarf
        .attr_string(unit, value)
        .map_err(|err| WasmScopeError::dwarf("resolving DWARF string", err))?;
    Ok(String::from_utf8_lossy(text.slice()).into_owned())
}
