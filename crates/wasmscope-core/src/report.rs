//! # Reports
//!
//! Plain-text renderings of line tables, scopes and section tables.
//!
//! Every writer takes any [`io::Write`], so the same code prints to stdout
//! in the CLI and to a `Vec<u8>` in tests.

use std::io;

use crate::container::WasmModule;
use crate::error::Result;
use crate::line_table::{LineEvent, LineTable};
use crate::symbols::{CompilationUnit, DieScope, ScopeDescription};
use crate::types::LinkageName;

/// Separator printed between the scopes of an inline stack.
pub const INLINED_IN: &str = "\nInlined in:\n";

/// One `file line address` row per line-table row, and a blank line after
/// each sequence.
///
/// ## Errors
///
/// Returns `Io` if the writer fails.
pub fn write_line_table<W: io::Write>(w: &mut W, table: &LineTable) -> Result<()>
{
    for event in table.walk() {
        match event {
            LineEvent::Row(row) => {
                writeln!(w, "{:<40}{:>8}{:>#20x}", row.file, row.line, row.address)?;
            }
            LineEvent::EndSequence => writeln!(w)?,
        }
    }
    Ok(())
}

/// `--- <offset>` heading for a compilation unit.
///
/// ## Errors
///
/// Returns `Io` if the writer fails.
pub fn write_unit_header<W: io::Write>(w: &mut W, unit: &CompilationUnit<'_, '_>) -> Result<()>
{
    writeln!(w, "--- <{:x}>", unit.offset())?;
    Ok(())
}

/// `<offset> tag` followed by one indented line per attribute.
///
/// Linkage names are followed by their demangled form when one exists.
///
/// ## Errors
///
/// Returns `Io` if the writer fails.
pub fn write_scope<W: io::Write>(w: &mut W, scope: &ScopeDescription) -> Result<()>
{
    writeln!(w, "<{:x}> {}", scope.offset, scope.tag)?;
    for attr in &scope.attributes {
        match attr.linkage.as_ref().and_then(LinkageName::demangled) {
            Some(demangled) => writeln!(w, "      {} {} ({demangled})", attr.name, attr.value)?,
            None => writeln!(w, "      {} {}", attr.name, attr.value)?,
        }
    }
    Ok(())
}

/// Describe each scope innermost first, separated by [`INLINED_IN`].
///
/// ## Errors
///
/// Returns `Dwarf` if a scope cannot be described, `Io` if the writer fails.
pub fn write_inline_stack<W: io::Write>(w: &mut W, scopes: &[DieScope<'_, '_>]) -> Result<()>
{
    for (index, scope) in scopes.iter().enumerate() {
        if index > 0 {
            write!(w, "{INLINED_IN}")?;
        }
        write_scope(w, &scope.describe()?)?;
    }
    Ok(())
}

/// Name, buffer offset and size of every custom section.
///
/// ## Errors
///
/// Returns `Io` if the writer fails.
pub fn write_section_table<W: io::Write>(w: &mut W, module: &WasmModule) -> Result<()>
{
    writeln!(w, "{:<32}{:>12}{:>12}", "name", "offset", "size")?;
    for section in module.sections() {
        writeln!(w, "{:<32}{:>#12x}{:>12}", section.name(), section.range().start, section.len())?;
    }
    Ok(())
}
