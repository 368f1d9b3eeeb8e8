//! Materialises a unit's line-number program into a [`LineTable`].

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::Arc;

use gimli::{ColumnType, LineProgramHeader, Unit};
use tracing::debug;

use super::attr_text;
use crate::error::{Result, WasmScopeError};
use crate::line_table::{LineRow, LineTable};
use crate::loader::{ModuleDwarf, SectionReader};

const UNKNOWN_FILE: &str = "???";

pub(super) fn read_line_table<'a>(dwarf: &ModuleDwarf<'a>, unit: &Unit<SectionReader<'a>>) -> Result<LineTable>
{
    let Some(program) = unit.line_program.clone() else {
        return Ok(LineTable::default());
    };

    // Paths are resolved once per file index.
    let mut files: HashMap<u64, Arc<str>> = HashMap::new();
    let mut rows = Vec::new();
    let mut state = program.rows();
    while let Some((header, row)) = state
        .next_row()
        .map_err(|err| WasmScopeError::dwarf("stepping line program", err))?
    {
        let file = match files.entry(row.file_index()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => entry.insert(file_path(dwarf, unit, header, row)?).clone(),
        };

        rows.push(LineRow {
            address: row.address(),
            file,
            line: row.line().map_or(0, NonZeroU64::get),
            column: match row.column() {
                ColumnType::LeftEdge => 0,
                ColumnType::Column(column) => column.get(),
            },
            end_sequence: row.end_sequence(),
        });
    }

    debug!(rows = rows.len(), files = files.len(), "read line table");
    Ok(LineTable::from_rows(rows))
}

fn file_path<'a>(
    dwarf: &ModuleDwarf<'a>,
    unit: &Unit<SectionReader<'a>>,
    header: &LineProgramHeader<SectionReader<'a>>,
    row: &gimli::LineRow,
) -> Result<Arc<str>>
{
    let Some(file) = row.file(header) else {
        return Ok(Arc::from(UNKNOWN_FILE));
    };

    let name = attr_text(dwarf, unit, file.path_name())?;
    let directory = match file.directory(header) {
        Some(directory) => attr_text(dwarf, unit, directory)?,
        None => String::new(),
    };

    let path = if directory.is_empty() || name.starts_with('/') {
        name
    } else {
        format!("{}/{name}", directory.trim_end_matches('/'))
    };
    Ok(Arc::from(path))
}
