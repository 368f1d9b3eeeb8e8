//! # Line Tables
//!
//! Rows of a compilation unit's line-number program, and the two ways they
//! are consumed: a walk that groups rows into sequences, and an address lookup.

use std::num::NonZeroU64;
use std::sync::Arc;

use crate::types::SourceLocation;

/// One row of a line-number program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRow
{
    pub address: u64,
    pub file: Arc<str>,
    /// Line number; 0 when the row is not attributable to any line.
    pub line: u64,
    /// Column number; 0 means the left edge.
    pub column: u64,
    /// Marks the first address past the end of a sequence.
    pub end_sequence: bool,
}

impl LineRow
{
    pub fn new(address: u64, file: impl Into<Arc<str>>, line: u64) -> Self
    {
        Self {
            address,
            file: file.into(),
            line,
            column: 0,
            end_sequence: false,
        }
    }

    /// The row that closes a sequence at `address`.
    pub fn end_of_sequence(address: u64) -> Self
    {
        Self {
            address,
            file: Arc::from(""),
            line: 0,
            column: 0,
            end_sequence: true,
        }
    }

    #[must_use]
    pub fn with_column(mut self, column: u64) -> Self
    {
        self.column = column;
        self
    }

    /// Source location this row maps to.
    pub fn location(&self) -> SourceLocation<'_>
    {
        SourceLocation {
            file: &self.file,
            line: NonZeroU64::new(self.line),
            column: NonZeroU64::new(self.column),
        }
    }

    /// `file:line` or `file:line:column`.
    pub fn description(&self) -> String
    {
        self.location().to_string()
    }
}

/// What a line-table walk produces for each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEvent<'a>
{
    /// An ordinary row.
    Row(&'a LineRow),
    /// A sequence ended; the next row (if any) starts a new one.
    EndSequence,
}

/// Rows of one compilation unit's line program, in program order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineTable
{
    rows: Vec<LineRow>,
}

impl LineTable
{
    pub fn from_rows(rows: Vec<LineRow>) -> Self
    {
        Self { rows }
    }

    pub fn rows(&self) -> &[LineRow]
    {
        &self.rows
    }

    pub fn is_empty(&self) -> bool
    {
        self.rows.is_empty()
    }

    /// Walk the table from the start.
    ///
    /// Every call starts a fresh walk, so the table can be walked any number
    /// of times with identical results.
    pub fn walk(&self) -> impl Iterator<Item = LineEvent<'_>> + Clone + '_
    {
        self.rows.iter().map(|row| {
            if row.end_sequence {
                LineEvent::EndSequence
            } else {
                LineEvent::Row(row)
            }
        })
    }

    /// The row whose address range covers `pc`.
    ///
    /// A row covers `[row.address, next.address)` where `next` is the row
    /// after it. End-of-sequence rows cover nothing, and the last row of the
    /// table has no successor, so neither is ever returned.
    pub fn find_address(&self, pc: u64) -> Option<&LineRow>
    {
        self.rows
            .windows(2)
            .find(|pair| !pair[0].end_sequence && pair[0].address <= pc && pc < pair[1].address)
            .map(|pair| &pair[0])
    }
}
