//! # Types
//!
//! Value types shared by the resolver, the line-table walker and the reports.

pub mod names;

pub use names::{LinkageName, Mangling, SourceLocation};
