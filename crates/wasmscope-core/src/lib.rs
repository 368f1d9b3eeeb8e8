//! # wasmscope-core
//!
//! Reads DWARF out of WebAssembly modules and maps addresses back to source.
//!
//! The pipeline runs in four steps:
//! - [`container`] parses the module and records where each custom section lives
//! - [`loader`] hands those sections to gimli by DWARF section name
//! - [`symbols`] walks the resulting units, DIE trees and line programs
//! - [`scope`] finds the chain of inlined calls that encloses an address
//!
//! [`report`] renders the results as text.
//!
//! ## Example
//!
//! ```rust,no_run
//! use wasmscope_core::prelude::*;
//!
//! fn main() -> wasmscope_core::Result<()>
//! {
//!     let module = WasmModule::from_path("app.wasm")?;
//!     let info = DebugInfo::load(&module)?;
//!     for unit in info.compilation_units() {
//!         let table = unit.line_table()?;
//!         if let Some(row) = table.find_address(0x1234) {
//!             println!("{}", row.description());
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod container;
pub mod error;
pub mod line_table;
pub mod loader;
pub mod prelude;
pub mod report;
pub mod scope;
pub mod symbols;
pub mod types;

pub use error::{Result, WasmScopeError};
