//! Commonly used types, for glob import.

pub use crate::container::{NamedRange, WasmModule};
pub use crate::error::{Result, WasmScopeError};
pub use crate::line_table::{LineEvent, LineRow, LineTable};
pub use crate::loader::{load_dwarf, SectionProvider};
pub use crate::scope::{find_containing, InlineStack, Scope, ScopeKind};
pub use crate::symbols::{CompilationUnit, DebugInfo, DieScope};
