//! Demangling of `DW_AT_linkage_name` values.

use rustc_demangle::try_demangle;

use crate::types::{LinkageName, Mangling};

/// Classify `raw` and demangle it when it is a Rust symbol.
///
/// Itanium names are only recognised, not demangled.
pub(crate) fn demangle_linkage_name(raw: String) -> LinkageName
{
    match try_demangle(&raw) {
        Ok(demangled) => {
            let mangling = if raw.trim_start_matches('_').starts_with('R') {
                Mangling::RustV0
            } else {
                Mangling::RustLegacy
            };
            // `#` drops the legacy hash suffix.
            let readable = format!("{demangled:#}");
            LinkageName::new(raw, Some(readable), mangling)
        }
        Err(_) if raw.starts_with("_Z") => LinkageName::new(raw, None, Mangling::Itanium),
        Err(_) => LinkageName::new(raw, None, Mangling::Unmangled),
    }
}
