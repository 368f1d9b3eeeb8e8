//! # wasmscope Utilities
//!
//! Logging setup shared by the wasmscope binaries.
//!
//! The core library only emits `tracing` events; installing a subscriber is
//! left to whichever binary links it, through this crate.

pub mod logging;

pub use logging::{init_logging, init_logging_with_level, LogFormat, LogLevel, LoggingError};
pub use tracing::{debug, error, info, trace, warn};
