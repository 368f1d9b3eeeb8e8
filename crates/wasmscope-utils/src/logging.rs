//! # Logging
//!
//! `tracing-subscriber` setup for wasmscope.
//!
//! Console output always goes to stderr, leaving stdout to the reports. A
//! second, daily-rolled file sink is added when `WASMSCOPE_LOG_FILE` is set.
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: filter directives (e.g. `RUST_LOG=wasmscope_core=debug`); default `warn`
//! - `WASMSCOPE_LOG_FORMAT`: `pretty` or `json` (default `pretty`)
//! - `WASMSCOPE_LOG_FILE`: path prefix of a log file; the date is appended on rotation
//!
//! ## Example
//!
//! ```rust,no_run
//! use wasmscope_utils::{init_logging_with_level, LogFormat, LogLevel};
//!
//! init_logging_with_level(LogLevel::Debug, LogFormat::Json).expect("Failed to initialize logging");
//! tracing::debug!("parsing module");
//! ```

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, io};

use chrono::Utc;
use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format.
pub const LOG_FORMAT_VAR: &str = "WASMSCOPE_LOG_FORMAT";

/// Environment variable naming an optional log file.
pub const LOG_FILE_VAR: &str = "WASMSCOPE_LOG_FILE";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat
{
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl LogFormat
{
    /// Format named by `WASMSCOPE_LOG_FORMAT`, or [`LogFormat::Pretty`] when unset.
    ///
    /// ## Errors
    ///
    /// Returns `InvalidFormat` when the variable is set to an unknown format.
    pub fn from_env() -> Result<Self, LoggingError>
    {
        match env::var(LOG_FORMAT_VAR) {
            Ok(value) => value.parse().map_err(LoggingError::InvalidFormat),
            Err(_) => Ok(LogFormat::Pretty),
        }
    }
}

impl FromStr for LogFormat
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {s}. Use 'pretty' or 'json'")),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    Error,
    /// Default
    Warn,
    Info,
    Debug,
    /// Per-section and per-range detail
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!(
                "Unknown log level: {s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            )),
        }
    }
}

/// Initialize logging from the environment.
///
/// The filter comes from `RUST_LOG` (default `warn`), the format from
/// `WASMSCOPE_LOG_FORMAT` and the optional file sink from `WASMSCOPE_LOG_FILE`.
///
/// ## Errors
///
/// Returns an error if `WASMSCOPE_LOG_FORMAT` is invalid or a global
/// subscriber is already installed.
pub fn init_logging() -> Result<(), LoggingError>
{
    install(None, LogFormat::from_env()?)
}

/// Initialize logging with an explicit level, ignoring `RUST_LOG`.
///
/// `WASMSCOPE_LOG_FILE` is still honoured.
///
/// ## Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<(), LoggingError>
{
    install(Some(level.into()), format)
}

fn install(level: Option<Level>, format: LogFormat) -> Result<(), LoggingError>
{
    let mut layers = vec![console_layer(format, build_filter(level))];
    if let Some(path) = env::var_os(LOG_FILE_VAR).map(PathBuf::from) {
        layers.push(file_layer(&path, format, build_filter(level)));
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;

    tracing::debug!(started = %Utc::now().to_rfc3339(), ?format, "logging initialised");
    Ok(())
}

/// An explicit level wins; otherwise `RUST_LOG`, falling back to `warn`.
fn build_filter(level: Option<Level>) -> EnvFilter
{
    match level {
        Some(level) => EnvFilter::new(level.to_string()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::WARN.to_string())),
    }
}

fn console_layer(format: LogFormat, filter: EnvFilter) -> BoxedLayer
{
    let layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(io::stderr);

    match format {
        LogFormat::Pretty => layer
            .with_ansi(io::stderr().is_terminal())
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(filter)
            .boxed(),
    }
}

fn file_layer(path: &Path, format: LogFormat, filter: EnvFilter) -> BoxedLayer
{
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let prefix = path.file_name().unwrap_or_default();
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(directory, prefix));

    // The subscriber is global and lives until exit; so must the flush guard.
    std::mem::forget(guard);

    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_ansi(false);

    match format {
        LogFormat::Pretty => layer.with_filter(filter).boxed(),
        LogFormat::Json => layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(filter)
            .boxed(),
    }
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    /// A global subscriber was already set.
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_log_format_from_str()
    {
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("text").unwrap(), LogFormat::Pretty);
        assert!(LogFormat::from_str("xml").is_err());
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
    }

    #[test]
    fn test_log_level_from_str()
    {
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);
        assert_eq!(LogLevel::from_str("Warning").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("dbg").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert!(LogLevel::from_str("loud").is_err());
    }

    #[test]
    fn test_log_level_to_tracing_level()
    {
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
    }
}
