use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use wasmscope_core::container::WasmModule;
use wasmscope_core::report::{write_inline_stack, write_line_table, write_section_table, write_unit_header};
use wasmscope_core::scope::find_containing;
use wasmscope_core::symbols::DebugInfo;
use wasmscope_core::Result;
use wasmscope_utils::{info, init_logging, init_logging_with_level, warn, LogFormat, LogLevel};

/// Dump DWARF line tables and resolve addresses in WebAssembly modules.
#[derive(Parser, Debug)]
#[command(name = "wasmscope")]
#[command(version)]
#[command(
    about = "Dump DWARF line tables and resolve addresses to inline scopes in WebAssembly modules",
    long_about = None
)]
struct Cli
{
    /// WebAssembly module carrying DWARF custom sections
    file: PathBuf,

    /// Code address to resolve (0x-prefixed hex, 0-prefixed octal, or decimal);
    /// without it every line table is dumped
    #[arg(value_parser = parse_address)]
    address: Option<u64>,

    /// List the module's custom sections and exit
    #[arg(long, default_value_t = false, conflicts_with = "address")]
    list_sections: bool,

    /// Log level (error, warn, info, debug, trace); overrides RUST_LOG
    #[arg(long)]
    log_level: Option<LogLevel>,
}

fn main()
{
    let cli = Cli::parse();

    let logging = match cli.log_level {
        Some(level) => LogFormat::from_env().and_then(|format| init_logging_with_level(level, format)),
        None => init_logging(),
    };
    if let Err(e) = logging {
        eprintln!("Failed to initialize logging: {e}");
        process::exit(1);
    }

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()>
{
    let module = WasmModule::from_path(&cli.file)?;
    let mut out = io::BufWriter::new(io::stdout().lock());

    if cli.list_sections {
        write_section_table(&mut out, &module)?;
    } else {
        let debug_info = DebugInfo::load(&module)?;
        match cli.address {
            Some(pc) => resolve_address(&mut out, &debug_info, pc)?,
            None => dump_line_tables(&mut out, &debug_info)?,
        }
    }

    out.flush()?;
    Ok(())
}

fn dump_line_tables<W: Write>(out: &mut W, debug_info: &DebugInfo<'_>) -> Result<()>
{
    for unit in debug_info.compilation_units() {
        write_unit_header(out, &unit)?;
        write_line_table(out, &unit.line_table()?)?;
        writeln!(out)?;
    }
    Ok(())
}

fn resolve_address<W: Write>(out: &mut W, debug_info: &DebugInfo<'_>, pc: u64) -> Result<()>
{
    let Some(unit) = debug_info.unit_containing(pc) else {
        warn!(pc = %format_args!("{pc:#x}"), "no compilation unit contains address");
        return Ok(());
    };
    info!(unit = unit.offset(), pc = %format_args!("{pc:#x}"), "resolving address");

    match unit.line_table()?.find_address(pc) {
        Some(row) => writeln!(out, "{}", row.description())?,
        None => writeln!(out, "UNKNOWN")?,
    }

    let stack = find_containing(&unit.root_scope()?, pc)?;
    write_inline_stack(out, stack.as_slice())
}

/// Parse an address the way `strtoll(s, NULL, 0)` picks its base: `0x`/`0X`
/// is hex, a leading `0` is octal, anything else decimal. The whole string
/// must be consumed.
fn parse_address(s: &str) -> std::result::Result<u64, String>
{
    let trimmed = s.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let (digits, radix) = if let Some(hex) = unsigned.strip_prefix("0x").or_else(|| unsigned.strip_prefix("0X")) {
        (hex, 16)
    } else if unsigned.len() > 1 && unsigned.starts_with('0') {
        (&unsigned[1..], 8)
    } else {
        (unsigned, 10)
    };

    // from_str_radix would accept a second sign after the prefix.
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(format!("invalid address: {s}"));
    }
    u64::from_str_radix(digits, radix).map_err(|e| format!("invalid address {s}: {e}"))
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse_address_bases()
    {
        assert_eq!(parse_address("0x1f0"), Ok(0x1f0));
        assert_eq!(parse_address("0X1F0"), Ok(0x1f0));
        assert_eq!(parse_address("0755"), Ok(0o755));
        assert_eq!(parse_address("496"), Ok(496));
        assert_eq!(parse_address("0"), Ok(0));
        assert_eq!(parse_address("+12"), Ok(12));
    }

    #[test]
    fn test_parse_address_rejects_garbage()
    {
        assert!(parse_address("").is_err());
        assert!(parse_address("0x").is_err());
        assert!(parse_address("12abc").is_err());
        assert!(parse_address("089").is_err());
        assert!(parse_address("-5").is_err());
        assert!(parse_address("0x-5").is_err());
        assert!(parse_address("0x10000000000000000").is_err());
    }

    #[test]
    fn test_cli_usage()
    {
        let cli = Cli::try_parse_from(["wasmscope", "app.wasm", "0x100", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.address, Some(0x100));
        assert_eq!(cli.log_level, Some(LogLevel::Debug));

        assert!(Cli::try_parse_from(["wasmscope"]).is_err());
        assert!(Cli::try_parse_from(["wasmscope", "app.wasm", "zzz"]).is_err());
        assert!(Cli::try_parse_from(["wasmscope", "app.wasm", "1", "--list-sections"]).is_err());
    }
}
