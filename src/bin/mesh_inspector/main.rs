//! mesh-inspector CLI - decode raw vertex data dumps as tables.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{bail, Context, Result};
use memmap2::Mmap;
use tracing::{debug, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use mesh_inspector::format::{DeclParser, FormatParser};
use mesh_inspector::table::BufferTable;
use mesh_inspector::viewer::{fetch, Settings};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const BUILD_DATE: &str = env!("MESH_INSPECTOR_BUILD_DATE");
const BUILD_TIME: &str = env!("MESH_INSPECTOR_BUILD_TIME");

/// Rows printed by `dump` unless `--rows` says otherwise.
const DEFAULT_ROWS: u32 = 64;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Parse global flags
    let mut level = "warn";
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "error",
            _ => filtered_args.push(arg),
        }
    }

    let _guard = init_tracing(level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let result = match filtered_args[0] {
        "d" | "dump" => cmd_dump(&filtered_args[1..]),
        "l" | "layout" => cmd_layout(&filtered_args[1..]),
        "settings" => cmd_settings(),
        "-V" | "--version" | "version" => {
            println!("mesh-inspector {} (built {} {})", VERSION, BUILD_DATE, BUILD_TIME);
            Ok(())
        }
        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn print_help() {
    println!("mesh-inspector - vertex buffer decoding toolkit");
    println!();
    println!("USAGE:");
    println!("    mesh-inspector [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    d, dump   <file> <decl> [--offset N] [--rows N] [--hex]");
    println!("                                  Print file contents as rows of <decl>");
    println!("    l, layout <decl>              Show parsed columns, offsets and stride");
    println!("    settings                      Show the settings file location and values");
    println!("    version                       Show version and build date");
    println!();
    println!("DECLARATIONS:");
    println!("    Entries separated by ';' or newlines: [hex] <type><count> <name>");
    println!("    e.g. \"float3 pos; half2 uv; hex uint flags\"");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose     Debug logging (RUST_LOG overrides)");
    println!("    -vv, --trace      Trace logging");
    println!("    -q, --quiet       Errors only");
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the fmt subscriber. With `MESH_INSPECTOR_TRACE=1`, also write a
/// Chrome trace to `trace.json`.
#[cfg(feature = "trace")]
fn init_tracing(default_level: &str) -> Option<tracing_chrome::FlushGuard> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(io::stderr).with_target(false);

    let (chrome_layer, guard) = if std::env::var("MESH_INSPECTOR_TRACE").ok().as_deref() == Some("1") {
        let (layer, guard) = tracing_chrome::ChromeLayerBuilder::new()
            .file("trace.json")
            .build();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(fmt_layer)
        .with(chrome_layer)
        .try_init()
        .ok();
    guard
}

/// Install the fmt subscriber.
#[cfg(not(feature = "trace"))]
fn init_tracing(default_level: &str) -> Option<()> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(io::stderr).with_target(false);

    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(fmt_layer)
        .try_init()
        .ok();
    None
}

/// Parse a decimal or `0x` hex number.
fn parse_number(s: &str) -> Result<u64> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.with_context(|| format!("invalid number '{}'", s))
}

fn parse_decl(decl: &str) -> Vec<mesh_inspector::format::AttributeLayout> {
    let (columns, errors) = DeclParser.parse(decl);
    for e in &errors {
        eprintln!("format: {}", e);
    }
    columns
}

fn cmd_layout(args: &[&str]) -> Result<()> {
    let Some(decl) = args.first() else {
        bail!("missing declaration\nUsage: mesh-inspector layout <decl>");
    };
    let columns = parse_decl(decl);

    let mut out = BufWriter::new(io::stdout().lock());
    writeln!(out, "{:<16} {:>6} {:>6}  format", "name", "offset", "size")?;
    for c in &columns {
        writeln!(out, "{:<16} {:>6} {:>6}  {:?}{}", c.name, c.offset, c.byte_size(), c.format, if c.hex { " hex" } else { "" })?;
    }
    writeln!(out, "stride: {}", fetch::tight_stride(&columns))?;

    let mut table = BufferTable::new(false);
    table.replace(fetch::raw_contents(Vec::new(), columns));
    let headers: Vec<String> = (0..table.column_count()).filter_map(|c| table.header(c)).collect();
    writeln!(out, "columns: {}", headers.join(" "))?;
    out.flush()?;
    Ok(())
}

fn cmd_dump(args: &[&str]) -> Result<()> {
    let mut positional = Vec::new();
    let mut offset = 0u64;
    let mut rows = DEFAULT_ROWS;
    let mut hex = false;

    let mut it = args.iter();
    while let Some(&arg) = it.next() {
        match arg {
            "--offset" | "-o" => {
                let v = it.next().context("--offset needs a value")?;
                offset = parse_number(v)?;
            }
            "--rows" | "-n" => {
                let v = it.next().context("--rows needs a value")?;
                rows = u32::try_from(parse_number(v)?).unwrap_or(u32::MAX);
            }
            "--hex" | "-x" => hex = true,
            _ => positional.push(arg),
        }
    }

    let (path, decl) = match positional.as_slice() {
        [path, decl, ..] => (*path, *decl),
        _ => bail!("missing arguments\nUsage: mesh-inspector dump <file> <decl> [--offset N] [--rows N] [--hex]"),
    };

    let settings = Settings::load();
    let mut columns = parse_decl(decl);
    if hex || settings.hex_by_default {
        for c in &mut columns {
            c.hex = true;
        }
    }

    let file = File::open(path).with_context(|| format!("cannot open {}", path))?;
    let size = file.metadata()?.len();
    let data = if size == 0 {
        Vec::new()
    } else {
        // Safety: the file is opened read-only and only copied out of.
        let mmap = unsafe { Mmap::map(&file) }.with_context(|| format!("cannot map {}", path))?;
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(mmap.len());
        if start < usize::try_from(offset).unwrap_or(usize::MAX) {
            warn!("Offset {} is past the end of {} ({} bytes)", offset, path, size);
        }
        mmap[start..].to_vec()
    };
    debug!("Read {} bytes from {} at offset {}", data.len(), path, offset);

    let mut table = BufferTable::new(false);
    table.set_number_format(settings.number_format);
    table.replace(fetch::raw_contents(data, columns));

    print_table(&table, rows)?;
    Ok(())
}

fn print_table(table: &BufferTable, max_rows: u32) -> Result<()> {
    let rows = table.row_count().min(max_rows);
    let cols = table.column_count();

    let headers: Vec<String> = (0..cols).map(|c| table.header(c).unwrap_or_default()).collect();
    let cells: Vec<Vec<String>> = (0..rows)
        .map(|r| (0..cols).map(|c| table.cell(r, c).unwrap_or_default()).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let mut out = BufWriter::new(io::stdout().lock());
    write!(out, "{:>6}", "row")?;
    for (h, w) in headers.iter().zip(&widths) {
        write!(out, "  {:>w$}", h, w = *w)?;
    }
    writeln!(out)?;

    for (r, row) in cells.iter().enumerate() {
        write!(out, "{:>6}", r)?;
        for (cell, w) in row.iter().zip(&widths) {
            write!(out, "  {:>w$}", cell, w = *w)?;
        }
        writeln!(out)?;
    }

    if table.row_count() > rows {
        writeln!(out, "... {} more rows", table.row_count() - rows)?;
    }
    out.flush()?;
    Ok(())
}

fn cmd_settings() -> Result<()> {
    match Settings::path() {
        Some(p) => println!("path: {}", p.display()),
        None => println!("path: (no config dir)"),
    }
    let settings = Settings::load();
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}
