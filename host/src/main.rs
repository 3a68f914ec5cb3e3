//! X12 File Parser Host Application
//!
//! Parses X12 files with chunked reading, validates the envelope structure
//! and prints a summary of every interchange, functional group and
//! transaction set.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use x12_envelope::Interchange;
use x12_host::{ParseConfig, ParseStatistics, TextEncoding, X12Parser, DEFAULT_CHUNK_SIZE};

/// Result type for the command
type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Parse and validate X12 files of any size
#[derive(Parser, Debug)]
#[command(name = "x12-parse", version, about)]
struct Cli {
    /// X12 file to parse
    file: PathBuf,

    /// Bytes read from the file per chunk
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Encoding used when the file has no byte-order mark
    #[arg(long, default_value = "ascii", value_parser = parse_encoding)]
    encoding: TextEncoding,
}

fn parse_encoding(label: &str) -> std::result::Result<TextEncoding, String> {
    TextEncoding::for_label(label).ok_or_else(|| format!("unknown encoding label: {label}"))
}

/// Format bytes in human-readable form
fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

fn print_statistics(stats: &ParseStatistics, seconds: f64) {
    println!("Statistics:");
    println!("  Bytes read:        {}", format_bytes(stats.bytes_read));
    println!("  Reads:             {}", stats.chunks_read);
    println!("  Segments parsed:   {}", stats.segments_parsed);
    println!("  Max buffer size:   {}", format_bytes(stats.max_buffer_size as u64));
    println!("  Parse time:        {:.2}s", seconds);
}

fn print_interchange(interchange: &Interchange) {
    println!(
        "Interchange {}  {} -> {}  (version {}, {} {})",
        interchange.control_number(),
        interchange.sender_id(),
        interchange.receiver_id(),
        interchange.version(),
        interchange.date(),
        interchange.time(),
    );

    for group in interchange.functional_groups() {
        println!(
            "  Group {}  {} -> {}  (version {})",
            group.control_number(),
            group.sender_id(),
            group.receiver_id(),
            group.version(),
        );

        for set in group.transaction_sets() {
            println!(
                "    {} #{}  {} segments",
                set.document_type(),
                set.control_number(),
                set.segment_count(),
            );
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut parser = X12Parser::new(ParseConfig {
        chunk_size: cli.chunk_size,
        encoding: cli.encoding,
    })?;

    let config = parser.config();
    println!("Parsing X12 file: {}", cli.file.display());
    println!(
        "  Chunk size: {}, fallback encoding: {}",
        format_bytes(config.chunk_size as u64),
        config.encoding.name()
    );
    println!();

    let start = Instant::now();
    let interchanges = parser.parse_file(&cli.file)?;
    let duration = start.elapsed();

    println!("=== Parsing Complete ===");
    println!();
    print_statistics(parser.statistics(), duration.as_secs_f64());
    println!();

    for interchange in &interchanges {
        print_interchange(interchange);
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
