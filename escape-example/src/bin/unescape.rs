//! Translates unicode escapes in a file (or stdin) and writes the result.
//!
//! The copy loop plays the part of a tokenizer: it advances a shared
//! position over every character it takes, so malformed escapes are
//! reported at the line and column the consumer had reached.

use anyhow::{Context, Result};
use clap::Parser;
use common_framework::SharedPosition;
use escape_reader::{CharSource, UnicodeEscapeReader, Utf8Source};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "unescape")]
#[command(about = "Translate \\uXXXX unicode escapes into characters")]
#[command(version = "0.1.0")]
struct Args {
    /// Input file; reads stdin when absent or `-`
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file (optional, defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Only validate the escapes, write nothing
    #[arg(long)]
    check: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let directive = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let _ = fmt::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn open_input(args: &Args) -> Result<(String, Box<dyn Read>)> {
    match &args.input {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            Ok((path.display().to_string(), Box::new(file)))
        }
        _ => Ok(("<stdin>".to_string(), Box::new(io::stdin().lock()))),
    }
}

fn open_output(args: &Args) -> Result<Box<dyn Write>> {
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

/// Copies translated characters into `out`, advancing `position` past each
/// one. Returns the number of characters copied.
fn copy_translated<S: CharSource>(
    reader: &mut UnicodeEscapeReader<S>,
    position: &SharedPosition,
    mut out: Option<&mut dyn Write>,
) -> Result<usize> {
    let mut encoded = [0u8; 4];
    let mut count = 0;
    while let Some(ch) = reader.read_char()? {
        position.advance(ch);
        if let Some(out) = out.as_deref_mut() {
            out.write_all(ch.encode_utf8(&mut encoded).as_bytes())?;
        }
        count += 1;
    }
    Ok(count)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let (name, input) = open_input(&args)?;
    let position = SharedPosition::new();
    let mut reader = UnicodeEscapeReader::new(Utf8Source::new(input))
        .with_position_reporter(position.clone());

    let result = if args.check {
        copy_translated(&mut reader, &position, None)
    } else {
        let mut out = open_output(&args)?;
        copy_translated(&mut reader, &position, Some(&mut *out)).and_then(|count| {
            out.flush().context("failed to flush output")?;
            Ok(count)
        })
    };
    let count = result.with_context(|| format!("failed to translate {name}"))?;

    reader.close()?;
    tracing::debug!(input = %name, chars = count, "translation finished");
    Ok(())
}
