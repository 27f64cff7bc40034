//! secure-xor - securely XOR files to standard output.
//!
//! At most one octet of each input is held in memory at a time.

use anyhow::Context;
use clap::{ArgAction, Parser};
use log::LevelFilter;
use secure_xor::config::{DEFAULT_LOG_FILTER, LOG_ENV};
use secure_xor::{combine, handle, Mode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "secure-xor")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Securely XOR files to STDOUT",
    long_about = "XOR the inputs together one octet at a time and write the result to STDOUT. \
                  At most one octet of each input is ever held in memory."
)]
struct Cli {
    /// Path to an input FILE; `-` means STDIN
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Output as many bytes as the longest input; for FIFO-like FILEs, output is infinite
    #[arg(short, long)]
    longest: bool,

    /// Log more detail to stderr (repeat for more)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{:#}", e);
        std::process::exit(exit_code(&e));
    }
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().filter_or(LOG_ENV, DEFAULT_LOG_FILTER));

    match verbose {
        0 => {}
        1 => {
            builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(LevelFilter::Trace);
        }
    }

    builder.init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut inputs = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let input = handle::open_input(path).with_context(|| path.display().to_string())?;
        inputs.push(input);
    }

    let mut output = handle::stdout().context("stdout")?;
    let mode = Mode::from_longest(cli.longest);

    combine(&mut output, &mut inputs, mode).context("xor")?;

    Ok(())
}

/// The errno behind a failure, or 1 when there is none.
fn exit_code(e: &anyhow::Error) -> i32 {
    e.downcast_ref::<secure_xor::Error>()
        .map(secure_xor::Error::exit_code)
        .unwrap_or(1)
}
