use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing::debug;

use tax_cli::app::{self, OutputFormat, RunOptions};
use tax_cli::logging;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Personal income tax calculator.
///
/// Asks for the taxpayer's details (or reads them from a TOML record file),
/// applies the deductions, bracket schedule and surcharge, and prints the
/// tax payable.
#[derive(Debug, Parser)]
#[command(name = "income-tax", version, about)]
struct Cli {
    /// TOML rules file overriding the built-in parameters.
    #[arg(long)]
    rules: Option<PathBuf>,

    /// CSV file replacing the bracket schedule.
    #[arg(long)]
    brackets: Option<PathBuf>,

    /// TOML taxpayer record; skips the interactive questions.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Also list the individual deductions.
    #[arg(long)]
    breakdown: bool,

    /// Append log records to this file as well as stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level when `RUST_LOG` is not set.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init_logging(&cli.log_level, cli.log_file.as_deref())?;
    debug!(?cli, "starting");

    let options = RunOptions {
        rules: cli.rules,
        brackets: cli.brackets,
        input: cli.input,
        format: cli.format,
        breakdown: cli.breakdown,
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    app::run(&options, stdin.lock(), &mut stdout)?;

    Ok(())
}
