//! Glue between the command line, the rule loaders, the engine and the
//! report. Kept out of `main` so the whole run can be driven from tests with
//! in-memory streams.

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use tax_core::{ExemptionReason, RuleTables, TaxOutcome, compute_tax};
use tax_data::{BracketLoader, RulesLoader};
use tracing::{debug, info};

use crate::form::{Collected, TaxpayerForm};
use crate::prompt::Prompter;
use crate::report::{render_json, render_text};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Everything a run needs besides the I/O streams.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub rules: Option<PathBuf>,
    pub brackets: Option<PathBuf>,
    pub input: Option<PathBuf>,
    pub format: OutputFormat,
    pub breakdown: bool,
}

/// Built-in rules, optionally overlaid with a TOML rules file and then a CSV
/// bracket schedule.
pub fn load_rules(
    rules: Option<&Path>,
    brackets: Option<&Path>,
) -> Result<RuleTables> {
    let mut tables = match rules {
        Some(path) => RulesLoader::from_toml_file(path)
            .with_context(|| format!("Failed to load rules: {}", path.display()))?,
        None => RuleTables::standard(),
    };

    if let Some(path) = brackets {
        let records = BracketLoader::parse_file(path)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        debug!(count = records.len(), "bracket records parsed");
        tables = BracketLoader::apply(&tables, &records)
            .with_context(|| format!("Invalid bracket schedule: {}", path.display()))?;
    }

    Ok(tables)
}

/// Reads and validates a TOML taxpayer record file.
///
/// A taxpayer below `min_taxable_age` is exempt whatever the other answers
/// say, the same as in an interactive session.
pub fn load_record_file(
    path: &Path,
    min_taxable_age: u32,
) -> Result<Collected> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("cannot read input file '{}'", path.display()))?;
    let form: TaxpayerForm = toml::from_str(&contents)
        .with_context(|| format!("invalid input file '{}'", path.display()))?;
    let collected = form
        .collect(min_taxable_age)
        .with_context(|| format!("invalid answer in '{}'", path.display()))?;
    info!(path = %path.display(), name = %form.name.trim(), "loaded taxpayer record");
    Ok(collected)
}

/// Collects the taxpayer's answers, computes the outcome and writes the
/// report to `output`.
///
/// Without an input file the questions are asked on `output` and answered
/// from `input`.
pub fn run<R: BufRead, W: Write>(
    options: &RunOptions,
    input: R,
    output: &mut W,
) -> Result<TaxOutcome> {
    let rules = load_rules(options.rules.as_deref(), options.brackets.as_deref())?;

    let collected = match &options.input {
        Some(path) => load_record_file(path, rules.min_taxable_age)?,
        None => Prompter::new(input, &mut *output).collect(rules.min_taxable_age)?,
    };

    let outcome = match collected {
        Collected::Record(record) => {
            compute_tax(&record, &rules).context("incomplete rule tables")?
        }
        Collected::Exempt { .. } => TaxOutcome::Exempt {
            reason: ExemptionReason::BelowMinAge,
        },
    };
    info!(total_tax = %outcome.total_tax(), exemption = ?outcome.exemption(), "calculation finished");

    match options.format {
        OutputFormat::Text => render_text(&outcome, options.breakdown, output)?,
        OutputFormat::Json => render_json(&outcome, output)?,
    }

    Ok(outcome)
}
