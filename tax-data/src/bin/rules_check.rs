use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tax_core::RuleTables;
use tax_data::{BracketLoader, RulesLoader};

/// Check a rules file and/or bracket schedule and print the resulting rules.
///
/// The bracket CSV file should have the following columns:
/// - lower_bound: first income amount in the bracket
/// - upper_bound: last income amount in the bracket (empty for unlimited)
/// - rate: the marginal tax rate as a decimal (e.g., 0.10)
#[derive(Parser, Debug)]
#[command(name = "tax-rules-check")]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML rules file overriding the built-in parameters
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// CSV file replacing the bracket schedule
    #[arg(short, long)]
    brackets: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut rules = match &args.rules {
        Some(path) => {
            println!("Loading rules from: {}", path.display());
            RulesLoader::from_toml_file(path)
                .with_context(|| format!("Failed to load rules: {}", path.display()))?
        }
        None => RuleTables::standard(),
    };

    if let Some(path) = &args.brackets {
        println!("Loading brackets from: {}", path.display());
        let records = BracketLoader::parse_file(path)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        println!("Parsed {} records from CSV", records.len());
        rules = BracketLoader::apply(&rules, &records)
            .with_context(|| format!("Invalid bracket schedule: {}", path.display()))?;
    }

    println!("Rules are valid.");
    println!();
    println!("Minimum taxable age:    {}", rules.min_taxable_age);
    println!("Minimum taxable income: {}", rules.min_taxable_income);
    println!(
        "Surcharge:              {} above tax payable of {}",
        rules.surcharge_rate, rules.surcharge_threshold
    );
    println!("Brackets:");
    for bracket in &rules.brackets {
        match bracket.upper_bound {
            Some(upper) => println!("  {:>12} - {:<12} {}", bracket.lower_bound, upper, bracket.rate),
            None => println!("  {:>12} +{:<13} {}", bracket.lower_bound, "", bracket.rate),
        }
    }

    Ok(())
}
