use std::fs::File;
use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{RuleTables, RuleTablesError, TaxBracket};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading a bracket schedule.
#[derive(Debug, Error)]
pub enum BracketLoaderError {
    #[error("cannot open bracket file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("bracket file contains no brackets")]
    Empty,

    #[error("invalid bracket schedule: {0}")]
    Invalid(#[from] RuleTablesError),
}

impl From<csv::Error> for BracketLoaderError {
    fn from(err: csv::Error) -> Self {
        BracketLoaderError::CsvParse(err.to_string())
    }
}

/// A single row of the bracket CSV file.
///
/// - `lower_bound`: first income amount in the bracket
/// - `upper_bound`: last income amount in the bracket (empty for the
///   unbounded top bracket)
/// - `rate`: marginal rate as a decimal (e.g. 0.15 for 15%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub lower_bound: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

impl From<&BracketRecord> for TaxBracket {
    fn from(record: &BracketRecord) -> Self {
        TaxBracket::new(record.lower_bound, record.upper_bound, record.rate)
    }
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for progressive bracket schedules stored as CSV.
///
/// ```csv
/// lower_bound,upper_bound,rate
/// 0,300000,0
/// 300001,400000,0.10
/// 400001,,0.15
/// ```
pub struct BracketLoader;

impl BracketLoader {
    /// Parse bracket records from a CSV reader, in file order.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRecord>, BracketLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        debug!(count = records.len(), "parsed bracket records");

        Ok(records)
    }

    /// Open `path` and parse it with [`BracketLoader::parse`].
    pub fn parse_file(path: &Path) -> Result<Vec<BracketRecord>, BracketLoaderError> {
        let file = File::open(path).map_err(|e| BracketLoaderError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(file)
    }

    /// Returns a copy of `rules` with its bracket schedule replaced by
    /// `records`.
    ///
    /// The result is validated as a whole, so a schedule that is out of
    /// order, overlapping, gapped or missing its unbounded top bracket is
    /// rejected.
    pub fn apply(
        rules: &RuleTables,
        records: &[BracketRecord],
    ) -> Result<RuleTables, BracketLoaderError> {
        if records.is_empty() {
            return Err(BracketLoaderError::Empty);
        }

        let updated = RuleTables {
            brackets: records.iter().map(TaxBracket::from).collect(),
            ..rules.clone()
        };
        updated.validate()?;

        info!(brackets = updated.brackets.len(), "bracket schedule replaced");

        Ok(updated)
    }
}
