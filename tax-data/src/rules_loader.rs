//! TOML rules file.
//!
//! Every key is optional; anything left out keeps the built-in value from
//! [`RuleTables::standard`]. Rate tables, when present, replace the built-in
//! table as a whole.
//!
//! ```toml
//! min_taxable_age = 18
//! min_taxable_income = 300000
//! surcharge_threshold = 1000000
//! surcharge_rate = 0.10
//!
//! [[brackets]]
//! lower_bound = 0
//! upper_bound = 300000
//! rate = 0
//!
//! [[brackets]]
//! lower_bound = 300001
//! rate = 0.10
//!
//! [pension_fund_rate.Government]
//! Regular = 0.05
//! Contract = 0
//!
//! [bonus_rate]
//! Government = 0.05
//! Private = 0.10
//! Corporate = 0.07
//! ```
//!
//! Organization and employment type keys are matched case-insensitively.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{EmploymentType, Organization, RuleTables, RuleTablesError, TaxBracket};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading a rules file.
#[derive(Debug, Error)]
pub enum RulesLoaderError {
    #[error("cannot read rules file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("TOML parse error: {0}")]
    Toml(String),

    #[error("unknown organization '{0}'")]
    UnknownOrganization(String),

    #[error("unknown employment type '{employment_type}' for {organization}")]
    UnknownEmploymentType {
        organization: Organization,
        employment_type: String,
    },

    #[error("{table}: organization '{key}' appears more than once")]
    DuplicateOrganization { table: &'static str, key: String },

    #[error("pension_fund_rate.{organization}: employment type '{employment_type}' appears more than once")]
    DuplicateEmploymentType {
        organization: Organization,
        employment_type: String,
    },

    #[error("invalid rule tables: {0}")]
    Invalid(#[from] RuleTablesError),
}

impl From<toml::de::Error> for RulesLoaderError {
    fn from(err: toml::de::Error) -> Self {
        RulesLoaderError::Toml(err.to_string())
    }
}

/// On-disk layout. Map keys stay strings until they are checked against the
/// enums, so a typo is reported by name.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RulesFile {
    min_taxable_age: Option<u32>,
    min_taxable_income: Option<Decimal>,
    brackets: Option<Vec<TaxBracket>>,
    surcharge_threshold: Option<Decimal>,
    surcharge_rate: Option<Decimal>,
    education_allowance: Option<Decimal>,
    sponsored_child_education_limit: Option<Decimal>,
    insurance_premium_rate: Option<Decimal>,
    insurance_premium_limit: Option<Decimal>,
    donation_limit_rate: Option<Decimal>,
    dividend_allowance_threshold: Option<Decimal>,
    rental_deduction_rate: Option<Decimal>,
    pension_fund_rate: Option<BTreeMap<String, BTreeMap<String, Decimal>>>,
    bonus_rate: Option<BTreeMap<String, Decimal>>,
}

/// Loader for TOML rules files.
pub struct RulesLoader;

impl RulesLoader {
    /// Parse `input` and overlay it on the built-in rules.
    ///
    /// # Errors
    ///
    /// * [`RulesLoaderError::Toml`] for malformed TOML or unknown keys.
    /// * [`RulesLoaderError::UnknownOrganization`] /
    ///   [`RulesLoaderError::UnknownEmploymentType`] for bad table keys.
    /// * [`RulesLoaderError::Invalid`] if the merged rules fail
    ///   [`RuleTables::validate`].
    pub fn from_toml_str(input: &str) -> Result<RuleTables, RulesLoaderError> {
        let file: RulesFile = toml::from_str(input)?;
        let rules = merge(RuleTables::standard(), file)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Read `path` and delegate to [`RulesLoader::from_toml_str`].
    pub fn from_toml_file(path: &Path) -> Result<RuleTables, RulesLoaderError> {
        let contents = fs::read_to_string(path).map_err(|e| RulesLoaderError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let rules = Self::from_toml_str(&contents)?;
        info!(path = %path.display(), "loaded rules file");
        Ok(rules)
    }
}

fn merge(
    base: RuleTables,
    file: RulesFile,
) -> Result<RuleTables, RulesLoaderError> {
    let pension_fund_rate = match file.pension_fund_rate {
        Some(table) => parse_pension_table(table)?,
        None => base.pension_fund_rate,
    };
    let bonus_rate = match file.bonus_rate {
        Some(table) => parse_bonus_table(table)?,
        None => base.bonus_rate,
    };

    Ok(RuleTables {
        min_taxable_age: file.min_taxable_age.unwrap_or(base.min_taxable_age),
        min_taxable_income: file.min_taxable_income.unwrap_or(base.min_taxable_income),
        brackets: file.brackets.unwrap_or(base.brackets),
        surcharge_threshold: file.surcharge_threshold.unwrap_or(base.surcharge_threshold),
        surcharge_rate: file.surcharge_rate.unwrap_or(base.surcharge_rate),
        education_allowance: file.education_allowance.unwrap_or(base.education_allowance),
        sponsored_child_education_limit: file
            .sponsored_child_education_limit
            .unwrap_or(base.sponsored_child_education_limit),
        insurance_premium_rate: file
            .insurance_premium_rate
            .unwrap_or(base.insurance_premium_rate),
        insurance_premium_limit: file
            .insurance_premium_limit
            .unwrap_or(base.insurance_premium_limit),
        donation_limit_rate: file.donation_limit_rate.unwrap_or(base.donation_limit_rate),
        dividend_allowance_threshold: file
            .dividend_allowance_threshold
            .unwrap_or(base.dividend_allowance_threshold),
        rental_deduction_rate: file
            .rental_deduction_rate
            .unwrap_or(base.rental_deduction_rate),
        pension_fund_rate,
        bonus_rate,
    })
}

fn parse_organization(key: &str) -> Result<Organization, RulesLoaderError> {
    Organization::parse(key).ok_or_else(|| RulesLoaderError::UnknownOrganization(key.to_string()))
}

fn parse_pension_table(
    table: BTreeMap<String, BTreeMap<String, Decimal>>
) -> Result<BTreeMap<Organization, BTreeMap<EmploymentType, Decimal>>, RulesLoaderError> {
    let mut parsed = BTreeMap::new();

    for (org_key, by_type) in table {
        let organization = parse_organization(&org_key)?;
        let mut rates = BTreeMap::new();

        for (type_key, rate) in by_type {
            let employment_type = EmploymentType::parse(&type_key).ok_or_else(|| {
                RulesLoaderError::UnknownEmploymentType {
                    organization,
                    employment_type: type_key.clone(),
                }
            })?;
            if rates.insert(employment_type, rate).is_some() {
                return Err(RulesLoaderError::DuplicateEmploymentType {
                    organization,
                    employment_type: type_key,
                });
            }
        }

        debug!(%organization, entries = rates.len(), "pension fund rates");
        if parsed.insert(organization, rates).is_some() {
            return Err(RulesLoaderError::DuplicateOrganization {
                table: "pension_fund_rate",
                key: org_key,
            });
        }
    }

    Ok(parsed)
}

fn parse_bonus_table(
    table: BTreeMap<String, Decimal>
) -> Result<BTreeMap<Organization, Decimal>, RulesLoaderError> {
    let mut parsed = BTreeMap::new();

    for (key, rate) in table {
        if parsed.insert(parse_organization(&key)?, rate).is_some() {
            return Err(RulesLoaderError::DuplicateOrganization {
                table: "bonus_rate",
                key,
            });
        }
    }

    Ok(parsed)
}
