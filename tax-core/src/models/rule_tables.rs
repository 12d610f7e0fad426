//! Fixed policy parameters for the income tax computation.
//!
//! A [`RuleTables`] value is built once at startup (either
//! [`RuleTables::standard`] or loaded from a file and checked with
//! [`RuleTables::validate`]) and then only ever borrowed.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{EmploymentType, Organization, TaxBracket, TaxpayerRecord};

/// A rate-table lookup failed for a key combination the validator should
/// never have let through.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("no pension fund rate configured for {organization} / {employment_type}")]
    MissingPensionFundRate {
        organization: Organization,
        employment_type: EmploymentType,
    },

    #[error("no bonus rate configured for {organization}")]
    MissingBonusRate { organization: Organization },
}

/// Structural problems with a set of rule parameters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleTablesError {
    #[error("{name} must be between 0 and 1, got {rate}")]
    RateOutOfRange { name: String, rate: Decimal },

    #[error("{name} must be non-negative, got {value}")]
    NegativeAmount { name: String, value: Decimal },

    #[error("{name} must not exceed {max}, got {value}")]
    AmountTooLarge {
        name: String,
        value: Decimal,
        max: Decimal,
    },

    #[error("no tax brackets configured")]
    NoBrackets,

    #[error("bracket {index}: lower bound {lower} is not below upper bound {upper}")]
    InvertedBracket {
        index: usize,
        lower: Decimal,
        upper: Decimal,
    },

    #[error("bracket {index}: lower bound {lower} does not follow previous upper bound {previous_upper}")]
    NotContiguous {
        index: usize,
        previous_upper: Decimal,
        lower: Decimal,
    },

    #[error("bracket {index} is unbounded but is not the last bracket")]
    UnboundedBracketNotLast { index: usize },

    #[error("the top bracket must be unbounded")]
    BoundedTopBracket,

    #[error(transparent)]
    MissingRate(#[from] ConfigurationError),
}

/// Read-only policy parameters consumed by the tax engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTables {
    /// Taxpayers younger than this owe nothing.
    pub min_taxable_age: u32,

    /// Taxable income below this owes nothing.
    pub min_taxable_income: Decimal,

    /// Progressive schedule, ascending, ending in an unbounded bracket.
    pub brackets: Vec<TaxBracket>,

    /// Compared against tax payable, not income.
    pub surcharge_threshold: Decimal,
    pub surcharge_rate: Decimal,

    /// Per-child education allowance for married taxpayers.
    pub education_allowance: Decimal,

    /// Per-child sponsored schooling deduction, married taxpayers with
    /// children in school only.
    pub sponsored_child_education_limit: Decimal,

    pub insurance_premium_rate: Decimal,
    pub insurance_premium_limit: Decimal,

    /// Fraction of salary deductible as donations.
    pub donation_limit_rate: Decimal,

    /// Dividends above this amount are added to deductions.
    pub dividend_allowance_threshold: Decimal,

    pub rental_deduction_rate: Decimal,

    pub pension_fund_rate: BTreeMap<Organization, BTreeMap<EmploymentType, Decimal>>,
    pub bonus_rate: BTreeMap<Organization, Decimal>,
}

impl RuleTables {
    /// The built-in rule set.
    pub fn standard() -> Self {
        let brackets = vec![
            TaxBracket::new(dec!(0), Some(dec!(300000)), dec!(0)),
            TaxBracket::new(dec!(300001), Some(dec!(400000)), dec!(0.10)),
            TaxBracket::new(dec!(400001), Some(dec!(650000)), dec!(0.15)),
            TaxBracket::new(dec!(650001), Some(dec!(1000000)), dec!(0.20)),
            TaxBracket::new(dec!(1000001), Some(dec!(1500000)), dec!(0.25)),
            TaxBracket::new(dec!(1500001), None, dec!(0.30)),
        ];

        let pension_fund_rate = BTreeMap::from([
            (
                Organization::Government,
                BTreeMap::from([
                    (EmploymentType::Regular, dec!(0.05)),
                    (EmploymentType::Contract, dec!(0)),
                ]),
            ),
            (
                Organization::Private,
                BTreeMap::from([
                    (EmploymentType::Regular, dec!(0.10)),
                    (EmploymentType::Contract, dec!(0.10)),
                ]),
            ),
            (
                Organization::Corporate,
                BTreeMap::from([
                    (EmploymentType::Regular, dec!(0.10)),
                    (EmploymentType::Contract, dec!(0.10)),
                ]),
            ),
        ]);

        let bonus_rate = BTreeMap::from([
            (Organization::Government, dec!(0.05)),
            (Organization::Private, dec!(0.10)),
            (Organization::Corporate, dec!(0.07)),
        ]);

        Self {
            min_taxable_age: 18,
            min_taxable_income: dec!(300000),
            brackets,
            surcharge_threshold: dec!(1000000),
            surcharge_rate: dec!(0.10),
            education_allowance: dec!(350000),
            sponsored_child_education_limit: dec!(350000),
            insurance_premium_rate: dec!(0.10),
            insurance_premium_limit: dec!(100000),
            donation_limit_rate: dec!(0.05),
            dividend_allowance_threshold: dec!(30000),
            rental_deduction_rate: dec!(0.20),
            pension_fund_rate,
            bonus_rate,
        }
    }

    /// Pension fund contribution rate for an employer/employment pair.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::MissingPensionFundRate`] if the pair is absent.
    pub fn pension_fund_rate(
        &self,
        organization: Organization,
        employment_type: EmploymentType,
    ) -> Result<Decimal, ConfigurationError> {
        self.pension_fund_rate
            .get(&organization)
            .and_then(|by_type| by_type.get(&employment_type))
            .copied()
            .ok_or(ConfigurationError::MissingPensionFundRate {
                organization,
                employment_type,
            })
    }

    /// Bonus rate, as a fraction of base salary, for an employer type.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::MissingBonusRate`] if the employer is absent.
    pub fn bonus_rate(
        &self,
        organization: Organization,
    ) -> Result<Decimal, ConfigurationError> {
        self.bonus_rate
            .get(&organization)
            .copied()
            .ok_or(ConfigurationError::MissingBonusRate { organization })
    }

    /// Checks the parameters for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns the first [`RuleTablesError`] found:
    /// - any rate outside [0, 1]
    /// - any amount below zero or above [`TaxpayerRecord::MAX_AMOUNT`]
    /// - an empty, unordered, overlapping or gapped bracket schedule, or one
    ///   whose top bracket is bounded
    /// - a missing rate for an employer/employment pair a validated taxpayer
    ///   can have
    pub fn validate(&self) -> Result<(), RuleTablesError> {
        check_rate("surcharge_rate", self.surcharge_rate)?;
        check_rate("insurance_premium_rate", self.insurance_premium_rate)?;
        check_rate("donation_limit_rate", self.donation_limit_rate)?;
        check_rate("rental_deduction_rate", self.rental_deduction_rate)?;

        check_amount("min_taxable_income", self.min_taxable_income)?;
        check_amount("surcharge_threshold", self.surcharge_threshold)?;
        check_amount("education_allowance", self.education_allowance)?;
        check_amount(
            "sponsored_child_education_limit",
            self.sponsored_child_education_limit,
        )?;
        check_amount("insurance_premium_limit", self.insurance_premium_limit)?;
        check_amount(
            "dividend_allowance_threshold",
            self.dividend_allowance_threshold,
        )?;

        self.validate_brackets()?;

        for organization in Organization::all() {
            let bonus = self.bonus_rate(*organization)?;
            check_rate(&format!("bonus_rate.{organization}"), bonus)?;

            for employment_type in permitted_employment_types(*organization) {
                let rate = self.pension_fund_rate(*organization, *employment_type)?;
                check_rate(
                    &format!("pension_fund_rate.{organization}.{employment_type}"),
                    rate,
                )?;
            }
        }

        Ok(())
    }

    fn validate_brackets(&self) -> Result<(), RuleTablesError> {
        let last_index = match self.brackets.len() {
            0 => return Err(RuleTablesError::NoBrackets),
            n => n - 1,
        };

        let mut previous_upper: Option<Decimal> = None;

        for (index, bracket) in self.brackets.iter().enumerate() {
            check_rate(&format!("brackets[{index}].rate"), bracket.rate)?;
            check_amount(&format!("brackets[{index}].lower_bound"), bracket.lower_bound)?;
            if let Some(upper) = bracket.upper_bound {
                check_amount(&format!("brackets[{index}].upper_bound"), upper)?;
            }

            if let Some(previous_upper) = previous_upper {
                let step = bracket.lower_bound - previous_upper;
                if step != Decimal::ZERO && step != Decimal::ONE {
                    return Err(RuleTablesError::NotContiguous {
                        index,
                        previous_upper,
                        lower: bracket.lower_bound,
                    });
                }
            }

            match bracket.upper_bound {
                Some(upper) if upper <= bracket.lower_bound => {
                    return Err(RuleTablesError::InvertedBracket {
                        index,
                        lower: bracket.lower_bound,
                        upper,
                    });
                }
                Some(_) if index == last_index => {
                    return Err(RuleTablesError::BoundedTopBracket);
                }
                None if index != last_index => {
                    return Err(RuleTablesError::UnboundedBracketNotLast { index });
                }
                _ => {}
            }

            previous_upper = bracket.upper_bound;
        }

        Ok(())
    }
}

impl Default for RuleTables {
    fn default() -> Self {
        Self::standard()
    }
}

/// Employment types a validated record can carry for `organization`.
fn permitted_employment_types(organization: Organization) -> &'static [EmploymentType] {
    if organization.forces_regular_employment() {
        &[EmploymentType::Regular]
    } else {
        EmploymentType::all()
    }
}

fn check_rate(
    name: &str,
    rate: Decimal,
) -> Result<(), RuleTablesError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(RuleTablesError::RateOutOfRange {
            name: name.to_string(),
            rate,
        });
    }
    Ok(())
}

fn check_amount(
    name: &str,
    value: Decimal,
) -> Result<(), RuleTablesError> {
    if value < Decimal::ZERO {
        return Err(RuleTablesError::NegativeAmount {
            name: name.to_string(),
            value,
        });
    }
    if value > TaxpayerRecord::MAX_AMOUNT {
        return Err(RuleTablesError::AmountTooLarge {
            name: name.to_string(),
            value,
            max: TaxpayerRecord::MAX_AMOUNT,
        });
    }
    Ok(())
}
