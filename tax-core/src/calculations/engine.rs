//! The tax engine: one pass from a taxpayer record to a [`TaxOutcome`].
//!
//! # Steps
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Age below the minimum taxable age: exempt |
//! | 2    | Gross income = salary + salary × bonus rate + rental + dividends |
//! | 3    | Deductions (see [`super::deductions`]) |
//! | 4    | Taxable income = gross income − deductions (not floored) |
//! | 5    | Taxable income below the minimum taxable income: exempt |
//! | 6    | Tax payable from the bracket schedule |
//! | 7    | Surcharge = tax payable × surcharge rate, once tax payable reaches the threshold |
//! | 8    | Total tax = tax payable + surcharge |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::{
//!     EmploymentType, MaritalStatus, Organization, RuleTables, TaxEngine, TaxOutcome,
//!     TaxpayerRecord,
//! };
//!
//! let rules = RuleTables::standard();
//! let record = TaxpayerRecord {
//!     name: "Pema".to_string(),
//!     age: 40,
//!     salary: dec!(2000000),
//!     organization: Organization::Private,
//!     employment_type: EmploymentType::Regular,
//!     marital_status: MaritalStatus::Single,
//!     num_children: 0,
//!     children_in_school: false,
//!     rental_income: dec!(100000),
//!     dividend_income: dec!(50000),
//! };
//!
//! let outcome = TaxEngine::new(&rules).calculate(&record).unwrap();
//!
//! let TaxOutcome::Taxable(result) = outcome else {
//!     panic!("expected a taxable result");
//! };
//! assert_eq!(result.taxable_income, dec!(1910000));
//! assert_eq!(result.total_tax, dec!(365500.5));
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use super::{compute_deductions, compute_tax_payable};
use crate::{ConfigurationError, ExemptionReason, RuleTables, TaxOutcome, TaxResult, TaxpayerRecord};

/// Calculator bound to one set of rule tables.
///
/// Holds only a shared borrow of the rules, so one engine (or many) can be
/// used from several threads at once.
#[derive(Debug, Clone, Copy)]
pub struct TaxEngine<'a> {
    rules: &'a RuleTables,
}

impl<'a> TaxEngine<'a> {
    pub fn new(rules: &'a RuleTables) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'a RuleTables {
        self.rules
    }

    /// Runs the full computation for `record`.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError`] when the rule tables have no bonus or pension
    /// fund rate for the record's organization and employment type. A record
    /// that passed input validation against complete tables never hits this.
    pub fn calculate(
        &self,
        record: &TaxpayerRecord,
    ) -> Result<TaxOutcome, ConfigurationError> {
        if record.age < self.rules.min_taxable_age {
            debug!(age = record.age, "below minimum taxable age");
            return Ok(exempt(ExemptionReason::BelowMinAge));
        }

        let gross_income = self.gross_income(record)?;
        let deduction_breakdown = compute_deductions(record, self.rules)?;
        let deductions = deduction_breakdown.total();
        let taxable_income = gross_income - deductions;

        debug!(%gross_income, %deductions, %taxable_income, "income computed");

        if taxable_income < self.rules.min_taxable_income {
            debug!(%taxable_income, "below minimum taxable income");
            return Ok(exempt(ExemptionReason::BelowMinIncome));
        }

        let tax_payable = compute_tax_payable(taxable_income, &self.rules.brackets);
        let surcharge = self.surcharge(tax_payable);
        let total_tax = tax_payable + surcharge;

        debug!(%tax_payable, %surcharge, %total_tax, "tax computed");

        Ok(TaxOutcome::Taxable(TaxResult {
            gross_income,
            deductions,
            taxable_income,
            tax_payable,
            surcharge,
            total_tax,
            deduction_breakdown,
        }))
    }

    /// Salary plus the employer bonus plus rental and dividend income.
    ///
    /// The bonus is a share of base salary only.
    pub fn gross_income(
        &self,
        record: &TaxpayerRecord,
    ) -> Result<Decimal, ConfigurationError> {
        let bonus_rate = self.rules.bonus_rate(record.organization)?;
        Ok(record.salary
            + record.salary * bonus_rate
            + record.rental_income
            + record.dividend_income)
    }

    /// Surcharge on `tax_payable`; zero below the threshold.
    pub fn surcharge(
        &self,
        tax_payable: Decimal,
    ) -> Decimal {
        compute_surcharge(tax_payable, self.rules)
    }
}

fn exempt(reason: ExemptionReason) -> TaxOutcome {
    TaxOutcome::Exempt { reason }
}

/// Surcharge levied on `tax_payable` once it reaches the surcharge threshold.
///
/// The threshold is compared against tax payable, not income.
pub fn compute_surcharge(
    tax_payable: Decimal,
    rules: &RuleTables,
) -> Decimal {
    if tax_payable >= rules.surcharge_threshold {
        tax_payable * rules.surcharge_rate
    } else {
        Decimal::ZERO
    }
}

/// Convenience wrapper around [`TaxEngine::calculate`].
///
/// # Errors
///
/// See [`TaxEngine::calculate`].
pub fn compute_tax(
    record: &TaxpayerRecord,
    rules: &RuleTables,
) -> Result<TaxOutcome, ConfigurationError> {
    TaxEngine::new(rules).calculate(record)
}

#[cfg(test)]
mod tests {
    use std::thread;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{EmploymentType, MaritalStatus, Organization};

    fn record() -> TaxpayerRecord {
        TaxpayerRecord {
            name: "Pema".to_string(),
            age: 40,
            salary: dec!(2000000),
            organization: Organization::Private,
            employment_type: EmploymentType::Regular,
            marital_status: MaritalStatus::Single,
            num_children: 0,
            children_in_school: false,
            rental_income: dec!(100000),
            dividend_income: dec!(50000),
        }
    }

    fn taxable(outcome: TaxOutcome) -> TaxResult {
        match outcome {
            TaxOutcome::Taxable(result) => result,
            other => panic!("expected taxable outcome, got {other:?}"),
        }
    }

    // =========================================================================
    // exemptions
    // =========================================================================

    #[test]
    fn age_seventeen_is_exempt_regardless_of_income() {
        let record = TaxpayerRecord {
            age: 17,
            salary: dec!(50000000),
            ..record()
        };

        assert_eq!(
            compute_tax(&record, &RuleTables::standard()),
            Ok(TaxOutcome::Exempt {
                reason: ExemptionReason::BelowMinAge
            })
        );
    }

    #[test]
    fn age_exemption_skips_rate_lookups() {
        let mut rules = RuleTables::standard();
        rules.bonus_rate.clear();
        let record = TaxpayerRecord {
            age: 10,
            ..record()
        };

        assert_eq!(
            compute_tax(&record, &rules).unwrap().exemption(),
            Some(ExemptionReason::BelowMinAge)
        );
    }

    #[test]
    fn age_eighteen_with_low_income_is_below_min_income() {
        let record = TaxpayerRecord {
            age: 18,
            salary: dec!(200000),
            rental_income: dec!(0),
            dividend_income: dec!(0),
            ..record()
        };

        assert_eq!(
            compute_tax(&record, &RuleTables::standard()).unwrap().exemption(),
            Some(ExemptionReason::BelowMinIncome)
        );
    }

    #[test]
    fn married_government_scenario_is_below_min_income() {
        let record = TaxpayerRecord {
            name: "Karma".to_string(),
            age: 30,
            salary: dec!(500000),
            organization: Organization::Government,
            employment_type: EmploymentType::Regular,
            marital_status: MaritalStatus::Married,
            num_children: 1,
            children_in_school: true,
            rental_income: dec!(0),
            dividend_income: dec!(0),
        };
        let rules = RuleTables::standard();
        let engine = TaxEngine::new(&rules);

        assert_eq!(engine.gross_income(&record), Ok(dec!(525000)));
        assert_eq!(
            engine.calculate(&record).unwrap().exemption(),
            Some(ExemptionReason::BelowMinIncome)
        );
    }

    // =========================================================================
    // full computation
    // =========================================================================

    #[test]
    fn single_private_scenario() {
        let result = taxable(compute_tax(&record(), &RuleTables::standard()).unwrap());

        assert_eq!(result.gross_income, dec!(2350000));
        assert_eq!(result.deductions, dec!(440000));
        assert_eq!(result.taxable_income, dec!(1910000));
        assert_eq!(result.tax_payable, dec!(365500.5));
        assert_eq!(result.surcharge, dec!(0));
        assert_eq!(result.total_tax, dec!(365500.5));
        assert_eq!(result.deduction_breakdown.total(), result.deductions);
    }

    #[test]
    fn taxable_income_exactly_at_minimum_is_taxed() {
        // gross 220000 + 162500, deductions 20000 + 20000 + 10000 + 32500
        let record = TaxpayerRecord {
            salary: dec!(200000),
            rental_income: dec!(162500),
            dividend_income: dec!(0),
            ..record()
        };
        let result = taxable(compute_tax(&record, &RuleTables::standard()).unwrap());

        assert_eq!(result.taxable_income, dec!(300000));
        assert_eq!(result.tax_payable, dec!(0));
        assert_eq!(result.total_tax, dec!(0));
    }

    #[test]
    fn high_earner_pays_surcharge() {
        let record = TaxpayerRecord {
            salary: dec!(5000000),
            rental_income: dec!(0),
            dividend_income: dec!(0),
            ..record()
        };
        let result = taxable(compute_tax(&record, &RuleTables::standard()).unwrap());

        // gross 5500000, deductions 500000 + 100000 + 250000 = 850000
        assert_eq!(result.taxable_income, dec!(4650000));
        assert!(result.tax_payable >= dec!(1000000));
        assert_eq!(result.surcharge, result.tax_payable * dec!(0.10));
        assert_eq!(result.total_tax, result.tax_payable + result.surcharge);
    }

    #[test]
    fn missing_bonus_rate_is_configuration_error() {
        let mut rules = RuleTables::standard();
        rules.bonus_rate.remove(&Organization::Private);

        assert_eq!(
            compute_tax(&record(), &rules),
            Err(ConfigurationError::MissingBonusRate {
                organization: Organization::Private
            })
        );
    }

    // =========================================================================
    // surcharge
    // =========================================================================

    #[test]
    fn surcharge_starts_exactly_at_threshold() {
        let rules = RuleTables::standard();
        let engine = TaxEngine::new(&rules);

        assert_eq!(engine.surcharge(dec!(999999.99)), dec!(0));
        assert_eq!(engine.surcharge(dec!(1000000)), dec!(100000));
        assert_eq!(engine.surcharge(dec!(1200000)), dec!(120000));
    }

    #[test]
    fn largest_accepted_amounts_do_not_overflow() {
        let max = TaxpayerRecord::MAX_AMOUNT;
        let rules = RuleTables {
            education_allowance: max,
            sponsored_child_education_limit: max,
            insurance_premium_limit: max,
            ..RuleTables::standard()
        };
        rules.validate().unwrap();

        let high_earner = TaxpayerRecord {
            salary: max,
            rental_income: max,
            dividend_income: max,
            ..record()
        };
        let result = taxable(compute_tax(&high_earner, &rules).unwrap());
        assert_eq!(result.gross_income, dec!(3100000000000000));
        assert_eq!(result.total_tax, result.tax_payable + result.surcharge);

        let large_family = TaxpayerRecord {
            marital_status: MaritalStatus::Married,
            num_children: u32::MAX,
            children_in_school: true,
            ..high_earner
        };
        assert_eq!(
            compute_tax(&large_family, &rules).unwrap(),
            exempt(ExemptionReason::BelowMinIncome)
        );
    }

    #[test]
    fn surcharge_follows_configured_threshold_and_rate() {
        let rules = RuleTables {
            surcharge_threshold: dec!(200000),
            surcharge_rate: dec!(0.05),
            ..RuleTables::standard()
        };

        assert_eq!(compute_surcharge(dec!(199999), &rules), dec!(0));
        assert_eq!(compute_surcharge(dec!(300000), &rules), dec!(15000));
    }

    // =========================================================================
    // concurrency
    // =========================================================================

    #[test]
    fn engine_can_be_shared_across_threads() {
        let rules = RuleTables::standard();
        let engine = TaxEngine::new(&rules);
        let expected = compute_tax(&record(), &rules).unwrap();

        thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| engine.calculate(&record()).unwrap()))
                .collect();

            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}
