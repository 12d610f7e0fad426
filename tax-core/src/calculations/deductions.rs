//! Deduction aggregation.
//!
//! | Component                 | Rule |
//! |---------------------------|------|
//! | Pension fund              | salary × pension fund rate for (organization, employment type) |
//! | Child education allowance | married: allowance × children |
//! | Sponsored schooling       | married with children in school: limit × children |
//! | Insurance premium         | min(salary × premium rate, premium limit) |
//! | Donation                  | min(salary × donation rate, salary × 5%) |
//! | Dividend allowance        | dividends above the threshold |
//! | Rental                    | rental income × rental rate |
//!
//! Every component is independent of the others and non-negative for
//! non-negative inputs, so the total needs no floor.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::{ConfigurationError, DeductionBreakdown, RuleTables, TaxpayerRecord};

/// Hard cap on the donation deduction as a fraction of salary.
///
/// Equal to the standard `donation_limit_rate`, which makes the donation
/// `min` a no-op with the built-in rules.
const DONATION_CAP_RATE: Decimal = dec!(0.05);

/// Computes every deduction component for `record`.
///
/// # Errors
///
/// [`ConfigurationError`] if the pension fund table has no rate for the
/// record's organization and employment type.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::compute_deductions;
/// use tax_core::{EmploymentType, MaritalStatus, Organization, RuleTables, TaxpayerRecord};
///
/// let record = TaxpayerRecord {
///     name: "Pema".to_string(),
///     age: 40,
///     salary: dec!(2000000),
///     organization: Organization::Private,
///     employment_type: EmploymentType::Regular,
///     marital_status: MaritalStatus::Single,
///     num_children: 0,
///     children_in_school: false,
///     rental_income: dec!(100000),
///     dividend_income: dec!(50000),
/// };
///
/// let breakdown = compute_deductions(&record, &RuleTables::standard()).unwrap();
/// assert_eq!(breakdown.total(), dec!(440000));
/// ```
pub fn compute_deductions(
    record: &TaxpayerRecord,
    rules: &RuleTables,
) -> Result<DeductionBreakdown, ConfigurationError> {
    let breakdown = DeductionBreakdown {
        pension_fund: pension_fund(record, rules)?,
        child_education_allowance: child_education_allowance(record, rules),
        sponsored_schooling: sponsored_schooling(record, rules),
        insurance_premium: insurance_premium(record.salary, rules),
        donation: donation(record.salary, rules),
        dividend_allowance: dividend_allowance(record.dividend_income, rules),
        rental: rental(record.rental_income, rules),
    };

    debug!(?breakdown, total = %breakdown.total(), "deductions computed");

    Ok(breakdown)
}

fn pension_fund(
    record: &TaxpayerRecord,
    rules: &RuleTables,
) -> Result<Decimal, ConfigurationError> {
    let rate = rules.pension_fund_rate(record.organization, record.employment_type)?;
    Ok(record.salary * rate)
}

fn child_education_allowance(
    record: &TaxpayerRecord,
    rules: &RuleTables,
) -> Decimal {
    if !record.marital_status.is_married() {
        return Decimal::ZERO;
    }
    rules.education_allowance * Decimal::from(record.num_children)
}

fn sponsored_schooling(
    record: &TaxpayerRecord,
    rules: &RuleTables,
) -> Decimal {
    if !record.marital_status.is_married() || !record.children_in_school {
        return Decimal::ZERO;
    }
    rules.sponsored_child_education_limit * Decimal::from(record.num_children)
}

fn insurance_premium(
    salary: Decimal,
    rules: &RuleTables,
) -> Decimal {
    (salary * rules.insurance_premium_rate).min(rules.insurance_premium_limit)
}

fn donation(
    salary: Decimal,
    rules: &RuleTables,
) -> Decimal {
    (salary * rules.donation_limit_rate).min(salary * DONATION_CAP_RATE)
}

fn dividend_allowance(
    dividend_income: Decimal,
    rules: &RuleTables,
) -> Decimal {
    if dividend_income > rules.dividend_allowance_threshold {
        dividend_income - rules.dividend_allowance_threshold
    } else {
        Decimal::ZERO
    }
}

fn rental(
    rental_income: Decimal,
    rules: &RuleTables,
) -> Decimal {
    rental_income * rules.rental_deduction_rate
}
