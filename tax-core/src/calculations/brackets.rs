//! Progressive bracket apportionment.
//!
//! Income is taxed at each bracket's marginal rate only for the slice that
//! falls inside that bracket. The slice width is `upper_bound - lower_bound`
//! as written in the schedule; the unbounded top bracket absorbs whatever is
//! left.

use rust_decimal::Decimal;
use tracing::trace;

use crate::TaxBracket;

/// Computes the tax payable on `taxable_income` under `brackets`.
///
/// Brackets must be in ascending order and end in an unbounded bracket (see
/// [`crate::RuleTables::validate`]). Zero or negative income owes nothing.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::RuleTables;
/// use tax_core::calculations::compute_tax_payable;
///
/// let rules = RuleTables::standard();
///
/// // 300000 at 0%, 99999 at 10%, 1 at 15%
/// assert_eq!(compute_tax_payable(dec!(400000), &rules.brackets), dec!(10000.05));
/// ```
pub fn compute_tax_payable(
    taxable_income: Decimal,
    brackets: &[TaxBracket],
) -> Decimal {
    let mut tax_payable = Decimal::ZERO;
    let mut remaining = taxable_income;

    for bracket in brackets {
        if remaining <= Decimal::ZERO {
            break;
        }

        match bracket.band_width() {
            Some(width) if remaining > width => {
                tax_payable += width * bracket.rate;
                remaining -= width;
                trace!(%width, rate = %bracket.rate, %remaining, "filled bracket");
            }
            _ => {
                tax_payable += remaining * bracket.rate;
                trace!(slice = %remaining, rate = %bracket.rate, "final bracket");
                remaining = Decimal::ZERO;
            }
        }
    }

    tax_payable
}
