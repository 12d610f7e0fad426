use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Why no tax is owed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExemptionReason {
    BelowMinAge,
    BelowMinIncome,
}

impl ExemptionReason {
    /// Human-readable sentence for the taxpayer.
    pub fn message(&self) -> &'static str {
        match self {
            Self::BelowMinAge => "You are below the minimum taxable age. No tax payable.",
            Self::BelowMinIncome => {
                "Your taxable income is below the minimum taxable limit. No tax payable."
            }
        }
    }
}

/// The individual deduction components, kept separate so they can be shown
/// to the taxpayer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionBreakdown {
    pub pension_fund: Decimal,
    pub child_education_allowance: Decimal,
    pub sponsored_schooling: Decimal,
    pub insurance_premium: Decimal,
    pub donation: Decimal,
    pub dividend_allowance: Decimal,
    pub rental: Decimal,
}

impl DeductionBreakdown {
    pub fn total(&self) -> Decimal {
        self.pension_fund
            + self.child_education_allowance
            + self.sponsored_schooling
            + self.insurance_premium
            + self.donation
            + self.dividend_allowance
            + self.rental
    }

    /// `(label, amount)` pairs in display order.
    pub fn components(&self) -> [(&'static str, Decimal); 7] {
        [
            ("Pension Fund", self.pension_fund),
            ("Child Education Allowance", self.child_education_allowance),
            ("Sponsored Schooling", self.sponsored_schooling),
            ("Insurance Premium", self.insurance_premium),
            ("Donation", self.donation),
            ("Dividend Allowance", self.dividend_allowance),
            ("Rental Deduction", self.rental),
        ]
    }
}

/// Full computation for a taxable record. Values are unrounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    pub gross_income: Decimal,
    pub deductions: Decimal,
    pub taxable_income: Decimal,
    pub tax_payable: Decimal,
    pub surcharge: Decimal,
    pub total_tax: Decimal,
    pub deduction_breakdown: DeductionBreakdown,
}

/// Outcome of running the engine on one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TaxOutcome {
    Taxable(TaxResult),
    Exempt { reason: ExemptionReason },
}

impl TaxOutcome {
    pub fn total_tax(&self) -> Decimal {
        match self {
            Self::Taxable(result) => result.total_tax,
            Self::Exempt { .. } => Decimal::ZERO,
        }
    }

    pub fn exemption(&self) -> Option<ExemptionReason> {
        match self {
            Self::Taxable(_) => None,
            Self::Exempt { reason } => Some(*reason),
        }
    }
}
