use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{EmploymentType, MaritalStatus, Organization};

/// A single taxpayer snapshot, as handed to the tax engine.
///
/// Records are expected to come out of an input validator: monetary values
/// are non-negative, `employment_type` is `Regular` for private and corporate
/// employers, and the children fields are zero/false unless the taxpayer is
/// married.
///
/// Monetary values are expected to be at most [`TaxpayerRecord::MAX_AMOUNT`].
/// Within that bound no step of the engine can overflow `Decimal`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxpayerRecord {
    /// Display only.
    pub name: String,
    pub age: u32,

    /// Annual base salary.
    pub salary: Decimal,
    pub organization: Organization,
    pub employment_type: EmploymentType,
    pub marital_status: MaritalStatus,
    pub num_children: u32,
    pub children_in_school: bool,

    pub rental_income: Decimal,
    pub dividend_income: Decimal,
}

impl TaxpayerRecord {
    /// Largest salary, rental or dividend amount accepted from a taxpayer,
    /// and the largest amount a rule table may carry.
    pub const MAX_AMOUNT: Decimal = dec!(1000000000000000);
}
