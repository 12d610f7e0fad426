mod organization;
mod rule_tables;
mod tax_bracket;
mod tax_result;
mod taxpayer;

pub use organization::{EmploymentType, MaritalStatus, Organization};
pub use rule_tables::{ConfigurationError, RuleTables, RuleTablesError};
pub use tax_bracket::TaxBracket;
pub use tax_result::{DeductionBreakdown, ExemptionReason, TaxOutcome, TaxResult};
pub use taxpayer::TaxpayerRecord;
