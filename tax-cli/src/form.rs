//! Validation of raw taxpayer answers.
//!
//! Every answer arrives as text (typed at a prompt or read from a record
//! file) and is checked here before a [`TaxpayerRecord`] is built. Nothing
//! that fails these checks ever reaches the tax engine.
//!
//! | Field                | Rule |
//! |----------------------|------|
//! | `age`                | whole number ≥ 0 |
//! | `salary`             | number ≥ 0 and ≤ `TaxpayerRecord::MAX_AMOUNT` |
//! | `organization`       | Government, Private or Corporate |
//! | `employment_type`    | Regular or Contract; forced to Regular for Private/Corporate |
//! | `marital_status`     | Married or Single |
//! | `has_children`       | Yes or No; married only (blank: inferred from `num_children`) |
//! | `num_children`       | whole number ≥ 0; married with children only |
//! | `children_in_school` | Yes or No; married with children only |
//! | `rental_income`      | number ≥ 0 and ≤ `TaxpayerRecord::MAX_AMOUNT` |
//! | `dividend_income`    | number ≥ 0 and ≤ `TaxpayerRecord::MAX_AMOUNT` |
//!
//! Answers are case-insensitive.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use tax_core::{EmploymentType, MaritalStatus, Organization, TaxpayerRecord};
use thiserror::Error;
use tracing::{debug, warn};

use crate::utils::{ParseNumberError, parse_decimal, parse_integer, parse_yes_no};

/// The questions a taxpayer answers, used to label validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Age,
    Salary,
    HasChildren,
    NumChildren,
    ChildrenInSchool,
    RentalIncome,
    DividendIncome,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Salary => "Annual salary",
            Self::HasChildren => "Children",
            Self::NumChildren => "Number of children",
            Self::ChildrenInSchool => "Children in school",
            Self::RentalIncome => "Rental income",
            Self::DividendIncome => "Dividend income",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A rejected answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required.")]
    Missing { field: Field },

    #[error("{field} must be a valid number, got '{value}'.")]
    InvalidNumber { field: Field, value: String },

    #[error("{field} cannot be negative.")]
    Negative { field: Field, value: String },

    #[error("{field} must not exceed {max}, got '{value}'.")]
    TooLarge {
        field: Field,
        value: String,
        max: Decimal,
    },

    #[error("Invalid organization type '{0}'. Expected Government, Private or Corporate.")]
    InvalidOrganization(String),

    #[error("Invalid employment type '{0}'. Expected Regular or Contract.")]
    InvalidEmploymentType(String),

    #[error("Invalid marital status '{0}'. Expected Married or Single.")]
    InvalidMaritalStatus(String),

    #[error("Invalid response '{value}' for {field}. Expected Yes or No.")]
    InvalidYesNo { field: Field, value: String },
}

fn number_error(
    field: Field,
    err: ParseNumberError,
) -> ValidationError {
    match err {
        ParseNumberError::Empty => ValidationError::Missing { field },
        ParseNumberError::Invalid(value) => ValidationError::InvalidNumber { field, value },
    }
}

/// Parses a non-negative monetary amount.
pub fn parse_amount(
    field: Field,
    value: &str,
) -> Result<Decimal, ValidationError> {
    let amount = parse_decimal(value).map_err(|e| number_error(field, e))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        warn!(%field, %amount, "negative amount rejected");
        return Err(ValidationError::Negative {
            field,
            value: value.trim().to_string(),
        });
    }
    if amount > TaxpayerRecord::MAX_AMOUNT {
        warn!(%field, %amount, "amount above maximum rejected");
        return Err(ValidationError::TooLarge {
            field,
            value: value.trim().to_string(),
            max: TaxpayerRecord::MAX_AMOUNT,
        });
    }
    Ok(amount)
}

/// Parses a non-negative whole number (age, number of children).
pub fn parse_count(
    field: Field,
    value: &str,
) -> Result<u32, ValidationError> {
    let count = parse_integer(value).map_err(|e| number_error(field, e))?;
    if count < 0 {
        warn!(%field, count, "negative count rejected");
        return Err(ValidationError::Negative {
            field,
            value: value.trim().to_string(),
        });
    }
    u32::try_from(count).map_err(|_| ValidationError::InvalidNumber {
        field,
        value: value.trim().to_string(),
    })
}

pub fn parse_organization(value: &str) -> Result<Organization, ValidationError> {
    Organization::parse(value)
        .ok_or_else(|| ValidationError::InvalidOrganization(value.trim().to_string()))
}

pub fn parse_employment_type(value: &str) -> Result<EmploymentType, ValidationError> {
    EmploymentType::parse(value)
        .ok_or_else(|| ValidationError::InvalidEmploymentType(value.trim().to_string()))
}

pub fn parse_marital_status(value: &str) -> Result<MaritalStatus, ValidationError> {
    MaritalStatus::parse(value)
        .ok_or_else(|| ValidationError::InvalidMaritalStatus(value.trim().to_string()))
}

pub fn parse_answer(
    field: Field,
    value: &str,
) -> Result<bool, ValidationError> {
    parse_yes_no(value).ok_or_else(|| ValidationError::InvalidYesNo {
        field,
        value: value.trim().to_string(),
    })
}

/// Raw answers for one taxpayer, as read from a record file.
///
/// Values may be written as strings, numbers or booleans; they are all
/// normalized to text and validated by [`TaxpayerForm::validate`].
///
/// Unquoted fractional numbers are read by the TOML parser as `f64` and keep
/// only about 15 significant digits. Quote amounts that must be exact
/// (`dividend_income = "1234567.891234567891"`); quoted text goes straight to
/// `Decimal`.
///
/// ```toml
/// name = "Pema"
/// age = 40
/// salary = "2,000,000"
/// organization = "private"
/// marital_status = "Single"
/// rental_income = 100000
/// dividend_income = 50000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaxpayerForm {
    #[serde(deserialize_with = "deserialize_answer")]
    pub name: String,
    #[serde(deserialize_with = "deserialize_answer")]
    pub age: String,
    #[serde(deserialize_with = "deserialize_answer")]
    pub salary: String,
    #[serde(deserialize_with = "deserialize_answer")]
    pub organization: String,
    #[serde(deserialize_with = "deserialize_answer")]
    pub employment_type: String,
    #[serde(deserialize_with = "deserialize_answer")]
    pub marital_status: String,
    #[serde(deserialize_with = "deserialize_answer")]
    pub has_children: String,
    #[serde(deserialize_with = "deserialize_answer")]
    pub num_children: String,
    #[serde(deserialize_with = "deserialize_answer")]
    pub children_in_school: String,
    #[serde(deserialize_with = "deserialize_answer")]
    pub rental_income: String,
    #[serde(deserialize_with = "deserialize_answer")]
    pub dividend_income: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAnswer {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

fn deserialize_answer<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawAnswer::deserialize(deserializer)? {
        RawAnswer::Text(s) => s,
        RawAnswer::Integer(n) => n.to_string(),
        RawAnswer::Float(x) => x.to_string(),
        RawAnswer::Flag(true) => "Yes".to_string(),
        RawAnswer::Flag(false) => "No".to_string(),
    })
}

/// Result of collecting one taxpayer's answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collected {
    /// Every answer was valid.
    Record(TaxpayerRecord),
    /// The taxpayer is below the minimum taxable age; the remaining answers
    /// were not looked at.
    Exempt { name: String, age: u32 },
}

impl TaxpayerForm {
    /// Checks the age first and stops there when the taxpayer is below
    /// `min_taxable_age`, exactly as an interactive session does. Otherwise
    /// validates every answer with [`TaxpayerForm::validate`].
    pub fn collect(
        &self,
        min_taxable_age: u32,
    ) -> Result<Collected, ValidationError> {
        let age = parse_count(Field::Age, &self.age)?;
        if age < min_taxable_age {
            debug!(age, min_taxable_age, "below minimum taxable age, remaining answers skipped");
            return Ok(Collected::Exempt {
                name: self.name.trim().to_string(),
                age,
            });
        }
        self.validate().map(Collected::Record)
    }

    /// Checks every answer and builds the engine record.
    ///
    /// Answers are checked in the order they are asked; the first invalid
    /// one is returned. Answers that do not apply (employment type for
    /// private and corporate employers, children for single taxpayers) are
    /// ignored.
    pub fn validate(&self) -> Result<TaxpayerRecord, ValidationError> {
        let age = parse_count(Field::Age, &self.age)?;
        let salary = parse_amount(Field::Salary, &self.salary)?;
        let organization = parse_organization(&self.organization)?;

        let employment_type = if organization.forces_regular_employment() {
            EmploymentType::Regular
        } else {
            parse_employment_type(&self.employment_type)?
        };

        let marital_status = parse_marital_status(&self.marital_status)?;

        let (num_children, children_in_school) = if marital_status.is_married() {
            self.children()?
        } else {
            (0, false)
        };

        let rental_income = parse_amount(Field::RentalIncome, &self.rental_income)?;
        let dividend_income = parse_amount(Field::DividendIncome, &self.dividend_income)?;

        Ok(TaxpayerRecord {
            name: self.name.trim().to_string(),
            age,
            salary,
            organization,
            employment_type,
            marital_status,
            num_children,
            children_in_school,
            rental_income,
            dividend_income,
        })
    }

    fn children(&self) -> Result<(u32, bool), ValidationError> {
        let has_children = if self.has_children.trim().is_empty() {
            !self.num_children.trim().is_empty()
        } else {
            parse_answer(Field::HasChildren, &self.has_children)?
        };

        if !has_children {
            return Ok((0, false));
        }

        let num_children = parse_count(Field::NumChildren, &self.num_children)?;
        let in_school = parse_answer(Field::ChildrenInSchool, &self.children_in_school)?;

        Ok((num_children, num_children > 0 && in_school))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn married_form() -> TaxpayerForm {
        TaxpayerForm {
            name: "Karma".to_string(),
            age: "30".to_string(),
            salary: "500000".to_string(),
            organization: "Government".to_string(),
            employment_type: "regular".to_string(),
            marital_status: "married".to_string(),
            has_children: "Yes".to_string(),
            num_children: "1".to_string(),
            children_in_school: "yes".to_string(),
            rental_income: "0".to_string(),
            dividend_income: "0".to_string(),
        }
    }

    // -----------------------------------------------------------------------
    // Happy path
    // -----------------------------------------------------------------------

    #[test]
    fn married_form_builds_record() {
        let record = married_form().validate().expect("form should validate");

        assert_eq!(
            record,
            TaxpayerRecord {
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
            }
        );
    }

    #[test]
    fn private_employer_forces_regular_employment() {
        let form = TaxpayerForm {
            organization: "private".to_string(),
            employment_type: "contract".to_string(),
            ..married_form()
        };

        assert_eq!(form.validate().unwrap().employment_type, EmploymentType::Regular);
    }

    #[test]
    fn corporate_employer_ignores_invalid_employment_type() {
        let form = TaxpayerForm {
            organization: "Corporate".to_string(),
            employment_type: "seasonal".to_string(),
            ..married_form()
        };

        assert_eq!(form.validate().unwrap().employment_type, EmploymentType::Regular);
    }

    #[test]
    fn single_taxpayer_has_no_children() {
        let form = TaxpayerForm {
            marital_status: "Single".to_string(),
            num_children: "4".to_string(),
            children_in_school: "Yes".to_string(),
            ..married_form()
        };

        let record = form.validate().unwrap();
        assert_eq!(record.num_children, 0);
        assert!(!record.children_in_school);
    }

    #[test]
    fn no_children_answer_clears_children_fields() {
        let form = TaxpayerForm {
            has_children: "No".to_string(),
            num_children: "3".to_string(),
            ..married_form()
        };

        let record = form.validate().unwrap();
        assert_eq!(record.num_children, 0);
        assert!(!record.children_in_school);
    }

    #[test]
    fn zero_children_forces_not_in_school() {
        let form = TaxpayerForm {
            num_children: "0".to_string(),
            ..married_form()
        };

        let record = form.validate().unwrap();
        assert_eq!(record.num_children, 0);
        assert!(!record.children_in_school);
    }

    #[test]
    fn blank_has_children_is_inferred_from_count() {
        let form = TaxpayerForm {
            has_children: String::new(),
            num_children: "2".to_string(),
            ..married_form()
        };
        assert_eq!(form.validate().unwrap().num_children, 2);

        let form = TaxpayerForm {
            has_children: String::new(),
            num_children: String::new(),
            ..married_form()
        };
        assert_eq!(form.validate().unwrap().num_children, 0);
    }

    #[test]
    fn amounts_accept_thousands_separators() {
        let form = TaxpayerForm {
            salary: "1,250,000.50".to_string(),
            ..married_form()
        };

        assert_eq!(form.validate().unwrap().salary, dec!(1250000.50));
    }

    // -----------------------------------------------------------------------
    // Rejections
    // -----------------------------------------------------------------------

    #[test]
    fn rejects_non_numeric_age() {
        let form = TaxpayerForm {
            age: "thirty".to_string(),
            ..married_form()
        };

        assert_eq!(
            form.validate(),
            Err(ValidationError::InvalidNumber {
                field: Field::Age,
                value: "thirty".to_string(),
            })
        );
    }

    #[test]
    fn rejects_negative_age() {
        let form = TaxpayerForm {
            age: "-1".to_string(),
            ..married_form()
        };

        assert!(matches!(
            form.validate(),
            Err(ValidationError::Negative { field: Field::Age, .. })
        ));
    }

    #[test]
    fn rejects_missing_salary() {
        let form = TaxpayerForm {
            salary: " ".to_string(),
            ..married_form()
        };

        assert_eq!(
            form.validate(),
            Err(ValidationError::Missing {
                field: Field::Salary
            })
        );
    }

    #[test]
    fn rejects_unknown_organization() {
        let form = TaxpayerForm {
            organization: "Charity".to_string(),
            ..married_form()
        };

        assert_eq!(
            form.validate(),
            Err(ValidationError::InvalidOrganization("Charity".to_string()))
        );
    }

    #[test]
    fn rejects_unknown_government_employment_type() {
        let form = TaxpayerForm {
            employment_type: "temp".to_string(),
            ..married_form()
        };

        assert_eq!(
            form.validate(),
            Err(ValidationError::InvalidEmploymentType("temp".to_string()))
        );
    }

    #[test]
    fn rejects_unknown_marital_status() {
        let form = TaxpayerForm {
            marital_status: "widowed".to_string(),
            ..married_form()
        };

        assert_eq!(
            form.validate(),
            Err(ValidationError::InvalidMaritalStatus("widowed".to_string()))
        );
    }

    #[test]
    fn rejects_bad_yes_no_answer() {
        let form = TaxpayerForm {
            children_in_school: "sometimes".to_string(),
            ..married_form()
        };

        assert_eq!(
            form.validate(),
            Err(ValidationError::InvalidYesNo {
                field: Field::ChildrenInSchool,
                value: "sometimes".to_string(),
            })
        );
    }

    #[test]
    fn rejects_negative_children() {
        let form = TaxpayerForm {
            num_children: "-2".to_string(),
            ..married_form()
        };

        assert!(matches!(
            form.validate(),
            Err(ValidationError::Negative { field: Field::NumChildren, .. })
        ));
    }

    #[test]
    fn rejects_negative_rental_income() {
        let form = TaxpayerForm {
            rental_income: "-100".to_string(),
            ..married_form()
        };

        assert_eq!(
            form.validate(),
            Err(ValidationError::Negative {
                field: Field::RentalIncome,
                value: "-100".to_string(),
            })
        );
    }

    #[test]
    fn rejects_amount_above_maximum() {
        let form = TaxpayerForm {
            salary: "75,000,000,000,000,000,000,000,000,000".to_string(),
            organization: "Private".to_string(),
            marital_status: "Single".to_string(),
            ..married_form()
        };

        assert_eq!(
            form.validate(),
            Err(ValidationError::TooLarge {
                field: Field::Salary,
                value: "75,000,000,000,000,000,000,000,000,000".to_string(),
                max: TaxpayerRecord::MAX_AMOUNT,
            })
        );
    }

    #[test]
    fn accepts_amount_at_maximum() {
        let form = TaxpayerForm {
            dividend_income: TaxpayerRecord::MAX_AMOUNT.to_string(),
            ..married_form()
        };

        assert_eq!(
            form.validate().unwrap().dividend_income,
            TaxpayerRecord::MAX_AMOUNT
        );
    }

    #[test]
    fn error_messages_name_the_field() {
        let err = ValidationError::Negative {
            field: Field::DividendIncome,
            value: "-5".to_string(),
        };

        assert_eq!(err.to_string(), "Dividend income cannot be negative.");
    }

    // -----------------------------------------------------------------------
    // Age check
    // -----------------------------------------------------------------------

    #[test]
    fn minor_is_exempt_without_checking_other_answers() {
        let form = TaxpayerForm {
            name: "Dorji".to_string(),
            age: "17".to_string(),
            ..TaxpayerForm::default()
        };

        assert_eq!(
            form.collect(18),
            Ok(Collected::Exempt {
                name: "Dorji".to_string(),
                age: 17,
            })
        );
    }

    #[test]
    fn adult_answers_are_fully_validated() {
        let form = TaxpayerForm {
            salary: "lots".to_string(),
            ..married_form()
        };
        assert!(matches!(
            form.collect(18),
            Err(ValidationError::InvalidNumber { field: Field::Salary, .. })
        ));

        assert_eq!(
            married_form().collect(18),
            Ok(Collected::Record(married_form().validate().unwrap()))
        );
    }

    #[test]
    fn invalid_age_is_reported_before_the_age_check() {
        let form = TaxpayerForm {
            age: String::new(),
            ..TaxpayerForm::default()
        };

        assert_eq!(
            form.collect(18),
            Err(ValidationError::Missing { field: Field::Age })
        );
    }

    // -----------------------------------------------------------------------
    // Record file deserialization
    // -----------------------------------------------------------------------

    #[test]
    fn form_deserializes_mixed_value_types() {
        let toml = r#"
name = "Pema"
age = 40
salary = "2,000,000"
organization = "private"
marital_status = "Single"
rental_income = 100000
dividend_income = 50000.5
children_in_school = false
"#;
        let form: TaxpayerForm = toml::from_str(toml).unwrap();

        assert_eq!(form.age, "40");
        assert_eq!(form.dividend_income, "50000.5");
        assert_eq!(form.children_in_school, "No");
        assert_eq!(form.employment_type, "");

        let record = form.validate().unwrap();
        assert_eq!(record.salary, dec!(2000000));
        assert_eq!(record.dividend_income, dec!(50000.5));
    }

    #[test]
    fn quoted_amounts_keep_every_digit() {
        let toml = r#"
age = 40
salary = 1000000
organization = "Private"
marital_status = "Single"
rental_income = 0
dividend_income = "1234567.891234567891"
"#;
        let form: TaxpayerForm = toml::from_str(toml).unwrap();

        assert_eq!(
            form.validate().unwrap().dividend_income,
            dec!(1234567.891234567891)
        );
    }

    #[test]
    fn form_rejects_unknown_keys() {
        let result: Result<TaxpayerForm, _> = toml::from_str("nickname = \"P\"\n");

        assert!(result.is_err());
    }
}
