//! Interactive question-and-answer session.

use std::io::{self, BufRead, Write};

use tax_core::Organization;
use thiserror::Error;
use tracing::{debug, info};

pub use crate::form::Collected;
use crate::form::{
    Field, TaxpayerForm, ValidationError, parse_amount, parse_answer, parse_count,
    parse_employment_type, parse_marital_status, parse_organization,
};

pub const NAME: &str = "Enter your name: ";
pub const AGE: &str = "Enter your age: ";
pub const SALARY: &str = "Enter your annual salary: ";
pub const ORGANIZATION: &str = "Enter your organization type (Government/Private/Corporate): ";
pub const EMPLOYMENT_TYPE: &str = "Enter your employment type (Regular/Contract): ";
pub const MARITAL_STATUS: &str = "Enter your marital status (Married/Single): ";
pub const HAS_CHILDREN: &str = "Do you have children? (Yes/No): ";
pub const NUM_CHILDREN: &str = "Enter the number of children: ";
pub const CHILDREN_IN_SCHOOL: &str = "Do all your children go to school? (Yes/No): ";
pub const RENTAL_INCOME: &str = "Enter your rental income: ";
pub const DIVIDEND_INCOME: &str = "Enter your dividend income: ";

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("input ended before answering '{}'", .question.trim_end())]
    UnexpectedEof { question: &'static str },

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Asks the taxpayer questions on `writer` and reads answers from `reader`.
pub struct Prompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(
        reader: R,
        writer: W,
    ) -> Self {
        Self { reader, writer }
    }

    /// Runs the session.
    ///
    /// Each answer is checked as soon as it is given, and the first invalid
    /// one ends the session. Questions whose answers are implied by earlier
    /// ones are not asked.
    pub fn collect(
        &mut self,
        min_taxable_age: u32,
    ) -> Result<Collected, PromptError> {
        let mut form = TaxpayerForm {
            name: self.ask(NAME)?,
            ..TaxpayerForm::default()
        };

        form.age = self.ask(AGE)?;
        let age = parse_count(Field::Age, &form.age)?;
        if age < min_taxable_age {
            info!(age, min_taxable_age, "below minimum taxable age, stopping");
            return Ok(Collected::Exempt {
                name: form.name.trim().to_string(),
                age,
            });
        }

        form.salary = self.ask(SALARY)?;
        parse_amount(Field::Salary, &form.salary)?;

        form.organization = self.ask(ORGANIZATION)?;
        let organization = parse_organization(&form.organization)?;

        if asks_employment_type(organization) {
            form.employment_type = self.ask(EMPLOYMENT_TYPE)?;
            parse_employment_type(&form.employment_type)?;
        } else {
            debug!(%organization, "employment type fixed to Regular");
        }

        form.marital_status = self.ask(MARITAL_STATUS)?;
        if parse_marital_status(&form.marital_status)?.is_married() {
            self.ask_children(&mut form)?;
        }

        form.rental_income = self.ask(RENTAL_INCOME)?;
        parse_amount(Field::RentalIncome, &form.rental_income)?;

        form.dividend_income = self.ask(DIVIDEND_INCOME)?;
        parse_amount(Field::DividendIncome, &form.dividend_income)?;

        Ok(Collected::Record(form.validate()?))
    }

    fn ask_children(
        &mut self,
        form: &mut TaxpayerForm,
    ) -> Result<(), PromptError> {
        form.has_children = self.ask(HAS_CHILDREN)?;
        if !parse_answer(Field::HasChildren, &form.has_children)? {
            return Ok(());
        }

        form.num_children = self.ask(NUM_CHILDREN)?;
        parse_count(Field::NumChildren, &form.num_children)?;

        form.children_in_school = self.ask(CHILDREN_IN_SCHOOL)?;
        parse_answer(Field::ChildrenInSchool, &form.children_in_school)?;
        Ok(())
    }

    fn ask(
        &mut self,
        question: &'static str,
    ) -> Result<String, PromptError> {
        write!(self.writer, "{question}")?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(PromptError::UnexpectedEof { question });
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Whether a session for `organization` asks about employment type.
pub fn asks_employment_type(organization: Organization) -> bool {
    !organization.forces_regular_employment()
}
