//! Rendering of a [`TaxOutcome`] for the taxpayer.

use std::io::{self, Write};

use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};
use tax_core::calculations::common::format_amount;
use tax_core::{DeductionBreakdown, TaxOutcome, TaxResult};

#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "Item")]
    item: &'static str,
    #[tabled(rename = "Amount")]
    amount: String,
}

#[derive(Debug, Clone, Tabled)]
struct DeductionRow {
    #[tabled(rename = "Deduction")]
    deduction: &'static str,
    #[tabled(rename = "Amount")]
    amount: String,
}

fn summary_rows(result: &TaxResult) -> Vec<SummaryRow> {
    [
        ("Gross Income", result.gross_income),
        ("Deductions", result.deductions),
        ("Taxable Income", result.taxable_income),
        ("Tax Payable", result.tax_payable),
        ("Surcharge", result.surcharge),
        ("Total Tax Payable", result.total_tax),
    ]
    .into_iter()
    .map(|(item, amount)| SummaryRow {
        item,
        amount: format_amount(amount),
    })
    .collect()
}

fn deduction_rows(breakdown: &DeductionBreakdown) -> Vec<DeductionRow> {
    breakdown
        .components()
        .into_iter()
        .map(|(deduction, amount)| DeductionRow {
            deduction,
            amount: format_amount(amount),
        })
        .collect()
}

fn render_table<T: Tabled>(rows: Vec<T>) -> String {
    Table::new(rows)
        .with(Style::ascii())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string()
}

/// Writes the plain-text report.
///
/// An exempt outcome is a single sentence. A taxable outcome gets the total
/// line followed by the summary table, and the deduction table when
/// `breakdown` is set.
pub fn render_text<W: Write>(
    outcome: &TaxOutcome,
    breakdown: bool,
    writer: &mut W,
) -> io::Result<()> {
    let result = match outcome {
        TaxOutcome::Exempt { reason } => return writeln!(writer, "{}", reason.message()),
        TaxOutcome::Taxable(result) => result,
    };

    writeln!(writer, "Total tax payable: Nu. {}", format_amount(result.total_tax))?;
    writeln!(writer)?;
    writeln!(writer, "Tax Calculation Summary:")?;
    writeln!(writer, "{}", render_table(summary_rows(result)))?;

    if breakdown {
        writeln!(writer)?;
        writeln!(writer, "Deduction Breakdown:")?;
        writeln!(writer, "{}", render_table(deduction_rows(&result.deduction_breakdown)))?;
    }

    Ok(())
}

/// Writes the outcome as pretty-printed JSON.
pub fn render_json<W: Write>(
    outcome: &TaxOutcome,
    writer: &mut W,
) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, outcome)?;
    writeln!(writer)
}
