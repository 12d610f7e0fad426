//! Income tax calculations.
//!
//! The pipeline is split the same way the tax is worked out by hand:
//! deductions, bracket apportionment, then the engine that strings the steps
//! together and applies the exemptions and surcharge.

pub mod brackets;
pub mod common;
pub mod deductions;
pub mod engine;

pub use brackets::compute_tax_payable;
pub use deductions::compute_deductions;
pub use engine::{TaxEngine, compute_surcharge, compute_tax};
