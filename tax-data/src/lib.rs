//! Loading rule tables from disk.
//!
//! Two formats are supported:
//! - a TOML rules file that overrides any subset of the built-in
//!   [`RuleTables`](tax_core::RuleTables) parameters ([`RulesLoader`]);
//! - a CSV bracket schedule that replaces only the progressive brackets
//!   ([`BracketLoader`]).

pub mod bracket_loader;
pub mod rules_loader;

pub use bracket_loader::{BracketLoader, BracketLoaderError, BracketRecord};
pub use rules_loader::{RulesLoader, RulesLoaderError};
