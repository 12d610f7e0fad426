pub mod app;
pub mod form;
pub mod logging;
pub mod prompt;
pub mod report;
pub mod utils;
