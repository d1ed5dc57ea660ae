//! Display formatting for terminal output

pub mod plan;

pub use plan::{format_plan, format_report, format_settings};
