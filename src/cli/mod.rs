//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the backup runner.

pub mod backup;

pub use backup::{handle_config, handle_init, handle_plan, handle_run, JobArgs};
