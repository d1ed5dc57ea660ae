//! rotabak - rotating dated directory backups
//!
//! Copies a configured set of source directories into a folder named after
//! today's date, then deletes the dated folder that has aged past the
//! retention window.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Settings file and path management
//! - `error`: Custom error types
//! - `backup`: Configuration holder, date window and backup runner
//! - `ops`: Synchronizer and deleter collaborators
//! - `cli`: Command handlers for the `rotabak` binary
//! - `display`: Terminal output formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use rotabak::config::{RotabakPaths, Settings};
//! use rotabak::backup::{BackupRunner, SystemClock};
//!
//! let paths = RotabakPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let config = settings.build_config(SystemClock)?;
//! BackupRunner::new(config, settings.engine.file_ops(), settings.debug).backup()?;
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod ops;

pub use error::{BackupError, BackupResult};
