//! Rotating backups for rotabak
//!
//! Copies a configured set of source directories into a folder named after
//! today's date, then deletes the dated folder that has aged past the
//! retention window.
//!
//! # Architecture
//!
//! - `BackupConfig`: validating configuration holder with chainable setters
//! - `DateWindow`: derives today's folder label and the label to prune
//! - `BackupRunner`: runs preflight, folder creation, synchronization and
//!   pruning in that order, aborting on the first failure
//! - `CommandLog`: commands and output of one run, printed on failure in
//!   debug mode
//!
//! # Example
//!
//! ```rust,ignore
//! use rotabak::backup::{BackupConfig, BackupRunner};
//! use rotabak::ops::ShellOps;
//!
//! let mut config = BackupConfig::new();
//! config
//!     .set_root_path("/backups")?
//!     .set_sources(["/etc/apache2", "/var/www/vhosts/test"])?
//!     .set_retention_days(7)?
//!     .set_date_format("%d.%m.%Y")?
//!     .set_time_zone("Europe/Berlin")?;
//!
//! let mut runner = BackupRunner::new(config, ShellOps::default(), true);
//! runner.backup()?;
//! ```

mod clock;
mod config;
mod log;
mod runner;
mod window;

pub use clock::{Clock, SystemClock};
pub use config::{BackupConfig, DEFAULT_DIR_MODE};
pub use log::CommandLog;
pub use runner::{mirror_destination, BackupPlan, BackupReport, BackupRunner, RunState};
pub use window::DateWindow;
