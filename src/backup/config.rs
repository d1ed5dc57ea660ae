//! Backup configuration holder
//!
//! Every setter validates its input immediately and returns the holder so calls
//! can be chained with `?`. Setters that touch the retention days, date format
//! or time zone recompute the derived folder labels from scratch.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use chrono_tz::Tz;

use super::clock::{Clock, SystemClock};
use super::window::{format_label, DateWindow};
use crate::error::{BackupError, BackupResult};

/// Permission bits used when creating backup folders
pub const DEFAULT_DIR_MODE: u32 = 0o700;

/// Validated configuration for a backup run
pub struct BackupConfig {
    root_path: Option<PathBuf>,
    sources: Vec<PathBuf>,
    retention_days: Option<u32>,
    date_format: Option<String>,
    time_zone: Option<Tz>,
    dir_mode: u32,
    window: Option<DateWindow>,
    clock: Box<dyn Clock>,
}

impl BackupConfig {
    /// Create an empty configuration reading the system clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Create an empty configuration reading the given clock
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            root_path: None,
            sources: Vec::new(),
            retention_days: None,
            date_format: None,
            time_zone: None,
            dir_mode: DEFAULT_DIR_MODE,
            window: None,
            clock: Box::new(clock),
        }
    }

    /// Set the directory that holds the dated folders
    pub fn set_root_path(&mut self, path: impl AsRef<Path>) -> BackupResult<&mut Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(BackupError::Config(format!(
                "The folder path {} does not exist",
                path.display()
            )));
        }
        self.root_path = Some(path.to_path_buf());
        Ok(self)
    }

    /// Add directories to back up
    ///
    /// The whole batch is checked before anything is stored. Paths are
    /// stored canonicalized, so `../shared` and `shared` seen from different
    /// places never collide below the dated folder. Paths already present are
    /// skipped, so insertion order of first appearance is kept.
    pub fn set_sources<I, P>(&mut self, paths: I) -> BackupResult<&mut Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let given: Vec<PathBuf> = paths
            .into_iter()
            .map(|p| p.as_ref().to_path_buf())
            .collect();

        if given.is_empty() {
            return Err(BackupError::Config("Empty source list given".into()));
        }

        let mut resolved = Vec::with_capacity(given.len());
        for path in &given {
            let canonical = path
                .canonicalize()
                .ok()
                .filter(|p| p.is_dir())
                .ok_or_else(|| {
                    BackupError::Config(format!(
                        "The folder path {} does not exist",
                        path.display()
                    ))
                })?;
            resolved.push(canonical);
        }

        for path in resolved {
            if !self.sources.contains(&path) {
                self.sources.push(path);
            }
        }
        Ok(self)
    }

    /// Set how many days a dated folder is kept
    pub fn set_retention_days(&mut self, days: i64) -> BackupResult<&mut Self> {
        let days = u32::try_from(days)
            .ok()
            .filter(|d| *d >= 1)
            .ok_or_else(|| {
                BackupError::Config(format!("The value given {} is not a valid number of days", days))
            })?;
        self.window = self.window_with(Some(days), self.date_format.as_deref(), self.time_zone)?;
        self.retention_days = Some(days);
        Ok(self)
    }

    /// Set the strftime pattern used to name dated folders
    pub fn set_date_format(&mut self, pattern: impl Into<String>) -> BackupResult<&mut Self> {
        let pattern = pattern.into();
        let sample = match format_label(&self.clock.now(), &pattern) {
            Some(label) if !pattern.is_empty() => label,
            _ => {
                return Err(BackupError::Config(format!(
                    "The date format '{}' is invalid",
                    pattern
                )))
            }
        };
        // Labels are joined onto the root path, so they must stay below it
        let below_root = Path::new(&sample)
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if sample.is_empty() || !below_root {
            return Err(BackupError::Config(format!(
                "The date format '{}' produces '{}', which is not a folder name",
                pattern, sample
            )));
        }
        self.window = self.window_with(self.retention_days, Some(&pattern), self.time_zone)?;
        self.date_format = Some(pattern);
        Ok(self)
    }

    /// Set the IANA time zone that decides what "today" is
    pub fn set_time_zone(&mut self, name: &str) -> BackupResult<&mut Self> {
        let tz: Tz = name
            .parse()
            .map_err(|_| BackupError::Config(format!("The time zone '{}' is invalid", name)))?;
        self.window = self.window_with(self.retention_days, self.date_format.as_deref(), Some(tz))?;
        self.time_zone = Some(tz);
        Ok(self)
    }

    /// Set the permission bits for created folders (unix only)
    pub fn set_dir_mode(&mut self, mode: u32) -> BackupResult<&mut Self> {
        if mode > 0o7777 {
            return Err(BackupError::Config(format!(
                "The directory mode {:o} is invalid",
                mode
            )));
        }
        self.dir_mode = mode;
        Ok(self)
    }

    /// Recompute the window from scratch for a proposed set of date inputs
    ///
    /// Fails when every input is present but no window exists, e.g. when the
    /// retention reaches past the earliest representable date.
    fn window_with(
        &self,
        retention_days: Option<u32>,
        date_format: Option<&str>,
        time_zone: Option<Tz>,
    ) -> BackupResult<Option<DateWindow>> {
        let complete = retention_days.is_some() && date_format.is_some() && time_zone.is_some();
        match DateWindow::compute(retention_days, date_format, time_zone, self.clock.now()) {
            None if complete => Err(BackupError::Config(format!(
                "Folder dates cannot be computed for a retention of {} days",
                retention_days.unwrap_or_default()
            ))),
            window => Ok(window),
        }
    }

    /// Check that a run can start
    ///
    /// Missing inputs are reported in a fixed order: retention days, date
    /// format, time zone, root path, sources.
    pub fn preflight(&self) -> BackupResult<(&Path, &DateWindow)> {
        if self.retention_days.is_none() {
            return Err(BackupError::missing_setter("set_retention_days"));
        }
        if self.date_format.is_none() {
            return Err(BackupError::missing_setter("set_date_format"));
        }
        if self.time_zone.is_none() {
            return Err(BackupError::missing_setter("set_time_zone"));
        }
        let root = self
            .root_path
            .as_deref()
            .ok_or_else(|| BackupError::missing_setter("set_root_path"))?;
        if self.sources.is_empty() {
            return Err(BackupError::missing_setter("set_sources"));
        }
        let window = self
            .window
            .as_ref()
            .ok_or_else(|| BackupError::Config("Folder dates could not be computed".into()))?;
        Ok((root, window))
    }

    pub fn root_path(&self) -> Option<&Path> {
        self.root_path.as_deref()
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn retention_days(&self) -> Option<u32> {
        self.retention_days
    }

    pub fn date_format(&self) -> Option<&str> {
        self.date_format.as_deref()
    }

    pub fn time_zone(&self) -> Option<Tz> {
        self.time_zone
    }

    pub fn dir_mode(&self) -> u32 {
        self.dir_mode
    }

    /// Derived folder labels, `None` until all date inputs are set
    pub fn window(&self) -> Option<&DateWindow> {
        self.window.as_ref()
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BackupConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackupConfig")
            .field("root_path", &self.root_path)
            .field("sources", &self.sources)
            .field("retention_days", &self.retention_days)
            .field("date_format", &self.date_format)
            .field("time_zone", &self.time_zone)
            .field("dir_mode", &format_args!("{:o}", self.dir_mode))
            .field("window", &self.window)
            .finish()
    }
}
