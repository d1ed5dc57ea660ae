//! Backup CLI commands
//!
//! Bridges clap argument parsing with the settings file and the backup runner.

use std::path::PathBuf;

use clap::Args;

use crate::backup::{BackupPlan, BackupRunner, SystemClock};
use crate::config::paths::RotabakPaths;
use crate::config::settings::Settings;
use crate::display::plan::{format_plan, format_report, format_settings};
use crate::error::{BackupError, BackupResult};
use crate::ops::Engine;

/// Job options shared by `run` and `plan`
///
/// Anything given here overrides the settings file.
#[derive(Args, Debug, Clone, Default)]
pub struct JobArgs {
    /// Settings file to read instead of the default one
    #[arg(short, long, env = "ROTABAK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the dated folders
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Directory to back up (repeatable, replaces the configured sources)
    #[arg(short, long = "source")]
    pub sources: Vec<PathBuf>,

    /// Days a dated folder is kept
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    pub retention: Option<i64>,

    /// Folder name pattern (strftime format, e.g. "%Y-%m-%d")
    #[arg(short, long)]
    pub date_format: Option<String>,

    /// IANA time zone, e.g. "Europe/Berlin"
    #[arg(short, long)]
    pub time_zone: Option<String>,

    /// Synchronizer to use: rsync or native
    #[arg(short, long)]
    pub engine: Option<Engine>,

    /// Print the command log when the run fails
    #[arg(long)]
    pub debug: bool,
}

impl JobArgs {
    /// Load the settings file and apply command-line overrides
    pub fn resolve(&self, paths: &RotabakPaths) -> BackupResult<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load_from(path)?,
            None => Settings::load_or_create(paths)?,
        };

        if let Some(root) = &self.root {
            settings.root_path = Some(root.clone());
        }
        if !self.sources.is_empty() {
            settings.sources = self.sources.clone();
        }
        if let Some(days) = self.retention {
            settings.retention_days = days;
        }
        if let Some(format) = &self.date_format {
            settings.date_format = format.clone();
        }
        if let Some(zone) = &self.time_zone {
            settings.time_zone = zone.clone();
        }
        if let Some(engine) = self.engine {
            settings.engine = engine;
        }
        settings.debug |= self.debug;

        Ok(settings)
    }
}

/// Run one backup
pub fn handle_run(paths: &RotabakPaths, args: &JobArgs) -> BackupResult<()> {
    let settings = args.resolve(paths)?;
    let config = settings.build_config(SystemClock)?;

    tracing::info!(engine = %settings.engine, sources = config.sources().len(), "starting backup");

    let mut runner = BackupRunner::new(config, settings.engine.file_ops(), settings.debug);
    let report = runner.backup()?;

    print!("{}", format_report(&report));
    Ok(())
}

/// Show what a run would do without touching the filesystem
pub fn handle_plan(paths: &RotabakPaths, args: &JobArgs) -> BackupResult<()> {
    let settings = args.resolve(paths)?;
    let config = settings.build_config(SystemClock)?;
    let plan = BackupPlan::from_config(&config)?;

    print!("{}", format_plan(&plan, &settings));
    Ok(())
}

/// Write a default settings file
pub fn handle_init(paths: &RotabakPaths, force: bool) -> BackupResult<()> {
    if paths.is_initialized() && !force {
        return Err(BackupError::Config(format!(
            "Settings file already exists at {} (use --force to overwrite)",
            paths.settings_file().display()
        )));
    }

    Settings::default().save(paths)?;
    println!("Settings written to {}", paths.settings_file().display());
    println!("Set root_path and sources, then run 'rotabak plan' to check them.");
    Ok(())
}

/// Show the settings path and effective settings
pub fn handle_config(paths: &RotabakPaths, args: &JobArgs) -> BackupResult<()> {
    let settings = args.resolve(paths)?;

    println!("rotabak Configuration");
    println!("=====================");
    println!("Settings file: {}", paths.settings_file().display());
    if !paths.is_initialized() && args.config.is_none() {
        println!("  (not created yet, showing defaults; run 'rotabak init')");
    }
    println!();
    print!("{}", format_settings(&settings));
    Ok(())
}
