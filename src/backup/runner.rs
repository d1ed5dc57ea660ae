//! Backup runner
//!
//! Executes one backup run strictly in order:
//!
//! 1. preflight the configuration
//! 2. ensure today's dated folder exists
//! 3. synchronize every source into it, in insertion order
//! 4. prune the folder that fell out of the retention window
//!
//! The first failure aborts the remaining steps. Folder labels are taken once
//! from the configuration when the run starts and never re-derived mid-run.

use std::fs::DirBuilder;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use super::config::BackupConfig;
use super::log::CommandLog;
use crate::error::{BackupError, BackupResult};
use crate::ops::FileOps;

/// Progress of a backup run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    PreflightChecked,
    TodayFolderReady,
    Synchronized,
    Pruned,
    Done,
    Failed,
}

/// Every path a run will touch, derived from the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupPlan {
    /// Today's dated folder
    pub today_dir: PathBuf,
    /// Source directories paired with their destinations, in insertion order
    pub destinations: Vec<(PathBuf, PathBuf)>,
    /// Folder to delete, `None` when it would be today's folder
    pub prune_target: Option<PathBuf>,
    /// Permission bits for created folders
    pub dir_mode: u32,
}

impl BackupPlan {
    /// Build the plan, failing with a configuration error if anything is missing
    pub fn from_config(config: &BackupConfig) -> BackupResult<Self> {
        let (root, window) = config.preflight()?;
        let today_dir = root.join(&window.today);

        let destinations = config
            .sources()
            .iter()
            .map(|source| (source.clone(), mirror_destination(&today_dir, source)))
            .collect();

        let prune_target = if window.delete == window.today {
            None
        } else {
            Some(root.join(&window.delete))
        };

        Ok(Self {
            today_dir,
            destinations,
            prune_target,
            dir_mode: config.dir_mode(),
        })
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupReport {
    pub today_dir: PathBuf,
    pub synchronized: Vec<PathBuf>,
    pub pruned: Option<PathBuf>,
}

/// Runs backups against a configuration through a [`FileOps`] collaborator
pub struct BackupRunner<O: FileOps> {
    config: BackupConfig,
    ops: O,
    debug: bool,
    log: CommandLog,
    state: RunState,
    /// Where the command log goes on failure in debug mode
    dump_to: Box<dyn Write>,
}

impl<O: FileOps> BackupRunner<O> {
    /// Create a runner; with `debug` set, the command log is printed on failure
    pub fn new(config: BackupConfig, ops: O, debug: bool) -> Self {
        Self {
            config,
            ops,
            debug,
            log: CommandLog::new(),
            state: RunState::Idle,
            dump_to: Box::new(std::io::stderr()),
        }
    }

    /// Send the failure dump somewhere other than stderr
    pub fn with_dump_target(mut self, target: impl Write + 'static) -> Self {
        self.dump_to = Box::new(target);
        self
    }

    pub fn config(&self) -> &BackupConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn log(&self) -> &CommandLog {
        &self.log
    }

    /// Run the backup
    pub fn backup(&mut self) -> BackupResult<BackupReport> {
        match self.run() {
            Ok(report) => {
                self.state = RunState::Done;
                Ok(report)
            }
            Err(err) => {
                self.state = RunState::Failed;
                if self.debug {
                    if let Err(e) = self.log.dump(&mut self.dump_to) {
                        tracing::warn!(error = %e, "failed to print command log");
                    }
                }
                tracing::error!(error = %err, "backup failed");
                Err(err)
            }
        }
    }

    fn run(&mut self) -> BackupResult<BackupReport> {
        let plan = BackupPlan::from_config(&self.config)?;
        self.state = RunState::PreflightChecked;

        create_folder(&plan.today_dir, plan.dir_mode)?;
        self.state = RunState::TodayFolderReady;
        tracing::info!(path = %plan.today_dir.display(), "today's folder ready");

        let mut synchronized = Vec::with_capacity(plan.destinations.len());
        for (source, destination) in &plan.destinations {
            create_folder(destination, plan.dir_mode)?;
            self.synchronize(source, destination)?;
            tracing::info!(source = %source.display(), "source synchronized");
            synchronized.push(destination.clone());
        }
        self.state = RunState::Synchronized;

        match &plan.prune_target {
            Some(target) => {
                self.prune(target)?;
                tracing::info!(path = %target.display(), "expired folder pruned");
            }
            None => tracing::warn!("prune target equals today's folder, skipping prune"),
        }
        self.state = RunState::Pruned;

        Ok(BackupReport {
            today_dir: plan.today_dir,
            synchronized,
            pruned: plan.prune_target,
        })
    }

    fn synchronize(&mut self, source: &Path, destination: &Path) -> BackupResult<()> {
        let result = self.ops.synchronize(source, destination).map_err(|e| {
            let command = format!("synchronize {} {}", source.display(), destination.display());
            self.log.record(command.as_str(), e.to_string());
            BackupError::Sync(format!("Can't run {}: {}", command, e))
        })?;

        tracing::debug!(command = %result.command, status = result.status, "synchronizer finished");
        self.log.record(result.command.as_str(), result.output.as_str());

        if !result.success() {
            return Err(BackupError::Sync(format!(
                "Can't run the following command successfully: {} (exit status {})",
                result.command, result.status
            )));
        }
        Ok(())
    }

    fn prune(&mut self, target: &Path) -> BackupResult<()> {
        let result = self.ops.delete_recursive(target).map_err(|e| {
            let command = format!("delete {}", target.display());
            self.log.record(command.as_str(), e.to_string());
            BackupError::Prune(format!("Can't run {}: {}", command, e))
        })?;

        tracing::debug!(command = %result.command, status = result.status, "deleter finished");
        self.log.record(result.command.as_str(), result.output.as_str());

        if !result.success() {
            return Err(BackupError::Prune(format!(
                "Can't run the following command successfully: {} (exit status {})",
                result.command, result.status
            )));
        }
        Ok(())
    }
}

/// Destination of a source inside the dated folder
///
/// The source path is nested below the folder with its root and prefix
/// stripped, so `/etc/app` lands in `<day>/etc/app`.
pub fn mirror_destination(day_dir: &Path, source: &Path) -> PathBuf {
    source
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .fold(day_dir.to_path_buf(), |dir, part| dir.join(part))
}

/// Create a folder and its parents unless it already exists
fn create_folder(path: &Path, mode: u32) -> BackupResult<()> {
    if path.is_dir() {
        return Ok(());
    }

    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    builder.create(path).map_err(|e| {
        BackupError::Io(format!("Can't create the folder {}: {}", path.display(), e))
    })
}
