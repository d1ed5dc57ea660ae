//! Collaborators backed by external programs

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use super::{CommandOutput, FileOps};

/// Runs `rsync` for synchronization and `rm` for deletion
#[derive(Debug, Clone)]
pub struct ShellOps {
    rsync: PathBuf,
    rm: PathBuf,
}

impl Default for ShellOps {
    fn default() -> Self {
        Self::with_programs("rsync", "rm")
    }
}

impl ShellOps {
    /// Use custom program paths instead of the ones on `PATH`
    pub fn with_programs(rsync: impl Into<PathBuf>, rm: impl Into<PathBuf>) -> Self {
        Self {
            rsync: rsync.into(),
            rm: rm.into(),
        }
    }
}

impl FileOps for ShellOps {
    fn synchronize(&self, source: &Path, destination: &Path) -> io::Result<CommandOutput> {
        // A trailing slash makes rsync copy the contents, not the directory itself
        let mut source_arg = OsString::from(source.as_os_str());
        if !source_arg.to_string_lossy().ends_with('/') {
            source_arg.push("/");
        }

        let command = format!(
            "{} -a --delete {} {}",
            self.rsync.display(),
            Path::new(&source_arg).display(),
            destination.display()
        );
        tracing::debug!(%command, "running synchronizer");

        let output = Command::new(&self.rsync)
            .arg("-a")
            .arg("--delete")
            .arg(&source_arg)
            .arg(destination)
            .output()
            .map_err(|e| {
                io::Error::new(e.kind(), format!("failed to launch {}: {}", self.rsync.display(), e))
            })?;

        Ok(to_command_output(command, output))
    }

    fn delete_recursive(&self, path: &Path) -> io::Result<CommandOutput> {
        let command = format!("{} -Rf {}", self.rm.display(), path.display());
        tracing::debug!(%command, "running deleter");

        let output = Command::new(&self.rm)
            .arg("-Rf")
            .arg(path)
            .output()
            .map_err(|e| {
                io::Error::new(e.kind(), format!("failed to launch {}: {}", self.rm.display(), e))
            })?;

        Ok(to_command_output(command, output))
    }
}

fn to_command_output(command: String, output: Output) -> CommandOutput {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    CommandOutput {
        command,
        // Killed by a signal
        status: output.status.code().unwrap_or(-1),
        output: text,
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_delete_missing_path_succeeds() {
        let temp_dir = TempDir::new().unwrap();
        let ops = ShellOps::default();

        let result = ops.delete_recursive(&temp_dir.path().join("nope")).unwrap();
        assert!(result.success());
        assert!(result.command.contains("-Rf"));
    }

    #[test]
    fn test_delete_removes_tree() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("old");
        std::fs::create_dir_all(target.join("nested")).unwrap();
        std::fs::write(target.join("nested/file.txt"), "x").unwrap();

        let result = ShellOps::default().delete_recursive(&target).unwrap();
        assert!(result.success());
        assert!(!target.exists());
    }

    #[test]
    fn test_non_zero_status_reported() {
        let temp_dir = TempDir::new().unwrap();
        let ops = ShellOps::with_programs("false", "false");

        let result = ops
            .synchronize(temp_dir.path(), &temp_dir.path().join("dst"))
            .unwrap();
        assert!(!result.success());
        assert!(result.command.starts_with("false -a --delete"));
    }

    #[test]
    fn test_missing_program_is_launch_error() {
        let temp_dir = TempDir::new().unwrap();
        let ops = ShellOps::with_programs("/nonexistent/rsync", "/nonexistent/rm");

        assert!(ops.delete_recursive(temp_dir.path()).is_err());
    }
}
