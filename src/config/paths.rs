//! Path management for rotabak
//!
//! ## Path Resolution Order
//!
//! 1. `ROTABAK_CONFIG_DIR` environment variable (if set)
//! 2. The platform configuration directory from `directories`
//!    (`~/.config/rotabak` on Linux, `%APPDATA%\rotabak` on Windows)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::BackupError;

/// Environment variable overriding the settings directory
pub const CONFIG_DIR_ENV: &str = "ROTABAK_CONFIG_DIR";

/// Manages the paths used by rotabak
#[derive(Debug, Clone)]
pub struct RotabakPaths {
    /// Directory holding the settings file
    base_dir: PathBuf,
}

impl RotabakPaths {
    /// Resolve the settings directory
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, BackupError> {
        let base_dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(custom) => PathBuf::from(custom),
            None => ProjectDirs::from("", "", "rotabak")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    BackupError::Config("Could not determine the home directory".into())
                })?,
        };

        Ok(Self { base_dir })
    }

    /// Create RotabakPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Ensure the settings directory exists
    pub fn ensure_directories(&self) -> Result<(), BackupError> {
        std::fs::create_dir_all(&self.base_dir).map_err(|e| {
            BackupError::Io(format!("Failed to create config directory: {}", e))
        })
    }

    /// Check if a settings file has been written
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = RotabakPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();

        env::set_var(CONFIG_DIR_ENV, temp_dir.path());
        let paths = RotabakPaths::new().unwrap();
        env::remove_var(CONFIG_DIR_ENV);

        assert_eq!(paths.base_dir(), temp_dir.path());
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = RotabakPaths::with_base_dir(temp_dir.path().join("nested/rotabak"));

        paths.ensure_directories().unwrap();

        assert!(paths.base_dir().is_dir());
    }
}
