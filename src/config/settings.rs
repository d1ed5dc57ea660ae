//! User settings for rotabak
//!
//! The settings file describes one backup job: where dated folders live,
//! which directories go into them, and how long they are kept. Every value is
//! fed through the validating setters of `BackupConfig`, so a bad file fails
//! the same way bad programmatic configuration does.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::paths::RotabakPaths;
use crate::backup::{BackupConfig, Clock, DEFAULT_DIR_MODE};
use crate::error::BackupError;
use crate::ops::Engine;

/// User settings for rotabak
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Directory holding the dated folders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_path: Option<PathBuf>,

    /// Directories to back up, in order
    #[serde(default)]
    pub sources: Vec<PathBuf>,

    /// Days a dated folder is kept
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,

    /// Folder name pattern (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// IANA time zone deciding what "today" is
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// Permission bits for created folders
    #[serde(default = "default_dir_mode")]
    pub dir_mode: u32,

    /// Collaborator used to synchronize and delete
    #[serde(default)]
    pub engine: Engine,

    /// Print the command log when a run fails
    #[serde(default)]
    pub debug: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_retention_days() -> i64 {
    7
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

fn default_dir_mode() -> u32 {
    DEFAULT_DIR_MODE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            root_path: None,
            sources: Vec::new(),
            retention_days: default_retention_days(),
            date_format: default_date_format(),
            time_zone: default_time_zone(),
            dir_mode: default_dir_mode(),
            engine: Engine::default(),
            debug: false,
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &RotabakPaths) -> Result<Self, BackupError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            Self::load_from(&settings_path)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Load settings from a specific file
    ///
    /// Files ending in `.yaml` or `.yml` are read as YAML, everything else as JSON.
    pub fn load_from(path: &Path) -> Result<Self, BackupError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            BackupError::Io(format!(
                "Failed to read settings file {}: {}",
                path.display(),
                e
            ))
        })?;

        let parsed = if is_yaml(path) {
            serde_yaml::from_str(&contents).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&contents).map_err(|e| e.to_string())
        };

        parsed.map_err(|e| {
            BackupError::Settings(format!(
                "Failed to parse settings file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Save settings to disk
    pub fn save(&self, paths: &RotabakPaths) -> Result<(), BackupError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            BackupError::Settings(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            BackupError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }

    /// Build a validated backup configuration from these settings
    ///
    /// Date inputs are applied first so a missing root or source directory is
    /// reported after any date problem.
    pub fn build_config(&self, clock: impl Clock + 'static) -> Result<BackupConfig, BackupError> {
        let mut config = BackupConfig::with_clock(clock);
        config
            .set_retention_days(self.retention_days)?
            .set_date_format(self.date_format.as_str())?
            .set_time_zone(&self.time_zone)?
            .set_dir_mode(self.dir_mode)?;

        if let Some(root) = &self.root_path {
            config.set_root_path(root)?;
        }
        if !self.sources.is_empty() {
            config.set_sources(&self.sources)?;
        }

        Ok(config)
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.retention_days, 7);
        assert_eq!(settings.date_format, "%Y-%m-%d");
        assert_eq!(settings.time_zone, "UTC");
        assert_eq!(settings.engine, Engine::Rsync);
        assert!(!settings.debug);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = RotabakPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.root_path = Some(PathBuf::from("/backups"));
        settings.sources = vec![PathBuf::from("/etc/app")];
        settings.engine = Engine::Native;

        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_yaml_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("job.yaml");
        std::fs::write(
            &path,
            "root_path: /backups\nsources:\n  - /etc/apache2\nretention_days: 14\nengine: native\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.root_path, Some(PathBuf::from("/backups")));
        assert_eq!(settings.retention_days, 14);
        assert_eq!(settings.engine, Engine::Native);
        assert_eq!(settings.time_zone, "UTC");
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(matches!(err, BackupError::Settings(_)));
    }

    #[test]
    fn test_build_config() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings {
            root_path: Some(temp_dir.path().to_path_buf()),
            sources: vec![temp_dir.path().to_path_buf()],
            ..Settings::default()
        };

        let config = settings
            .build_config(Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap())
            .unwrap();
        let window = config.window().unwrap();
        assert_eq!(window.today, "2024-03-10");
        assert_eq!(window.delete, "2024-03-03");
        assert_eq!(config.sources().len(), 1);
    }

    #[test]
    fn test_build_config_rejects_bad_values() {
        let settings = Settings {
            time_zone: "Nowhere/Special".into(),
            ..Settings::default()
        };
        assert!(settings.build_config(Utc::now()).unwrap_err().is_config());

        let settings = Settings {
            retention_days: 0,
            ..Settings::default()
        };
        assert!(settings.build_config(Utc::now()).unwrap_err().is_config());
    }
}
