//! Custom error types for rotabak
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions. Every error is fatal to the current run.

use thiserror::Error;

/// The main error type for rotabak operations
#[derive(Error, Debug)]
pub enum BackupError {
    /// Missing or invalid configuration, including missing prerequisites
    #[error("Configuration error: {0}")]
    Config(String),

    /// Folder creation and other filesystem errors
    #[error("I/O error: {0}")]
    Io(String),

    /// The directory synchronizer failed for a source
    #[error("Sync error: {0}")]
    Sync(String),

    /// The recursive deleter failed for the prune target
    #[error("Prune error: {0}")]
    Prune(String),

    /// Settings file could not be parsed or written
    #[error("Settings error: {0}")]
    Settings(String),
}

impl BackupError {
    /// Create a configuration error for a setter that has not been called yet
    pub fn missing_setter(setter: &str) -> Self {
        Self::Config(format!("Please call {}() first", setter))
    }

    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a synchronization error
    pub fn is_sync(&self) -> bool {
        matches!(self, Self::Sync(_))
    }

    /// Check if this is a prune error
    pub fn is_prune(&self) -> bool {
        matches!(self, Self::Prune(_))
    }
}

impl From<std::io::Error> for BackupError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BackupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Settings(err.to_string())
    }
}

impl From<serde_yaml::Error> for BackupError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Settings(err.to_string())
    }
}

/// Result type alias for rotabak operations
pub type BackupResult<T> = Result<T, BackupError>;
