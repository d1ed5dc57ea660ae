//! Filesystem collaborators for the backup runner
//!
//! The runner never touches source data directly. It goes through a
//! [`FileOps`] implementation with two capabilities:
//!
//! - `synchronize`: mirror a source directory into a destination, removing
//!   destination entries that no longer exist in the source
//! - `delete_recursive`: remove a path and everything beneath it, treating a
//!   missing path as success
//!
//! Two implementations ship with the crate:
//!
//! - [`ShellOps`]: runs `rsync -a --delete` and `rm -Rf`
//! - [`NativeOps`]: pure Rust, walks the trees with `walkdir`

mod native;
mod shell;

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use native::NativeOps;
pub use shell::ShellOps;

/// Result of one collaborator invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Human-readable form of what was run
    pub command: String,
    /// Exit status, zero on success
    pub status: i32,
    /// Captured output
    pub output: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Capabilities the backup runner needs from the filesystem
///
/// An `Err` means the operation could not be started at all. A started
/// operation that fails reports a non-zero status instead.
pub trait FileOps {
    /// Mirror `source` into `destination`
    fn synchronize(&self, source: &Path, destination: &Path) -> io::Result<CommandOutput>;

    /// Remove `path` recursively if it exists
    fn delete_recursive(&self, path: &Path) -> io::Result<CommandOutput>;
}

impl<T: FileOps + ?Sized> FileOps for &T {
    fn synchronize(&self, source: &Path, destination: &Path) -> io::Result<CommandOutput> {
        (**self).synchronize(source, destination)
    }

    fn delete_recursive(&self, path: &Path) -> io::Result<CommandOutput> {
        (**self).delete_recursive(path)
    }
}

impl<T: FileOps + ?Sized> FileOps for Box<T> {
    fn synchronize(&self, source: &Path, destination: &Path) -> io::Result<CommandOutput> {
        (**self).synchronize(source, destination)
    }

    fn delete_recursive(&self, path: &Path) -> io::Result<CommandOutput> {
        (**self).delete_recursive(path)
    }
}

/// Which collaborator implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// External `rsync` and `rm`
    #[default]
    Rsync,
    /// Built-in directory walker
    Native,
}

impl Engine {
    /// Build the collaborator for this engine
    pub fn file_ops(self) -> Box<dyn FileOps> {
        match self {
            Engine::Rsync => Box::new(ShellOps::default()),
            Engine::Native => Box::new(NativeOps),
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Engine::Rsync => write!(f, "rsync"),
            Engine::Native => write!(f, "native"),
        }
    }
}

impl std::str::FromStr for Engine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rsync" => Ok(Engine::Rsync),
            "native" => Ok(Engine::Native),
            other => Err(format!("unknown engine '{}' (expected rsync or native)", other)),
        }
    }
}
