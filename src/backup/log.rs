//! Append-only command log
//!
//! Records every external command attempted during a run together with its
//! captured output. Only dumped when a run fails in debug mode.

use std::io::{self, Write};

/// Ordered record of commands and their output
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    entries: Vec<String>,
}

impl CommandLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a command and the output it produced
    pub fn record(&mut self, command: impl Into<String>, output: impl Into<String>) {
        self.entries.push(command.into());
        self.entries.push(output.into());
    }

    /// All entries in the order they were appended
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the numbered log to a writer
    pub fn dump<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writeln!(writer, "Command log ({} entries)", self.entries.len())?;
        for (i, entry) in self.entries.iter().enumerate() {
            writeln!(writer, "  [{}] {}", i, entry.trim_end())?;
        }
        writer.flush()
    }
}
