//! Plan and report display formatting
//!
//! Formats backup plans, run reports and settings for terminal output.

use std::path::Path;

use crate::backup::{BackupPlan, BackupReport};
use crate::config::Settings;

/// Format a dry-run plan
pub fn format_plan(plan: &BackupPlan, settings: &Settings) -> String {
    let mut output = String::new();

    output.push_str("Backup Plan\n");
    output.push_str("===========\n");
    output.push_str(&format!("Today's folder: {}\n", plan.today_dir.display()));
    output.push_str(&format!(
        "Prune target:   {}\n",
        display_optional(plan.prune_target.as_deref())
    ));
    output.push_str(&format!(
        "Retention:      {} day(s) in {}\n",
        settings.retention_days, settings.time_zone
    ));
    output.push_str(&format!("Engine:         {}\n", settings.engine));
    output.push('\n');

    let source_width = plan
        .destinations
        .iter()
        .map(|(source, _)| source.display().to_string().len())
        .max()
        .unwrap_or(6)
        .max(6);

    output.push_str(&format!(
        "{:<source_width$}  {}\n",
        "Source",
        "Destination",
        source_width = source_width
    ));
    output.push_str(&format!(
        "{:-<source_width$}  {:-<11}\n",
        "",
        "",
        source_width = source_width
    ));
    for (source, destination) in &plan.destinations {
        output.push_str(&format!(
            "{:<source_width$}  {}\n",
            source.display(),
            destination.display(),
            source_width = source_width
        ));
    }

    output
}

/// Format the summary of a completed run
pub fn format_report(report: &BackupReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Backup complete: {}\n",
        report.today_dir.display()
    ));
    output.push_str(&format!(
        "Synchronized {} source(s)\n",
        report.synchronized.len()
    ));
    match &report.pruned {
        Some(path) => output.push_str(&format!("Pruned: {}\n", path.display())),
        None => output.push_str("Pruned: nothing (prune target was today's folder)\n"),
    }

    output
}

/// Format effective settings
pub fn format_settings(settings: &Settings) -> String {
    let mut output = String::new();

    output.push_str("Settings:\n");
    output.push_str(&format!(
        "  Root path:      {}\n",
        display_optional(settings.root_path.as_deref())
    ));
    if settings.sources.is_empty() {
        output.push_str("  Sources:        (none)\n");
    } else {
        output.push_str("  Sources:\n");
        for source in &settings.sources {
            output.push_str(&format!("    - {}\n", source.display()));
        }
    }
    output.push_str(&format!("  Retention days: {}\n", settings.retention_days));
    output.push_str(&format!("  Date format:    {}\n", settings.date_format));
    output.push_str(&format!("  Time zone:      {}\n", settings.time_zone));
    output.push_str(&format!("  Folder mode:    {:o}\n", settings.dir_mode));
    output.push_str(&format!("  Engine:         {}\n", settings.engine));
    output.push_str(&format!("  Debug log:      {}\n", settings.debug));

    output
}

fn display_optional(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not set)".to_string())
}
