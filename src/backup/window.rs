//! Date-window calculation
//!
//! Derives the label of today's dated folder and the label of the folder that
//! has aged out of the retention window. Days are subtracted on the calendar
//! in the configured zone, so a window spanning a daylight-saving change still
//! lands on the same wall-clock time.

use std::fmt::Write;

use chrono::{DateTime, Days, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

/// Folder labels for one backup run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    /// Label of today's dated folder
    pub today: String,
    /// Label of the folder to prune
    pub delete: String,
}

impl DateWindow {
    /// Compute the window, or `None` while any input is still missing
    ///
    /// This never fails: it doubles as the readiness check for the
    /// configuration holder.
    pub fn compute(
        retention_days: Option<u32>,
        date_format: Option<&str>,
        time_zone: Option<Tz>,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let (days, format, tz) = (retention_days?, date_format?, time_zone?);

        let local = now.with_timezone(&tz);
        let today = format_label(&local, format)?;

        let past = local.naive_local().checked_sub_days(Days::new(u64::from(days)))?;
        let delete = format_label(&resolve_local(tz, past), format)?;

        Some(Self { today, delete })
    }
}

/// Format a timestamp, returning `None` if the pattern contains invalid items
pub(crate) fn format_label<T>(timestamp: &DateTime<T>, format: &str) -> Option<String>
where
    T: TimeZone,
    T::Offset: std::fmt::Display,
{
    let mut label = String::new();
    write!(label, "{}", timestamp.format(format)).ok()?;
    Some(label)
}

/// Map a wall-clock time back into the zone
///
/// Ambiguous times (clocks turned back) take the earlier instant. Times skipped
/// by a forward jump are read with the offset in force before the jump, which
/// moves them past the gap.
fn resolve_local(tz: Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    if let Some(resolved) = tz.from_local_datetime(&naive).earliest() {
        return resolved;
    }

    let before_gap = tz
        .from_utc_datetime(&(naive - TimeDelta::days(1)))
        .offset()
        .fix();
    let utc = naive - TimeDelta::seconds(i64::from(before_gap.local_minus_utc()));
    tz.from_utc_datetime(&utc)
}
