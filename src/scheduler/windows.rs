//! Calendar-window trigger detection.
//!
//! The scheduler samples a coarse clock tick, so a trigger window can be
//! observed zero, one, or several times. Each window therefore pairs a
//! wall-clock predicate with a deduplication key (the epoch minute for
//! cleanup, the day of year for reports), making the trigger idempotent per
//! calendar window regardless of tick jitter. The "second < 30" guard keeps
//! a late first sample inside the window.

use chrono::{DateTime, Datelike, TimeZone, Timelike};

/// Tracks which calendar windows have already fired.
#[derive(Debug, Default)]
pub(crate) struct TriggerTracker {
    last_cleanup_minute: Option<i64>,
    last_report_day: Option<u32>,
}

impl TriggerTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// True exactly once per half-hour window: minute 0 or 30, within the
    /// first 30 seconds, not yet fired for this epoch minute.
    pub(crate) fn cleanup_due<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> bool {
        let minute_key = now.timestamp() / 60;
        let due = (now.minute() == 0 || now.minute() == 30)
            && now.second() < 30
            && self.last_cleanup_minute != Some(minute_key);
        if due {
            self.last_cleanup_minute = Some(minute_key);
        }
        due
    }

    /// True exactly once per day: at `report_hour:00` local time, within the
    /// first 30 seconds, not yet fired for this day of year.
    pub(crate) fn report_due<Tz: TimeZone>(&mut self, now: &DateTime<Tz>, report_hour: u32) -> bool {
        let day_key = now.ordinal();
        let due = now.hour() == report_hour
            && now.minute() == 0
            && now.second() < 30
            && self.last_report_day != Some(day_key);
        if due {
            self.last_report_day = Some(day_key);
        }
        due
    }
}
