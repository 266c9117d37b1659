//! Daily report text.

use crate::store::DailyStats;

/// Render the human-readable daily report for one room. Returns `None` when
/// the retained history has no activity at all, so idle rooms stay silent.
pub(crate) fn format_daily_report(stats: &DailyStats) -> Option<String> {
    if stats.total_deleted == 0 && stats.total_errors == 0 {
        return None;
    }
    Some(format!(
        "Daily cleanup report\n\n\
         Messages deleted: {}\n\
         Failures: {}\n\
         Cleanup cycles: {}",
        group_digits(stats.total_deleted),
        group_digits(stats.total_errors),
        group_digits(stats.cycle_count as u64),
    ))
}

/// Thousands-separated decimal rendering: 1234567 -> "1,234,567".
fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
