//! Scheduler configuration.
//!
//! # Example
//!
//! ```toml
//! [scheduler]
//! timezone = "Europe/Kyiv"
//! tick_secs = 10
//! report_hour = 12
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Unknown time zone: {0}")]
pub struct UnknownTimeZone(pub String);

/// Configuration for the cleanup/report scheduler.
///
/// Calendar windows (twice-hourly cleanup, once-daily reporting) are
/// evaluated in the configured time zone, DST included. The tick only has to
/// be finer than the 30-second trigger windows; 10 seconds is plenty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// IANA time zone name the calendar windows are evaluated in.
    /// Default: "UTC"
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Seconds between clock polls. Must stay below 30 or trigger windows
    /// can be missed entirely.
    /// Default: 10
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,

    /// Local hour (0-23) at which daily reports go out.
    /// Default: 12
    #[serde(default = "default_report_hour")]
    pub report_hour: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            tick_secs: default_tick_secs(),
            report_hour: default_report_hour(),
        }
    }
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_tick_secs() -> u64 {
    10
}

fn default_report_hour() -> u32 {
    12
}

impl SchedulerConfig {
    /// Resolve the configured zone name against the IANA database.
    pub fn zone(&self) -> Result<chrono_tz::Tz, UnknownTimeZone> {
        self.timezone
            .parse()
            .map_err(|_| UnknownTimeZone(self.timezone.clone()))
    }

    /// Get the poll tick as a Duration.
    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.tick_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.timezone, "UTC");
        assert_eq!(config.tick_secs, 10);
        assert_eq!(config.report_hour, 12);
        assert_eq!(config.zone().unwrap(), chrono_tz::UTC);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            timezone = "Europe/Kyiv"
            tick_secs = 5
            report_hour = 9
        "#;
        let config: SchedulerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.zone().unwrap(), chrono_tz::Europe::Kyiv);
        assert_eq!(config.tick(), Duration::from_secs(5));
        assert_eq!(config.report_hour, 9);
    }

    #[test]
    fn test_unknown_zone_is_an_error() {
        let config = SchedulerConfig {
            timezone: "Mars/Olympus_Mons".to_string(),
            ..SchedulerConfig::default()
        };
        assert!(config.zone().is_err());
    }

    #[test]
    fn test_zero_tick_is_clamped() {
        let config = SchedulerConfig {
            tick_secs: 0,
            ..SchedulerConfig::default()
        };
        assert_eq!(config.tick(), Duration::from_secs(1));
    }
}
