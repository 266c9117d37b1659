//! Configuration for the retention subsystem.
//!
//! The host process embeds [`SweepConfig`] in whatever configuration file it
//! loads; every section and field has a default, so an empty table is a
//! valid configuration.
//!
//! # Example
//!
//! ```toml
//! [cleanup]
//! batch_size = 100
//!
//! [scheduler]
//! timezone = "Europe/Kyiv"
//!
//! [snapshot]
//! path = "/var/lib/roomsweep/sweep_cache.json"
//! ```

mod cleanup;
mod scheduler;
mod snapshot;

pub use cleanup::*;
pub use scheduler::*;
use serde::{Deserialize, Serialize};
pub use snapshot::*;

/// Root configuration for the retention subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    /// Batched-deletion executor settings.
    #[serde(default)]
    pub cleanup: CleanupConfig,

    /// Calendar-window scheduler settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Snapshot persistence settings.
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: SweepConfig = toml::from_str("").unwrap();
        assert_eq!(config.cleanup.batch_size, 100);
        assert_eq!(config.scheduler.timezone, "UTC");
        assert_eq!(
            config.snapshot.path,
            std::path::PathBuf::from("sweep_cache.json")
        );
    }

    #[test]
    fn test_parse_sections() {
        let toml = r#"
            [cleanup]
            batch_size = 50

            [scheduler]
            timezone = "Europe/Kyiv"
            report_hour = 9

            [snapshot]
            path = "/data/sweep.json"
        "#;
        let config: SweepConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.cleanup.batch_size, 50);
        assert_eq!(config.scheduler.report_hour, 9);
        assert_eq!(config.snapshot.path.to_str(), Some("/data/sweep.json"));
    }
}
