//! Snapshot persistence configuration.
//!
//! # Example
//!
//! ```toml
//! [snapshot]
//! path = "/var/lib/roomsweep/sweep_cache.json"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where the store's snapshot file lives. The `.tmp` sibling used for atomic
/// replace is derived from this path, so the parent directory must be
/// writable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotConfig {
    /// Snapshot file path.
    /// Default: "sweep_cache.json" (working directory)
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("sweep_cache.json")
}
