//! Cleanup executor configuration.
//!
//! # Example
//!
//! ```toml
//! [cleanup]
//! batch_size = 100
//! evict_unreachable = true
//! ```

use serde::{Deserialize, Serialize};

/// Configuration for the batched cleanup executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CleanupConfig {
    /// Messages per external delete call. The messaging service caps batch
    /// deletes at 100; raising this past the service limit makes every batch
    /// fail.
    /// Default: 100
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Evict a room entirely when a cycle attempts deletions and every one
    /// of them fails. Total failure usually means the service revoked access
    /// to the room, and retrying forever against it is wasted work.
    /// Default: true
    #[serde(default = "default_evict_unreachable")]
    pub evict_unreachable: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            evict_unreachable: default_evict_unreachable(),
        }
    }
}

fn default_batch_size() -> usize {
    100
}

fn default_evict_unreachable() -> bool {
    true
}
