//! Per-room retention state and its durable snapshots.
//!
//! [`RetentionStore`] owns, for every chat room, the list of messages
//! pending deletion and a bounded ring buffer of cleanup-cycle statistics.
//! The snapshot codec persists the whole store as a single JSON file with
//! atomic replace and legacy-schema fallback on load.

mod error;
mod retention;
mod snapshot;

pub use error::{SnapshotError, SnapshotResult};
pub use retention::{CleanupStats, DailyStats, PendingMessage, RetentionStore};
