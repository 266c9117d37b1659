//! Batched deletion executor.
//!
//! Drains one room's pending messages, pushes them through the messaging
//! service in bounded batches, classifies each batch as fully deleted or
//! fully failed, requeues failures for the next cycle, and evicts rooms the
//! service has evidently revoked access to.

use std::sync::Arc;

use crate::{config::CleanupConfig, messenger::Messenger, store::RetentionStore};

/// Result of one cleanup cycle for one room.
///
/// The messaging service reports per-batch, not per-message, so a failed
/// batch counts every message in it as failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanOutcome {
    /// Messages confirmed deleted.
    pub deleted: usize,
    /// Messages whose batch failed; these were requeued (unless the room
    /// was evicted).
    pub failed: usize,
    /// Messages drained and attempted this cycle.
    pub total: usize,
}

impl CleanOutcome {
    /// True when the room had nothing pending ("nothing to clean"), as
    /// opposed to a cycle that attempted and failed.
    pub fn is_noop(&self) -> bool {
        self.total == 0
    }
}

/// Executes cleanup cycles against the external messaging service.
///
/// Shared by the scheduler's periodic sweep and the conversational layer's
/// manual "clean now" command; both receive the same [`CleanOutcome`] shape.
pub struct MessageCleaner {
    store: Arc<RetentionStore>,
    messenger: Arc<dyn Messenger>,
    config: CleanupConfig,
}

impl MessageCleaner {
    pub fn new(
        store: Arc<RetentionStore>,
        messenger: Arc<dyn Messenger>,
        config: CleanupConfig,
    ) -> Self {
        Self {
            store,
            messenger,
            config,
        }
    }

    /// Run one cleanup cycle for `room_id`.
    ///
    /// Failed ids are requeued with fresh timestamps before the eviction
    /// check, so a total failure drops them together with the room; repeated
    /// total failure means the service revoked access, and retrying an
    /// unreachable room forever is wasted work.
    pub async fn clean_room(&self, room_id: i64) -> CleanOutcome {
        let message_ids = self.store.drain_for_deletion(room_id);
        if message_ids.is_empty() {
            return CleanOutcome::default();
        }

        let mut deleted = 0;
        let mut failed: Vec<i64> = Vec::new();

        for batch in message_ids.chunks(self.config.batch_size.max(1)) {
            match self.messenger.delete_messages(room_id, batch).await {
                Ok(true) => deleted += batch.len(),
                Ok(false) => {
                    tracing::warn!(room_id, batch = batch.len(), "Delete batch refused");
                    failed.extend_from_slice(batch);
                }
                Err(e) => {
                    tracing::warn!(
                        room_id,
                        batch = batch.len(),
                        error = %e,
                        "Delete batch failed"
                    );
                    failed.extend_from_slice(batch);
                }
            }
        }

        if !failed.is_empty() {
            self.store.requeue_failed(room_id, &failed);
        }

        if deleted == 0 && failed.len() == message_ids.len() && self.config.evict_unreachable {
            tracing::info!(
                room_id,
                attempted = message_ids.len(),
                "Every deletion failed; evicting unreachable room"
            );
            self.store.delete_room(room_id);
        }

        let outcome = CleanOutcome {
            deleted,
            failed: failed.len(),
            total: message_ids.len(),
        };
        tracing::debug!(
            room_id,
            deleted = outcome.deleted,
            failed = outcome.failed,
            total = outcome.total,
            "Cleanup cycle complete"
        );
        outcome
    }
}
