//! Concurrent per-room retention store.
//!
//! Tracks, for every chat room, an insertion-ordered list of messages pending
//! deletion plus a bounded ring buffer of past cleanup-cycle statistics. Rooms
//! materialize lazily on first write and are removed wholesale with
//! [`RetentionStore::delete_room`].
//!
//! Each room carries two independent locks, one for the pending list and
//! one for the statistics history, so message ingestion and stats recording
//! never contend with each other. Operations on distinct rooms never contend
//! at all; the map itself is sharded.

use std::{collections::VecDeque, sync::Arc};

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Number of cleanup cycles retained per room. With one cycle every
/// 30 minutes this covers roughly 24 hours.
pub(crate) const HISTORY_CAPACITY: usize = 48;

/// A message queued for batched deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMessage {
    /// Message id assigned by the external messaging service.
    pub message_id: i64,
    /// Unix timestamp of when the message entered the queue. Refreshed when
    /// a failed deletion is requeued.
    #[serde(rename = "timestamp")]
    pub enqueued_at: i64,
}

/// Outcome of one completed cleanup cycle for one room. Immutable once
/// recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupStats {
    /// Unix timestamp of the cycle.
    #[serde(rename = "timestamp")]
    pub at: i64,
    /// Messages deleted in this cycle.
    #[serde(rename = "messages_deleted")]
    pub deleted: u64,
    /// Messages that failed to delete in this cycle.
    #[serde(rename = "errors_count")]
    pub errors: u64,
}

impl CleanupStats {
    /// Create a stats entry stamped with the current time.
    pub fn now(deleted: u64, errors: u64) -> Self {
        Self {
            at: Utc::now().timestamp(),
            deleted,
            errors,
        }
    }
}

/// Rolling aggregate over a room's retained cleanup history.
///
/// "Daily" is an approximation: the history holds the last
/// [`HISTORY_CAPACITY`] cycles, which at the scheduler's twice-hourly cadence
/// spans about 24 hours. It is not a time-windowed query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DailyStats {
    /// Total messages deleted across retained cycles.
    pub total_deleted: u64,
    /// Total failed deletions across retained cycles.
    pub total_errors: u64,
    /// Number of cycles currently retained.
    pub cycle_count: usize,
}

/// Per-room state. The two mutexes are deliberately independent: `pending`
/// is hit on every ingested message, `history` only twice an hour.
pub(crate) struct RoomState {
    pub(crate) pending: Mutex<Vec<PendingMessage>>,
    pub(crate) history: Mutex<VecDeque<CleanupStats>>,
}

impl RoomState {
    pub(crate) fn new(pending: Vec<PendingMessage>, history: VecDeque<CleanupStats>) -> Self {
        Self {
            pending: Mutex::new(pending),
            history: Mutex::new(history),
        }
    }

    fn empty() -> Self {
        Self::new(Vec::new(), VecDeque::with_capacity(HISTORY_CAPACITY))
    }
}

/// Concurrent map of room id to retention state.
///
/// Safe for concurrent access from many ingestion callers plus the scheduler
/// task. The store never calls the external messaging service; draining
/// hands full ownership of the drained ids to the caller and keeps no
/// in-flight state.
#[derive(Default)]
pub struct RetentionStore {
    rooms: DashMap<i64, Arc<RoomState>>,
}

impl RetentionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch-or-create a room. The `Arc` is cloned out so per-room locks are
    /// only ever taken after the map shard guard has been released.
    fn room(&self, room_id: i64) -> Arc<RoomState> {
        self.rooms
            .entry(room_id)
            .or_insert_with(|| Arc::new(RoomState::empty()))
            .clone()
    }

    fn get_room(&self, room_id: i64) -> Option<Arc<RoomState>> {
        self.rooms.get(&room_id).map(|entry| Arc::clone(&entry))
    }

    pub(crate) fn insert_room(&self, room_id: i64, state: RoomState) {
        self.rooms.insert(room_id, Arc::new(state));
    }

    /// Queue a message for deletion, stamped with the current time.
    /// Materializes the room if it does not exist yet.
    pub fn add(&self, room_id: i64, message_id: i64) {
        let room = self.room(room_id);
        room.pending.lock().push(PendingMessage {
            message_id,
            enqueued_at: Utc::now().timestamp(),
        });
    }

    /// Number of messages currently pending for a room; 0 if the room is
    /// unknown.
    pub fn count_pending(&self, room_id: i64) -> usize {
        self.get_room(room_id)
            .map_or(0, |room| room.pending.lock().len())
    }

    /// Atomically take the entire pending list, in insertion order, clearing
    /// it. The caller becomes fully responsible for the returned ids; failed
    /// deletions must be handed back via [`RetentionStore::requeue_failed`].
    pub fn drain_for_deletion(&self, room_id: i64) -> Vec<i64> {
        let Some(room) = self.get_room(room_id) else {
            return Vec::new();
        };
        let drained = std::mem::take(&mut *room.pending.lock());
        drained.into_iter().map(|m| m.message_id).collect()
    }

    /// Re-queue ids whose deletion failed, with a fresh timestamp, so they
    /// are retried in the following cycle.
    pub fn requeue_failed(&self, room_id: i64, message_ids: &[i64]) {
        if message_ids.is_empty() {
            return;
        }
        let room = self.room(room_id);
        let now = Utc::now().timestamp();
        let mut pending = room.pending.lock();
        pending.extend(message_ids.iter().map(|&message_id| PendingMessage {
            message_id,
            enqueued_at: now,
        }));
    }

    /// Record the outcome of one cleanup cycle. Past [`HISTORY_CAPACITY`]
    /// entries the oldest is evicted. Valid on rooms that have never had a
    /// pending message.
    pub fn record_cleanup(&self, room_id: i64, stats: CleanupStats) {
        let room = self.room(room_id);
        let mut history = room.history.lock();
        if history.len() >= HISTORY_CAPACITY {
            history.pop_front();
        }
        history.push_back(stats);
    }

    /// Sum every retained cleanup cycle for a room.
    pub fn daily_stats(&self, room_id: i64) -> DailyStats {
        let Some(room) = self.get_room(room_id) else {
            return DailyStats::default();
        };
        let history = room.history.lock();
        let mut stats = DailyStats {
            cycle_count: history.len(),
            ..DailyStats::default()
        };
        for cycle in history.iter() {
            stats.total_deleted += cycle.deleted;
            stats.total_errors += cycle.errors;
        }
        stats
    }

    /// Ids of every known room, in indeterminate order.
    pub fn room_ids(&self) -> Vec<i64> {
        self.rooms.iter().map(|entry| *entry.key()).collect()
    }

    /// Visit every known room id; stop early when the callback returns
    /// `false`. Iterates over a key snapshot, so the callback may freely
    /// mutate the store; rooms added mid-iteration may or may not be visited.
    pub fn for_each_room(&self, mut f: impl FnMut(i64) -> bool) {
        for room_id in self.room_ids() {
            if !f(room_id) {
                break;
            }
        }
    }

    /// Remove a room's entire state, pending list and history both.
    pub fn delete_room(&self, room_id: i64) {
        self.rooms.remove(&room_id);
    }

    /// Snapshot of a room's state for persistence, taken under the room's
    /// own locks only. Returns `None` for unknown rooms.
    pub(crate) fn room_snapshot(
        &self,
        room_id: i64,
    ) -> Option<(Vec<PendingMessage>, Vec<CleanupStats>)> {
        let room = self.get_room(room_id)?;
        let pending = room.pending.lock().clone();
        let history = room.history.lock().iter().copied().collect();
        Some((pending, history))
    }
}
