//! Durable snapshots of the retention store.
//!
//! The snapshot is a single JSON file keyed by stringified room id, holding
//! each room's pending messages and cleanup history. Writes go to a `.tmp`
//! sibling and are atomically renamed over the destination, so the on-disk
//! file is always either the previous or the new complete snapshot.
//!
//! Loading accepts two schemas: the current one (`messages` plus
//! `cleanup_history`) and the legacy messages-only map that predates cleanup
//! history. Room-id keys that fail to parse are skipped, not fatal.

use std::{
    collections::{HashMap, VecDeque},
    path::{Path, PathBuf},
};

use super::{
    error::{SnapshotError, SnapshotResult},
    retention::{CleanupStats, HISTORY_CAPACITY, PendingMessage, RetentionStore, RoomState},
};

#[derive(serde::Serialize, serde::Deserialize)]
struct SnapshotFile {
    // No serde default: a legacy file without this field must fail the
    // current-schema parse and fall through to the legacy one.
    messages: HashMap<String, Vec<PendingMessage>>,
    #[serde(default)]
    cleanup_history: HashMap<String, Vec<CleanupStats>>,
}

/// Messages-only schema written by versions that predate cleanup history.
type LegacySnapshot = HashMap<String, Vec<PendingMessage>>;

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Cap a restored history at the ring-buffer capacity, keeping the most
/// recent entries.
fn capped_history(history: Vec<CleanupStats>) -> VecDeque<CleanupStats> {
    let mut history: VecDeque<_> = history.into();
    while history.len() > HISTORY_CAPACITY {
        history.pop_front();
    }
    history
}

impl RetentionStore {
    /// Serialize every room's state and atomically replace the file at
    /// `path`.
    ///
    /// Rooms are copied under their own locks, never a global one, so `add`
    /// calls racing with a save may or may not be captured. Empty pending
    /// lists and histories are omitted, matching the historical file shape.
    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> SnapshotResult<()> {
        let path = path.as_ref();
        let mut snapshot = SnapshotFile {
            messages: HashMap::new(),
            cleanup_history: HashMap::new(),
        };

        for room_id in self.room_ids() {
            let Some((pending, history)) = self.room_snapshot(room_id) else {
                continue;
            };
            let key = room_id.to_string();
            if !pending.is_empty() {
                snapshot.messages.insert(key.clone(), pending);
            }
            if !history.is_empty() {
                snapshot.cleanup_history.insert(key, history);
            }
        }

        let data = serde_json::to_vec(&snapshot)
            .map_err(|e| SnapshotError::Serialization(e.to_string()))?;

        let tmp = tmp_sibling(path);
        tokio::fs::write(&tmp, &data).await?;
        tokio::fs::rename(&tmp, path).await?;

        tracing::debug!(
            path = %path.display(),
            rooms = snapshot.messages.len().max(snapshot.cleanup_history.len()),
            bytes = data.len(),
            "Saved retention snapshot"
        );
        Ok(())
    }

    /// Restore rooms from the snapshot at `path`.
    ///
    /// A missing file is not an error: an empty store is a valid startup
    /// state. Tries the current schema first, then falls back to the legacy
    /// messages-only schema. Rooms present only in `cleanup_history` are
    /// restored as history-only rooms.
    pub async fn load_from_file(&self, path: impl AsRef<Path>) -> SnapshotResult<()> {
        let path = path.as_ref();
        let data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No retention snapshot to load");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if let Ok(snapshot) = serde_json::from_slice::<SnapshotFile>(&data) {
            let mut restored = 0;
            let SnapshotFile {
                messages,
                mut cleanup_history,
            } = snapshot;

            for (key, pending) in messages {
                let Ok(room_id) = key.parse::<i64>() else {
                    tracing::warn!(key, "Skipping unparsable room id in snapshot");
                    continue;
                };
                let history = cleanup_history.remove(&key).unwrap_or_default();
                if pending.is_empty() && history.is_empty() {
                    continue;
                }
                self.insert_room(room_id, RoomState::new(pending, capped_history(history)));
                restored += 1;
            }

            // Rooms with history but no pending messages.
            for (key, history) in cleanup_history {
                let Ok(room_id) = key.parse::<i64>() else {
                    tracing::warn!(key, "Skipping unparsable room id in snapshot");
                    continue;
                };
                if history.is_empty() {
                    continue;
                }
                self.insert_room(room_id, RoomState::new(Vec::new(), capped_history(history)));
                restored += 1;
            }

            tracing::info!(path = %path.display(), rooms = restored, "Loaded retention snapshot");
            return Ok(());
        }

        let legacy: LegacySnapshot = serde_json::from_slice(&data)
            .map_err(|e| SnapshotError::Deserialization(e.to_string()))?;

        let mut restored = 0;
        for (key, pending) in legacy {
            let Ok(room_id) = key.parse::<i64>() else {
                tracing::warn!(key, "Skipping unparsable room id in legacy snapshot");
                continue;
            };
            if pending.is_empty() {
                continue;
            }
            self.insert_room(
                room_id,
                RoomState::new(pending, VecDeque::with_capacity(HISTORY_CAPACITY)),
            );
            restored += 1;
        }

        tracing::info!(path = %path.display(), rooms = restored, "Loaded legacy retention snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn snapshot_path(dir: &TempDir) -> PathBuf {
        dir.path().join("sweep_cache.json")
    }

    #[tokio::test]
    async fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = snapshot_path(&dir);

        let store = RetentionStore::new();
        store.add(100, 1);
        store.add(100, 2);
        store.add(200, 3);
        store.record_cleanup(100, CleanupStats::now(10, 1));
        store.save_to_file(&path).await.unwrap();

        let restored = RetentionStore::new();
        restored.load_from_file(&path).await.unwrap();

        assert_eq!(restored.count_pending(100), 2);
        assert_eq!(restored.count_pending(200), 1);
        let stats = restored.daily_stats(100);
        assert_eq!(stats.total_deleted, 10);
        assert_eq!(stats.total_errors, 1);
        assert_eq!(stats.cycle_count, 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let store = RetentionStore::new();
        store
            .load_from_file(dir.path().join("absent.json"))
            .await
            .unwrap();
        assert!(store.room_ids().is_empty());
    }

    #[tokio::test]
    async fn test_legacy_schema_fallback() {
        let dir = TempDir::new().unwrap();
        let path = snapshot_path(&dir);
        tokio::fs::write(
            &path,
            r#"{"100":[{"message_id":1,"timestamp":1700000000},{"message_id":2,"timestamp":1700000001}]}"#,
        )
        .await
        .unwrap();

        let store = RetentionStore::new();
        store.load_from_file(&path).await.unwrap();

        assert_eq!(store.count_pending(100), 2);
        assert_eq!(store.daily_stats(100).cycle_count, 0);
    }

    #[tokio::test]
    async fn test_unparsable_room_keys_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = snapshot_path(&dir);
        tokio::fs::write(
            &path,
            r#"{"messages":{"not-a-room":[{"message_id":1,"timestamp":0}],"7":[{"message_id":2,"timestamp":0}]},"cleanup_history":{}}"#,
        )
        .await
        .unwrap();

        let store = RetentionStore::new();
        store.load_from_file(&path).await.unwrap();

        assert_eq!(store.room_ids(), vec![7]);
        assert_eq!(store.count_pending(7), 1);
    }

    #[tokio::test]
    async fn test_history_only_rooms_are_restored() {
        let dir = TempDir::new().unwrap();
        let path = snapshot_path(&dir);

        let store = RetentionStore::new();
        store.record_cleanup(300, CleanupStats::now(42, 0));
        store.save_to_file(&path).await.unwrap();

        let restored = RetentionStore::new();
        restored.load_from_file(&path).await.unwrap();

        assert_eq!(restored.count_pending(300), 0);
        assert_eq!(restored.daily_stats(300).total_deleted, 42);
    }

    #[tokio::test]
    async fn test_oversized_history_is_capped_on_load() {
        let dir = TempDir::new().unwrap();
        let path = snapshot_path(&dir);

        let cycles: Vec<String> = (0..60)
            .map(|i| format!(r#"{{"timestamp":{i},"messages_deleted":{i},"errors_count":0}}"#))
            .collect();
        let json = format!(
            r#"{{"messages":{{}},"cleanup_history":{{"5":[{}]}}}}"#,
            cycles.join(",")
        );
        tokio::fs::write(&path, json).await.unwrap();

        let store = RetentionStore::new();
        store.load_from_file(&path).await.unwrap();

        let stats = store.daily_stats(5);
        assert_eq!(stats.cycle_count, HISTORY_CAPACITY);
        // The 12 oldest entries (0..12) were dropped.
        assert_eq!(stats.total_deleted, (12..60).sum::<u64>());
    }

    #[tokio::test]
    async fn test_garbage_file_is_a_deserialization_error() {
        let dir = TempDir::new().unwrap();
        let path = snapshot_path(&dir);
        tokio::fs::write(&path, b"not json at all").await.unwrap();

        let store = RetentionStore::new();
        let err = store.load_from_file(&path).await.unwrap_err();
        assert!(matches!(err, SnapshotError::Deserialization(_)));
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = snapshot_path(&dir);

        let store = RetentionStore::new();
        store.add(100, 1);
        store.save_to_file(&path).await.unwrap();

        store.drain_for_deletion(100);
        store.add(100, 2);
        store.save_to_file(&path).await.unwrap();

        let restored = RetentionStore::new();
        restored.load_from_file(&path).await.unwrap();
        assert_eq!(restored.drain_for_deletion(100), vec![2]);
        // No stray temp file left behind.
        assert!(!tmp_sibling(&path).exists());
    }
}
