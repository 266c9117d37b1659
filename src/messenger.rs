//! Boundary to the external messaging service.
//!
//! Everything this crate knows about the outside world goes through
//! [`Messenger`]: batched message deletion and plain-text sends. Both are
//! assumed to be network calls that can fail or time out; callers treat any
//! error and a `false` deletion result identically as "batch failed".

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessengerError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Rejected by the messaging service: {0}")]
    Rejected(String),
}

pub type MessengerResult<T> = Result<T, MessengerError>;

/// External messaging capability.
///
/// Implementations must be thread-safe and bound their own call timeouts;
/// a timeout surfaces here as an `Err` and is handled like any other
/// failed call.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Delete a batch of messages in one room. `Ok(true)` means the whole
    /// batch was deleted; `Ok(false)` means the service refused it.
    async fn delete_messages(&self, room_id: i64, message_ids: &[i64]) -> MessengerResult<bool>;

    /// Send a plain-text message to a room.
    async fn send_message(&self, room_id: i64, text: &str) -> MessengerResult<()>;
}
