//! Per-room message retention with scheduled batched cleanup.
//!
//! `roomsweep` tracks, for every chat room, a set of messages queued for
//! deletion and periodically erases them from the external messaging service
//! in bounded batches, keeping a rolling ring buffer of cleanup statistics
//! per room and snapshotting the whole store to disk with atomic replace.
//!
//! The crate is a library: it defines no network protocol or CLI of its own.
//! The host process wires four pieces together:
//!
//! - [`store::RetentionStore`]: the concurrent per-room state,
//! - [`cleaner::MessageCleaner`]: the batched deletion executor,
//! - [`scheduler::Scheduler`]: the calendar-window background loop,
//! - an implementation of [`messenger::Messenger`]: the external service.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use roomsweep::{MessageCleaner, Messenger, RetentionStore, Scheduler, SweepConfig};
//!
//! # async fn wire(messenger: Arc<dyn Messenger>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = SweepConfig::default();
//!
//! let store = Arc::new(RetentionStore::new());
//! store.load_from_file(&config.snapshot.path).await?;
//!
//! let cleaner = Arc::new(MessageCleaner::new(
//!     Arc::clone(&store),
//!     Arc::clone(&messenger),
//!     config.cleanup.clone(),
//! ));
//!
//! let scheduler = Scheduler::new(
//!     Arc::clone(&store),
//!     Arc::clone(&cleaner),
//!     messenger,
//!     config.scheduler.zone()?,
//!     &config.scheduler,
//! );
//! scheduler.start();
//!
//! // Ingestion path: flag messages for the next cleanup cycle.
//! store.add(1001, 42);
//!
//! // Shutdown: stop the loop, then persist.
//! scheduler.stop().await;
//! store.save_to_file(&config.snapshot.path).await?;
//! # Ok(())
//! # }
//! ```

pub mod cleaner;
pub mod config;
pub mod messenger;
pub mod scheduler;
pub mod store;

pub use cleaner::{CleanOutcome, MessageCleaner};
pub use config::SweepConfig;
pub use messenger::{Messenger, MessengerError, MessengerResult};
pub use scheduler::Scheduler;
pub use store::{
    CleanupStats, DailyStats, PendingMessage, RetentionStore, SnapshotError, SnapshotResult,
};
