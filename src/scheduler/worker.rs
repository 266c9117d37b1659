//! Cancellable scheduler loop.
//!
//! One background task polls the clock on a coarse tick and fires the
//! twice-hourly cleanup sweep and the once-daily report pass, each exactly
//! once per calendar window. The loop selects between the tick and a
//! cancellation token; [`Scheduler::stop`] cancels and then waits for the
//! loop to exit, so no cleanup or report activity happens after it returns.

use std::{sync::Arc, time::Duration};

use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::{report::format_daily_report, windows::TriggerTracker};
use crate::{
    cleaner::MessageCleaner,
    config::SchedulerConfig,
    messenger::Messenger,
    store::{CleanupStats, RetentionStore},
};

/// Drives periodic cleanup and reporting over every room in the store.
///
/// Generic over the time zone so tests can pin a fixed offset; production
/// callers resolve a named zone via
/// [`SchedulerConfig::zone`](crate::config::SchedulerConfig::zone).
pub struct Scheduler<Tz: TimeZone = chrono_tz::Tz> {
    inner: Arc<Inner<Tz>>,
    cancel: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

struct Inner<Tz: TimeZone> {
    store: Arc<RetentionStore>,
    cleaner: Arc<MessageCleaner>,
    messenger: Arc<dyn Messenger>,
    zone: Tz,
    tick: Duration,
    report_hour: u32,
}

impl<Tz> Scheduler<Tz>
where
    Tz: TimeZone + Send + Sync + 'static,
    Tz::Offset: Send,
{
    pub fn new(
        store: Arc<RetentionStore>,
        cleaner: Arc<MessageCleaner>,
        messenger: Arc<dyn Messenger>,
        zone: Tz,
        config: &SchedulerConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                cleaner,
                messenger,
                zone,
                tick: config.tick(),
                report_hour: config.report_hour,
            }),
            cancel: CancellationToken::new(),
            handle: Mutex::new(None),
        }
    }

    /// Launch the scheduler loop as a background task. Calling `start` on a
    /// scheduler that is already running is a logged no-op.
    pub fn start(&self) {
        let mut handle = self.handle.lock();
        if handle.is_some() {
            tracing::warn!("Scheduler already started");
            return;
        }
        tracing::info!(
            tick_secs = self.inner.tick.as_secs(),
            report_hour = self.inner.report_hour,
            "Starting scheduler"
        );
        *handle = Some(tokio::spawn(run_loop(
            Arc::clone(&self.inner),
            self.cancel.clone(),
        )));
    }

    /// Signal cancellation and wait for the loop to exit.
    ///
    /// Safe to call repeatedly, and before `start`. Once stopped, the
    /// scheduler stays stopped.
    pub async fn stop(&self) {
        self.cancel.cancel();
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Scheduler task failed to join");
            }
            tracing::info!("Scheduler stopped");
        }
    }
}

async fn run_loop<Tz>(inner: Arc<Inner<Tz>>, cancel: CancellationToken)
where
    Tz: TimeZone + Send + Sync,
    Tz::Offset: Send,
{
    let mut ticker = tokio::time::interval(inner.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut tracker = TriggerTracker::new();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let now = Utc::now().with_timezone(&inner.zone);
                let cleanup = tracker.cleanup_due(&now);
                let report = tracker.report_due(&now, inner.report_hour);
                drop(now);

                if cleanup {
                    run_cleanup(&inner.store, &inner.cleaner).await;
                }
                if report {
                    run_daily_reports(&inner.store, inner.messenger.as_ref()).await;
                }
            }
        }
    }
}

/// Sweep every room through one cleanup cycle, recording statistics for
/// each room that had anything to attempt.
pub(crate) async fn run_cleanup(store: &RetentionStore, cleaner: &MessageCleaner) {
    let mut swept = 0;
    let mut deleted = 0;
    let mut failed = 0;

    for room_id in store.room_ids() {
        let outcome = cleaner.clean_room(room_id).await;
        if outcome.is_noop() {
            continue;
        }
        store.record_cleanup(
            room_id,
            CleanupStats::now(outcome.deleted as u64, outcome.failed as u64),
        );
        swept += 1;
        deleted += outcome.deleted;
        failed += outcome.failed;
    }

    if swept > 0 {
        tracing::info!(rooms = swept, deleted, failed, "Cleanup sweep complete");
    } else {
        tracing::debug!("Cleanup sweep complete, nothing pending");
    }
}

/// Send the daily report to every room with recorded cleanup history. Send
/// failures are logged and not retried; the next day's window supersedes.
pub(crate) async fn run_daily_reports(store: &RetentionStore, messenger: &dyn Messenger) {
    for room_id in store.room_ids() {
        let stats = store.daily_stats(room_id);
        if stats.cycle_count == 0 {
            continue;
        }
        let Some(text) = format_daily_report(&stats) else {
            continue;
        };
        if let Err(e) = messenger.send_message(room_id, &text).await {
            tracing::warn!(room_id, error = %e, "Failed to send daily report");
        }
    }
}
