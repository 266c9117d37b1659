//! Wall-clock-aligned scheduling of cleanup sweeps and daily reports.
//!
//! The [`Scheduler`] runs one cancellable background task that polls a
//! coarse clock tick and fires two independent calendar windows, each
//! exactly once per window regardless of tick jitter:
//!
//! - **Cleanup**, at minute 0 and 30 of every hour: every room is drained
//!   through the cleanup executor and its cycle statistics recorded.
//! - **Daily report**, once a day at the configured local hour: every room
//!   with cleanup history gets a summary message.
//!
//! Windows are evaluated in a configured, DST-aware time zone.

mod report;
mod windows;
mod worker;

pub use worker::Scheduler;
