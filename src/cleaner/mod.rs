//! Cleanup execution against the external messaging service.

mod executor;

pub use executor::{CleanOutcome, MessageCleaner};
