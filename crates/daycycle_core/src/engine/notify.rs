//! Reset completion notification surface.
//!
//! # Responsibility
//! - Define the typed observer contract UI collaborators register through
//!   to refresh after a reset.
//!
//! # Invariants
//! - Notification is fire-and-forget; the engine never awaits or inspects
//!   an observer's reaction.

use chrono::{NaiveDate, NaiveDateTime};

/// Payload delivered to observers when an executor run finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetCompleteEvent {
    /// Day the tracker advanced to.
    pub date: NaiveDate,
    /// Instant the run finished.
    pub timestamp: NaiveDateTime,
}

/// Callback interface for reset completion consumers.
pub trait ResetObserver {
    fn on_reset_complete(&self, event: &ResetCompleteEvent);
}
