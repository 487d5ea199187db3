//! Wall-clock abstraction.
//!
//! # Responsibility
//! - Expose the current instant in the user's resolved timezone.
//! - Keep time an injected dependency so decision logic stays deterministic
//!   under test.
//!
//! # Invariants
//! - All instants handed to the engine are naive wall-clock values in one
//!   consistent timezone; the engine never mixes timezones.

use chrono::{Local, NaiveDate, NaiveDateTime};

/// Time source injected into the scheduler and executor.
pub trait Clock {
    /// Current wall-clock instant in the user's resolved timezone.
    fn now(&self) -> NaiveDateTime;

    /// Current calendar day in the user's resolved timezone.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Production clock backed by the local system timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
