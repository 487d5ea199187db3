//! Reset decision rules.
//!
//! # Responsibility
//! - Decide, from bookkeeping and the current instant alone, whether a
//!   day-boundary reset is due and why.
//!
//! # Invariants
//! - `decide` is a pure function: no I/O, no clock access, deterministic
//!   for identical inputs.
//! - Rules are evaluated in a fixed order; the first match wins.

use crate::model::reset::{ResetBookkeeping, ResetReason};
use crate::settings::SESSION_GAP_MINUTES;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Inactivity observation handed in by the scheduler.
///
/// Captures how long the session sat idle and which calendar day was
/// current when activity was last seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionGap {
    /// Time since the last observed activity.
    pub idle: Duration,
    /// Calendar day current at the last observed activity.
    pub date_at_last_activity: NaiveDate,
}

/// Outcome of one decision evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetDecision {
    NotNeeded,
    Needed(ResetReason),
}

impl ResetDecision {
    pub fn is_needed(self) -> bool {
        matches!(self, Self::Needed(_))
    }

    pub fn reason(self) -> Option<ResetReason> {
        match self {
            Self::Needed(reason) => Some(reason),
            Self::NotNeeded => None,
        }
    }
}

/// Combines a calendar date with the configured reset time of day.
pub fn reset_instant(date: NaiveDate, reset_time: NaiveTime) -> NaiveDateTime {
    date.and_time(reset_time)
}

/// Evaluates the reset rules in order; the first match wins.
///
/// Rules:
/// 1. no reset ever recorded -> `Bootstrap`
/// 2. idle gap above threshold crossing a day boundary -> `SessionGap`
/// 3. exactly one day stale, past today's reset instant -> `DayRolled`
/// 4. more than one day stale, past today's reset instant -> `CatchUp`
/// 5. same day, reset time moved after the last reset, instant passed ->
///    `TimeChanged`
///
/// A `last_reset_date` in the future (clock moved backward) never triggers;
/// bookkeeping must not move backward.
pub fn decide(
    now: NaiveDateTime,
    bookkeeping: &ResetBookkeeping,
    reset_time: NaiveTime,
    gap: Option<&SessionGap>,
) -> ResetDecision {
    let today = now.date();

    let Some(last_reset_date) = bookkeeping.last_reset_date else {
        return ResetDecision::Needed(ResetReason::Bootstrap);
    };

    if let Some(gap) = gap {
        if gap.idle > Duration::minutes(SESSION_GAP_MINUTES) && gap.date_at_last_activity != today
        {
            return ResetDecision::Needed(ResetReason::SessionGap);
        }
    }

    let staleness = (today - last_reset_date).num_days();
    if staleness >= 1 && now >= reset_instant(today, reset_time) {
        // Several missed days collapse into one catch-up reset.
        if staleness > 1 {
            return ResetDecision::Needed(ResetReason::CatchUp);
        }
        return ResetDecision::Needed(ResetReason::DayRolled);
    }

    if staleness == 0 {
        if let (Some(changed_at), Some(last_reset_at)) =
            (bookkeeping.reset_time_changed_at, bookkeeping.last_reset_at)
        {
            if changed_at > last_reset_at && now >= reset_instant(today, reset_time) {
                return ResetDecision::Needed(ResetReason::TimeChanged);
            }
        }
    }

    ResetDecision::NotNeeded
}
