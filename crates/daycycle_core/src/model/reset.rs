//! Reset bookkeeping and history models.
//!
//! # Responsibility
//! - Define the singleton bookkeeping record that anchors day-boundary
//!   decisions.
//! - Define the append-only reset history log.
//!
//! # Invariants
//! - Exactly one bookkeeping record exists per store.
//! - `last_reset_date` may jump forward by several days (catch-up) but
//!   never moves backward.
//! - History entries are append-only and never rewritten.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Why the decision engine requested a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResetReason {
    /// No previous reset recorded.
    Bootstrap,
    /// Long inactivity gap crossed a day boundary.
    SessionGap,
    /// Calendar day rolled past the configured reset time.
    DayRolled,
    /// More than one missed day collapsed into a single reset.
    CatchUp,
    /// Reset time was moved earlier/later after today's reset already ran.
    TimeChanged,
    /// Explicit user-requested reset.
    Manual,
}

impl ResetReason {
    /// Stable wire/storage label for this reason.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bootstrap => "bootstrap",
            Self::SessionGap => "session-gap",
            Self::DayRolled => "day-rolled",
            Self::CatchUp => "catch-up",
            Self::TimeChanged => "time-changed",
            Self::Manual => "manual",
        }
    }

    /// Parses a stored label back into a reason.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "bootstrap" => Some(Self::Bootstrap),
            "session-gap" => Some(Self::SessionGap),
            "day-rolled" => Some(Self::DayRolled),
            "catch-up" => Some(Self::CatchUp),
            "time-changed" => Some(Self::TimeChanged),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }
}

/// Whether a reset was engine-driven or user-requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetKind {
    Automatic,
    Manual,
}

impl ResetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Automatic => "automatic",
            Self::Manual => "manual",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "automatic" => Some(Self::Automatic),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }
}

/// Singleton record anchoring day-boundary decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetBookkeeping {
    /// Calendar day of the last completed reset.
    pub last_reset_date: Option<NaiveDate>,
    /// Instant the last reset committed.
    pub last_reset_at: Option<NaiveDateTime>,
    /// Instant the reset-time setting last changed, for the time-changed rule.
    pub reset_time_changed_at: Option<NaiveDateTime>,
}

/// One entry of the append-only reset log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetHistoryEntry {
    /// Day the reset advanced the tracker to.
    pub date: NaiveDate,
    /// Instant the reset committed.
    pub timestamp: NaiveDateTime,
    /// Automatic or manual.
    pub kind: ResetKind,
    /// Decision reason recorded for diagnostics.
    pub reason: ResetReason,
}
