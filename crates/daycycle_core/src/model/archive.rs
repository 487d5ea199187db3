//! Archive snapshot models.
//!
//! # Responsibility
//! - Define the write-once snapshot of a finished day's checklist results.
//!
//! # Invariants
//! - One archive exists per calendar day; it is never mutated after the
//!   reset that wrote it.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Write-once snapshot of one day's checklist outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    /// Day this snapshot covers.
    pub date: NaiveDate,
    /// Instant the snapshot was written.
    pub created_at: NaiveDateTime,
    /// Total checklist items that existed on the archived day.
    pub item_count: u32,
    /// Completed items captured below.
    pub items: Vec<ArchivedItem>,
}

/// Completed checklist entry captured in an archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedItem {
    /// Entry text at archive time.
    pub text: String,
    /// Completion instant on the archived day.
    pub completed_at: Option<NaiveDateTime>,
}
