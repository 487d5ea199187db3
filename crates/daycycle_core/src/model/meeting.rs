//! Meeting model.
//!
//! # Responsibility
//! - Define the recurring meeting record whose completion state is cleared
//!   at each day boundary.
//!
//! # Invariants
//! - `notes` survive every reset; only completion state is cleared.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::RecordId;

/// Recurring meeting tracked per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    /// Stable meeting id.
    pub id: RecordId,
    /// Meeting title.
    pub title: String,
    /// Day this meeting occurrence belongs to.
    pub date: NaiveDate,
    /// Whether the occurrence was attended/handled.
    pub completed: bool,
    /// Completion instant, cleared by the daily reset.
    pub completed_at: Option<NaiveDateTime>,
    /// Free-form notes. Never cleared by the reset engine.
    pub notes: String,
}

impl Meeting {
    /// Creates a new incomplete meeting for the given day.
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            date,
            completed: false,
            completed_at: None,
            notes: String::new(),
        }
    }

    /// Clears completion state while preserving notes.
    pub fn clear_completion(&mut self) {
        self.completed = false;
        self.completed_at = None;
    }
}
