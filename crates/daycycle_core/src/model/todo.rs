//! Todo model and carryforward/escalation semantics.
//!
//! # Responsibility
//! - Define the `TodoItem` record and its priority ladder.
//! - Express the carryforward mutation as a pure record operation so the
//!   policy layer stays persistence-only.
//!
//! # Invariants
//! - `carried_from` is set exactly once, on the first carry.
//! - `carry_count` only grows while the todo stays incomplete.
//! - `auto_promoted` flips to true exactly once and never back.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::RecordId;

/// Number of carries after which an incomplete todo escalates to high.
pub const ESCALATION_THRESHOLD: u32 = 3;

/// Priority ladder for todos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Actionable work item scoped to a calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Stable todo id.
    pub id: RecordId,
    /// Work description.
    pub text: String,
    /// Day the todo is currently active on.
    pub date: NaiveDate,
    /// Completion flag.
    pub completed: bool,
    /// User-visible priority; may be raised by auto-promotion.
    pub priority: Priority,
    /// Opt-out flag; `false` excludes the todo from carryforward.
    pub carry_forward: bool,
    /// Day the todo was first carried from. Set once, never rewritten.
    pub carried_from: Option<NaiveDate>,
    /// Times this todo rolled into a new day while incomplete.
    ///
    /// Reset to 0 only by explicit user action outside this engine.
    pub carry_count: u32,
    /// True once escalation raised priority to high.
    pub auto_promoted: bool,
}

impl TodoItem {
    /// Creates a new incomplete todo for the given day.
    pub fn new(text: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            date,
            completed: false,
            priority: Priority::Medium,
            carry_forward: true,
            carried_from: None,
            carry_count: 0,
            auto_promoted: false,
        }
    }

    /// Rolls this todo into `today`, applying escalation when due.
    ///
    /// # Contract
    /// - `carried_from` keeps its first value once set.
    /// - Escalation fires when `carry_count` reaches the threshold and the
    ///   todo is not already high priority; it is permanent.
    pub fn carry_into(&mut self, today: NaiveDate) {
        let previous_date = self.date;
        self.date = today;
        if self.carried_from.is_none() {
            self.carried_from = Some(previous_date);
        }
        self.carry_count += 1;
        if self.carry_count >= ESCALATION_THRESHOLD && self.priority != Priority::High {
            self.priority = Priority::High;
            self.auto_promoted = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Priority, TodoItem};
    use chrono::NaiveDate;

    fn date(text: &str) -> NaiveDate {
        text.parse().unwrap()
    }

    #[test]
    fn carry_into_sets_carried_from_only_once() {
        let mut todo = TodoItem::new("write report", date("2024-01-01"));
        todo.carry_into(date("2024-01-02"));
        assert_eq!(todo.carried_from, Some(date("2024-01-01")));

        todo.carry_into(date("2024-01-03"));
        assert_eq!(todo.carried_from, Some(date("2024-01-01")));
        assert_eq!(todo.date, date("2024-01-03"));
    }

    #[test]
    fn third_carry_promotes_to_high_exactly_once() {
        let mut todo = TodoItem::new("follow up", date("2024-01-01"));
        todo.carry_into(date("2024-01-02"));
        todo.carry_into(date("2024-01-03"));
        assert_eq!(todo.priority, Priority::Medium);
        assert!(!todo.auto_promoted);

        todo.carry_into(date("2024-01-04"));
        assert_eq!(todo.carry_count, 3);
        assert_eq!(todo.priority, Priority::High);
        assert!(todo.auto_promoted);

        todo.carry_into(date("2024-01-05"));
        assert_eq!(todo.priority, Priority::High);
        assert!(todo.auto_promoted);
    }

    #[test]
    fn already_high_todo_is_not_marked_auto_promoted() {
        let mut todo = TodoItem::new("urgent fix", date("2024-01-01"));
        todo.priority = Priority::High;
        todo.carry_count = 2;
        todo.carry_into(date("2024-01-02"));
        assert!(!todo.auto_promoted);
    }
}
