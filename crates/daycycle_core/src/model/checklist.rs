//! Checklist template and daily-instance models.
//!
//! # Responsibility
//! - Define the immutable template shape daily items are materialized from.
//! - Define the per-day mutable `ChecklistItem` instance.
//!
//! # Invariants
//! - Templates are read-only to the engine; only the user edits them.
//! - A daily item back-references its source via `template_id`; the
//!   reference is informational, never an ownership link.
//! - Items with `recurring = true` are user-created sources, regenerated
//!   each day like templates and exempt from retention pruning.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::RecordId;

/// Reusable checklist definition, the source of truth for recurring content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistTemplate {
    /// Stable template id referenced by materialized items.
    pub id: RecordId,
    /// Checklist entry text copied into each daily instance.
    pub text: String,
    /// Display order, preserved on materialized items.
    pub order: i64,
    /// Optional user-facing grouping label.
    pub category: Option<String>,
    /// Inactive templates are skipped by materialization.
    pub active: bool,
}

impl ChecklistTemplate {
    /// Creates an active template with a generated stable id.
    pub fn new(text: impl Into<String>, order: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            order,
            category: None,
            active: true,
        }
    }
}

/// Mutable per-day checklist instance.
///
/// Created fresh each reset day, destroyed by retention pruning, never
/// resurrected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Stable item id.
    pub id: RecordId,
    /// Calendar day this instance belongs to.
    pub date: NaiveDate,
    /// Entry text, copied from the source at materialization time.
    pub text: String,
    /// Completion flag for the day.
    pub completed: bool,
    /// Completion instant, set when `completed` flips to true.
    pub completed_at: Option<NaiveDateTime>,
    /// Back-reference to the template or recurring source, when generated.
    pub template_id: Option<RecordId>,
    /// Display order, copied from the source.
    pub order: i64,
    /// Marks a user-created recurring source rather than a daily copy.
    pub recurring: bool,
}

impl ChecklistItem {
    /// Materializes a fresh incomplete instance from a template.
    pub fn from_template(template: &ChecklistTemplate, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            text: template.text.clone(),
            completed: false,
            completed_at: None,
            template_id: Some(template.id),
            order: template.order,
            recurring: false,
        }
    }

    /// Materializes a fresh incomplete copy of a recurring custom source.
    pub fn from_recurring_source(source: &ChecklistItem, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            text: source.text.clone(),
            completed: false,
            completed_at: None,
            template_id: Some(source.id),
            order: source.order,
            recurring: false,
        }
    }
}
