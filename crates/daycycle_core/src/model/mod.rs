//! Domain model for daily tracker records.
//!
//! # Responsibility
//! - Define canonical data structures used by the reset engine.
//! - Keep day-boundary semantics (carryforward, escalation, archiving)
//!   expressed on the records themselves where they are pure.
//!
//! # Invariants
//! - Every record is identified by a stable `RecordId`.
//! - Calendar dates are timezone-resolved `NaiveDate`s; instants are
//!   wall-clock `NaiveDateTime`s in the same resolved timezone.

pub mod archive;
pub mod checklist;
pub mod meeting;
pub mod reset;
pub mod todo;

use uuid::Uuid;

/// Stable identifier for every tracker record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type RecordId = Uuid;
