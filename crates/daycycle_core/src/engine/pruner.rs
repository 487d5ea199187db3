//! Retention pruner.
//!
//! # Responsibility
//! - Delete historical records past the retention horizon.
//!
//! # Invariants
//! - Templates, recurring custom sources and incomplete todos are never
//!   deleted, regardless of age.

use crate::repo::checklist_repo::ChecklistRepository;
use crate::repo::todo_repo::TodoRepository;
use crate::repo::RepoResult;
use chrono::NaiveDate;
use log::info;

/// Counts of records removed by one pruning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneOutcome {
    pub deleted_checklist: usize,
    pub deleted_todos: usize,
}

/// Deletes generated checklist items and completed todos dated before
/// `cutoff`.
pub fn prune(
    checklist: &dyn ChecklistRepository,
    todos: &dyn TodoRepository,
    cutoff: NaiveDate,
) -> RepoResult<PruneOutcome> {
    let deleted_checklist = checklist.prune_generated_before(cutoff)?;
    let deleted_todos = todos.prune_completed_before(cutoff)?;

    info!(
        "event=retention_prune module=engine status=ok cutoff={cutoff} checklist={deleted_checklist} todos={deleted_todos}"
    );
    Ok(PruneOutcome {
        deleted_checklist,
        deleted_todos,
    })
}
