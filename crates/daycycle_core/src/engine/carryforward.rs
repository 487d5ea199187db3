//! Carryforward policy.
//!
//! # Responsibility
//! - Roll incomplete todos from previous days into today, applying the
//!   escalation rule on the record itself.
//!
//! # Invariants
//! - Todos dated today, completed todos and opt-outs are never selected.
//! - Each mutated todo persists individually; one failed save never aborts
//!   the remaining items.

use crate::repo::todo_repo::TodoRepository;
use crate::repo::RepoResult;
use chrono::NaiveDate;
use log::{error, info};

/// Carries eligible todos into `today` and returns how many moved.
///
/// `cutoff` bounds how far back the policy looks; anything older is left to
/// the retention pruner instead of resurfacing as active work.
///
/// # Errors
/// - Returns an error only when the candidate query itself fails; per-item
///   persistence failures are logged and skipped.
pub fn carry_forward(
    repo: &dyn TodoRepository,
    today: NaiveDate,
    cutoff: NaiveDate,
) -> RepoResult<u32> {
    let candidates = repo.list_carry_candidates(today, cutoff)?;
    let mut moved = 0u32;

    for mut todo in candidates {
        let id = todo.id;
        todo.carry_into(today);
        match repo.save_todo(&todo) {
            Ok(()) => moved += 1,
            Err(err) => {
                error!(
                    "event=carry_forward module=engine status=item_error todo_id={id} error={err}"
                );
            }
        }
    }

    info!("event=carry_forward module=engine status=ok today={today} moved={moved}");
    Ok(moved)
}
