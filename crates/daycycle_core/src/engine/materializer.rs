//! Template materializer.
//!
//! # Responsibility
//! - Regenerate today's checklist instances from templates and recurring
//!   custom sources.
//!
//! # Invariants
//! - Re-running for the same day yields the same item count as a single
//!   run: today's generated copies are deleted before regeneration.
//! - Recurring custom sources themselves are never deleted here.

use crate::model::checklist::ChecklistItem;
use crate::repo::checklist_repo::ChecklistRepository;
use crate::repo::RepoResult;
use chrono::NaiveDate;
use log::{error, info};

/// Materializes today's checklist and returns how many items were created.
///
/// # Errors
/// - Returns an error when the idempotency delete or a source query fails;
///   per-item creation failures are logged and skipped.
pub fn materialize_today(repo: &dyn ChecklistRepository, today: NaiveDate) -> RepoResult<u32> {
    // Idempotency guard: a partial earlier run must not leave duplicates.
    let deleted = repo.delete_generated_for_date(today)?;

    let templates = repo.list_active_templates()?;
    let recurring = repo.list_recurring_sources(today)?;

    let mut created = 0u32;
    for template in &templates {
        let item = ChecklistItem::from_template(template, today);
        match repo.create_item(&item) {
            Ok(_) => created += 1,
            Err(err) => {
                error!(
                    "event=materialize module=engine status=item_error template_id={} error={err}",
                    template.id
                );
            }
        }
    }
    for source in &recurring {
        let item = ChecklistItem::from_recurring_source(source, today);
        match repo.create_item(&item) {
            Ok(_) => created += 1,
            Err(err) => {
                error!(
                    "event=materialize module=engine status=item_error source_id={} error={err}",
                    source.id
                );
            }
        }
    }

    info!(
        "event=materialize module=engine status=ok today={today} deleted={deleted} created={created}"
    );
    Ok(created)
}
