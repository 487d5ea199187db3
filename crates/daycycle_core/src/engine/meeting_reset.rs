//! Meeting status resetter.
//!
//! # Responsibility
//! - Clear completion state on today's completed meetings for the new day.
//!
//! # Invariants
//! - Notes are never touched; the repository operation only clears
//!   completion columns.
//! - Meetings dated other than today are left alone.

use crate::repo::meeting_repo::MeetingRepository;
use crate::repo::RepoResult;
use chrono::NaiveDate;
use log::{error, info};

/// Clears completion flags on today's meetings, returning how many changed.
///
/// # Errors
/// - Returns an error only when the listing query fails; per-meeting update
///   failures are logged and skipped.
pub fn reset_meeting_status(repo: &dyn MeetingRepository, today: NaiveDate) -> RepoResult<u32> {
    let completed = repo.list_completed_for_date(today)?;
    let mut cleared = 0u32;

    for meeting in completed {
        match repo.clear_completion(meeting.id) {
            Ok(()) => cleared += 1,
            Err(err) => {
                error!(
                    "event=meeting_reset module=engine status=item_error meeting_id={} error={err}",
                    meeting.id
                );
            }
        }
    }

    info!("event=meeting_reset module=engine status=ok today={today} cleared={cleared}");
    Ok(cleared)
}
