//! Reset executor: the ordered, best-effort phase sequence.
//!
//! # Responsibility
//! - Orchestrate archiving, materialization, carryforward, meeting reset,
//!   retention cleanup, bookkeeping commit and completion notification.
//! - Absorb phase failures: a failed phase is logged and recorded in the
//!   run summary, and the sequence continues.
//!
//! # Invariants
//! - Phases run strictly in order; no phase starts before the previous
//!   phase's persistence calls have settled.
//! - Bookkeeping commits only after all prior phases were attempted, and
//!   `last_reset_date` never moves backward.
//! - The executor itself never returns an error to its caller.

use crate::clock::Clock;
use crate::engine::carryforward::carry_forward;
use crate::engine::decision::{decide, ResetDecision, SessionGap};
use crate::engine::materializer::materialize_today;
use crate::engine::meeting_reset::reset_meeting_status;
use crate::engine::notify::{ResetCompleteEvent, ResetObserver};
use crate::engine::pruner::{prune, PruneOutcome};
use crate::model::archive::{ArchiveRecord, ArchivedItem};
use crate::model::reset::{ResetBookkeeping, ResetHistoryEntry, ResetKind, ResetReason};
use crate::repo::archive_repo::ArchiveRepository;
use crate::repo::checklist_repo::ChecklistRepository;
use crate::repo::meeting_repo::MeetingRepository;
use crate::repo::reset_repo::ResetStateRepository;
use crate::repo::todo_repo::TodoRepository;
use crate::repo::RepoResult;
use crate::settings::{
    clamp_retention_days, parse_reset_time, ResetSettings, SettingsError, CARRY_WINDOW_DAYS,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::{error, info, warn};

/// Settings key for the reset time of day.
pub const SETTING_RESET_TIME: &str = "reset_time";
/// Settings key for the retention horizon in days.
pub const SETTING_RETENTION_DAYS: &str = "data_retention_days";

/// Executor phase labels, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPhase {
    Archiving,
    ChecklistMaterialization,
    TodoCarryforward,
    MeetingReset,
    RetentionCleanup,
    BookkeepingUpdate,
    NotifyComplete,
}

impl ResetPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Archiving => "archiving",
            Self::ChecklistMaterialization => "checklist_materialization",
            Self::TodoCarryforward => "todo_carryforward",
            Self::MeetingReset => "meeting_reset",
            Self::RetentionCleanup => "retention_cleanup",
            Self::BookkeepingUpdate => "bookkeeping_update",
            Self::NotifyComplete => "notify_complete",
        }
    }
}

/// Per-phase outcome recorded in the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseOutcome {
    pub phase: ResetPhase,
    /// Error text when the phase failed; `None` on success.
    pub error: Option<String>,
}

impl PhaseOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of one executor run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetSummary {
    /// Day the run advanced the tracker to.
    pub date: NaiveDate,
    /// Instant the run started.
    pub started_at: NaiveDateTime,
    pub reason: ResetReason,
    pub kind: ResetKind,
    /// Completed checklist items captured into the archive.
    pub archived_items: u32,
    /// Checklist items materialized for the new day.
    pub created_items: u32,
    /// Todos carried into the new day.
    pub carried_todos: u32,
    /// Meetings whose completion state was cleared.
    pub meetings_reset: u32,
    /// Records removed by retention cleanup.
    pub pruned: PruneOutcome,
    /// Phase-by-phase outcomes, in execution order.
    pub phases: Vec<PhaseOutcome>,
}

impl ResetSummary {
    fn new(date: NaiveDate, started_at: NaiveDateTime, reason: ResetReason, kind: ResetKind) -> Self {
        Self {
            date,
            started_at,
            reason,
            kind,
            archived_items: 0,
            created_items: 0,
            carried_todos: 0,
            meetings_reset: 0,
            pruned: PruneOutcome::default(),
            phases: Vec::new(),
        }
    }

    /// True when every phase ran without error.
    pub fn fully_succeeded(&self) -> bool {
        self.phases.iter().all(PhaseOutcome::succeeded)
    }

    /// Outcome of one phase, when it was reached.
    pub fn phase(&self, phase: ResetPhase) -> Option<&PhaseOutcome> {
        self.phases.iter().find(|outcome| outcome.phase == phase)
    }
}

/// Repository handles one executor run operates over.
#[derive(Clone, Copy)]
pub struct ResetStores<'a> {
    pub checklist: &'a dyn ChecklistRepository,
    pub todos: &'a dyn TodoRepository,
    pub meetings: &'a dyn MeetingRepository,
    pub archives: &'a dyn ArchiveRepository,
    pub state: &'a dyn ResetStateRepository,
}

/// Reset engine: decision gate plus phase executor over injected stores.
pub struct ResetEngine<'a, C: Clock> {
    clock: &'a C,
    stores: ResetStores<'a>,
    settings: ResetSettings,
    observers: Vec<Box<dyn ResetObserver + 'a>>,
}

impl<'a, C: Clock> ResetEngine<'a, C> {
    pub fn new(clock: &'a C, stores: ResetStores<'a>, settings: ResetSettings) -> Self {
        Self {
            clock,
            stores,
            settings,
            observers: Vec::new(),
        }
    }

    /// Builds an engine with settings loaded from the settings store.
    pub fn with_stored_settings(clock: &'a C, stores: ResetStores<'a>) -> Self {
        let settings = load_settings(stores.state);
        Self::new(clock, stores, settings)
    }

    pub fn settings(&self) -> &ResetSettings {
        &self.settings
    }

    /// Registers a completion observer. Fire-and-forget, never awaited.
    pub fn subscribe(&mut self, observer: Box<dyn ResetObserver + 'a>) {
        self.observers.push(observer);
    }

    /// Applies a new reset time, recording the change instant for the
    /// time-changed decision rule.
    ///
    /// # Errors
    /// - Returns `SettingsError::InvalidResetTime` for malformed input; the
    ///   previous setting stays active. Persistence failures are absorbed
    ///   and logged.
    pub fn update_reset_time(&mut self, raw: &str) -> Result<(), SettingsError> {
        let reset_time = parse_reset_time(raw)?;
        if reset_time == self.settings.reset_time {
            return Ok(());
        }

        self.settings.reset_time = reset_time;

        if let Err(err) = self.stores.state.set_setting(SETTING_RESET_TIME, raw.trim()) {
            error!("event=settings_update module=engine status=error key=reset_time error={err}");
        }
        match self.stores.state.load_bookkeeping() {
            Ok(mut bookkeeping) => {
                bookkeeping.reset_time_changed_at = Some(self.clock.now());
                if let Err(err) = self.stores.state.save_bookkeeping(&bookkeeping) {
                    error!(
                        "event=settings_update module=engine status=error key=reset_time error={err}"
                    );
                }
            }
            Err(err) => {
                error!("event=settings_update module=engine status=error key=reset_time error={err}");
            }
        }

        info!("event=settings_update module=engine status=ok key=reset_time value={raw}");
        Ok(())
    }

    /// Applies a new retention horizon, clamped to the supported range.
    pub fn update_retention_days(&mut self, raw: i64) {
        let retention_days = clamp_retention_days(raw);
        self.settings.retention_days = retention_days;

        if let Err(err) = self
            .stores
            .state
            .set_setting(SETTING_RETENTION_DAYS, &retention_days.to_string())
        {
            error!(
                "event=settings_update module=engine status=error key=data_retention_days error={err}"
            );
        }
        info!(
            "event=settings_update module=engine status=ok key=data_retention_days value={retention_days}"
        );
    }

    /// Gate + run: evaluates the decision rules and executes when due.
    ///
    /// Returns `None` when no reset was needed. Decision failures degrade to
    /// bootstrap behavior: under-resetting is worse than an extra reset.
    pub fn check_and_reset(&self, gap: Option<&SessionGap>) -> Option<ResetSummary> {
        let now = self.clock.now();
        let bookkeeping = match self.stores.state.load_bookkeeping() {
            Ok(bookkeeping) => bookkeeping,
            Err(err) => {
                warn!(
                    "event=reset_check module=engine status=degraded error={err} fallback=bootstrap"
                );
                ResetBookkeeping::default()
            }
        };

        match decide(now, &bookkeeping, self.settings.reset_time, gap) {
            ResetDecision::Needed(reason) => {
                Some(self.execute(now, reason, ResetKind::Automatic))
            }
            ResetDecision::NotNeeded => None,
        }
    }

    /// Runs the full phase sequence on explicit user request.
    pub fn run_manual(&self) -> ResetSummary {
        self.execute(self.clock.now(), ResetReason::Manual, ResetKind::Manual)
    }

    fn execute(&self, now: NaiveDateTime, reason: ResetReason, kind: ResetKind) -> ResetSummary {
        let today = now.date();
        let mut summary = ResetSummary::new(today, now, reason, kind);
        info!(
            "event=reset_run module=engine status=start date={today} reason={}",
            reason.as_str()
        );

        let previous = match self.stores.state.load_bookkeeping() {
            Ok(bookkeeping) => bookkeeping,
            Err(err) => {
                warn!("event=reset_run module=engine status=degraded error={err}");
                ResetBookkeeping::default()
            }
        };

        let result = self.archive_previous_day(&previous, today, now, &mut summary);
        record_phase(&mut summary, ResetPhase::Archiving, result);

        let result = materialize_today(self.stores.checklist, today)
            .map(|created| summary.created_items = created);
        record_phase(&mut summary, ResetPhase::ChecklistMaterialization, result);

        let carry_cutoff = today - Duration::days(CARRY_WINDOW_DAYS);
        let result = carry_forward(self.stores.todos, today, carry_cutoff)
            .map(|moved| summary.carried_todos = moved);
        record_phase(&mut summary, ResetPhase::TodoCarryforward, result);

        let result = reset_meeting_status(self.stores.meetings, today)
            .map(|cleared| summary.meetings_reset = cleared);
        record_phase(&mut summary, ResetPhase::MeetingReset, result);

        let retention_cutoff = today - Duration::days(i64::from(self.settings.retention_days));
        let result = prune(self.stores.checklist, self.stores.todos, retention_cutoff)
            .map(|outcome| summary.pruned = outcome);
        record_phase(&mut summary, ResetPhase::RetentionCleanup, result);

        let result = self.commit_bookkeeping(&previous, today, now, reason, kind);
        record_phase(&mut summary, ResetPhase::BookkeepingUpdate, result);

        let event = ResetCompleteEvent {
            date: today,
            timestamp: now,
        };
        for observer in &self.observers {
            observer.on_reset_complete(&event);
        }
        record_phase(&mut summary, ResetPhase::NotifyComplete, Ok(()));

        info!(
            "event=reset_run module=engine status={} date={today} reason={} archived={} created={} carried={} meetings={} pruned_checklist={} pruned_todos={}",
            if summary.fully_succeeded() { "ok" } else { "partial" },
            reason.as_str(),
            summary.archived_items,
            summary.created_items,
            summary.carried_todos,
            summary.meetings_reset,
            summary.pruned.deleted_checklist,
            summary.pruned.deleted_todos,
        );
        summary
    }

    fn archive_previous_day(
        &self,
        previous: &ResetBookkeeping,
        today: NaiveDate,
        now: NaiveDateTime,
        summary: &mut ResetSummary,
    ) -> RepoResult<()> {
        let Some(previous_date) = previous.last_reset_date else {
            // Bootstrap: there is no finished day to snapshot.
            return Ok(());
        };
        if previous_date >= today {
            return Ok(());
        }

        let items = self.stores.checklist.list_items_for_date(previous_date)?;
        let archived: Vec<ArchivedItem> = items
            .iter()
            .filter(|item| item.completed)
            .map(|item| ArchivedItem {
                text: item.text.clone(),
                completed_at: item.completed_at,
            })
            .collect();
        let archive = ArchiveRecord {
            date: previous_date,
            created_at: now,
            item_count: items.len() as u32,
            items: archived,
        };

        if self.stores.archives.write_archive(&archive)? {
            summary.archived_items = archive.items.len() as u32;
        } else {
            info!(
                "event=archive module=engine status=skipped date={previous_date} detail=already_archived"
            );
        }
        Ok(())
    }

    fn commit_bookkeeping(
        &self,
        previous: &ResetBookkeeping,
        today: NaiveDate,
        now: NaiveDateTime,
        reason: ResetReason,
        kind: ResetKind,
    ) -> RepoResult<()> {
        // Catch-up collapses missed days: the date jumps straight to today,
        // and it never moves backward.
        let committed_date = previous.last_reset_date.map_or(today, |date| date.max(today));
        let updated = ResetBookkeeping {
            last_reset_date: Some(committed_date),
            last_reset_at: Some(now),
            reset_time_changed_at: previous.reset_time_changed_at,
        };
        self.stores.state.save_bookkeeping(&updated)?;

        self.stores.state.append_history(&ResetHistoryEntry {
            date: today,
            timestamp: now,
            kind,
            reason,
        })?;
        Ok(())
    }
}

/// Loads engine settings from the settings store, falling back to defaults
/// for missing or malformed values.
pub fn load_settings(state: &dyn ResetStateRepository) -> ResetSettings {
    let mut settings = ResetSettings::default();

    match state.get_setting(SETTING_RESET_TIME) {
        Ok(Some(raw)) => match parse_reset_time(&raw) {
            Ok(reset_time) => settings.reset_time = reset_time,
            Err(err) => {
                warn!("event=settings_load module=engine status=degraded key=reset_time error={err}");
            }
        },
        Ok(None) => {}
        Err(err) => {
            warn!("event=settings_load module=engine status=degraded key=reset_time error={err}");
        }
    }

    match state.get_setting(SETTING_RETENTION_DAYS) {
        Ok(Some(raw)) => match raw.parse::<i64>() {
            Ok(days) => settings.retention_days = clamp_retention_days(days),
            Err(_) => {
                warn!(
                    "event=settings_load module=engine status=degraded key=data_retention_days value={raw}"
                );
            }
        },
        Ok(None) => {}
        Err(err) => {
            warn!(
                "event=settings_load module=engine status=degraded key=data_retention_days error={err}"
            );
        }
    }

    settings
}

fn record_phase(summary: &mut ResetSummary, phase: ResetPhase, result: RepoResult<()>) {
    match result {
        Ok(()) => {
            summary.phases.push(PhaseOutcome {
                phase,
                error: None,
            });
        }
        Err(err) => {
            error!(
                "event=reset_phase module=engine status=error phase={} error={err}",
                phase.as_str()
            );
            summary.phases.push(PhaseOutcome {
                phase,
                error: Some(err.to_string()),
            });
        }
    }
}
