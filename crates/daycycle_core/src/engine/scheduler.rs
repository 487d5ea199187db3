//! Reset scheduler: trigger funnel over the engine.
//!
//! # Responsibility
//! - Funnel timer ticks, the precise one-shot deadline and lifecycle
//!   signals into one guarded check entry point.
//! - Track last-activity so long suspensions surface as session gaps.
//!
//! # Invariants
//! - At most one executor run is active; triggers arriving during a run
//!   are dropped, never queued.
//! - The one-shot deadline is re-armed after every check and after every
//!   reset-time change, and only when the next instant is within 24h.

use crate::clock::Clock;
use crate::engine::decision::{reset_instant, SessionGap};
use crate::engine::executor::{ResetEngine, ResetSummary};
use crate::settings::SettingsError;
use chrono::{Duration, NaiveDateTime};
use log::{debug, info};

/// Coarse check cadence hosts should drive `IntervalTick` with.
pub const CHECK_INTERVAL_SECONDS: u64 = 60;

const DEADLINE_ARM_WINDOW_HOURS: i64 = 24;

/// Why the host pumped the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetTrigger {
    /// Coarse interval timer fired.
    IntervalTick,
    /// The armed one-shot deadline fired.
    DeadlineTimer,
    /// The application surface became visible again.
    VisibilityChange,
    /// The window regained focus.
    WindowFocus,
}

impl ResetTrigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IntervalTick => "interval_tick",
            Self::DeadlineTimer => "deadline_timer",
            Self::VisibilityChange => "visibility_change",
            Self::WindowFocus => "window_focus",
        }
    }
}

/// Host-pumped scheduler guarding the engine against concurrent runs.
///
/// The host owns the actual timers; this type owns the policy: which
/// instant to arm, when to drop a trigger and what counts as a session gap.
pub struct ResetScheduler<'a, C: Clock> {
    clock: &'a C,
    engine: ResetEngine<'a, C>,
    reset_in_progress: bool,
    last_activity: NaiveDateTime,
    armed_deadline: Option<NaiveDateTime>,
}

impl<'a, C: Clock> ResetScheduler<'a, C> {
    pub fn new(clock: &'a C, engine: ResetEngine<'a, C>) -> Self {
        let now = clock.now();
        let mut scheduler = Self {
            clock,
            engine,
            reset_in_progress: false,
            last_activity: now,
            armed_deadline: None,
        };
        scheduler.rearm(now);
        scheduler
    }

    pub fn engine(&self) -> &ResetEngine<'a, C> {
        &self.engine
    }

    /// Currently armed one-shot deadline, when within the 24h window.
    pub fn armed_deadline(&self) -> Option<NaiveDateTime> {
        self.armed_deadline
    }

    /// Next instant the tracker day rolls over, from `now`.
    pub fn next_reset_instant(&self, now: NaiveDateTime) -> NaiveDateTime {
        let reset_time = self.engine.settings().reset_time;
        let today_instant = reset_instant(now.date(), reset_time);
        if now < today_instant {
            today_instant
        } else {
            reset_instant(now.date() + Duration::days(1), reset_time)
        }
    }

    /// Single entry point for all triggers.
    ///
    /// Runs the decision gate and, when due, the executor. Returns the run
    /// summary when a reset executed. Triggers arriving while a run is
    /// active are dropped.
    pub fn on_trigger(&mut self, trigger: ResetTrigger) -> Option<ResetSummary> {
        if self.reset_in_progress {
            debug!(
                "event=reset_trigger module=scheduler status=dropped trigger={} detail=run_in_progress",
                trigger.as_str()
            );
            return None;
        }

        self.reset_in_progress = true;
        let now = self.clock.now();
        let gap = SessionGap {
            idle: now - self.last_activity,
            date_at_last_activity: self.last_activity.date(),
        };

        let summary = self.engine.check_and_reset(Some(&gap));
        if let Some(summary) = &summary {
            info!(
                "event=reset_trigger module=scheduler status=ran trigger={} date={}",
                trigger.as_str(),
                summary.date
            );
        }

        self.last_activity = now;
        self.rearm(now);
        self.reset_in_progress = false;
        summary
    }

    /// Applies a new reset time and re-arms the one-shot deadline.
    ///
    /// # Errors
    /// - Returns `SettingsError::InvalidResetTime` for malformed input.
    pub fn update_reset_time(&mut self, raw: &str) -> Result<(), SettingsError> {
        self.engine.update_reset_time(raw)?;
        self.rearm(self.clock.now());
        Ok(())
    }

    /// Applies a new retention horizon.
    pub fn update_retention_days(&mut self, raw: i64) {
        self.engine.update_retention_days(raw);
    }

    /// Runs a user-requested reset through the same reentrancy guard.
    pub fn run_manual(&mut self) -> Option<ResetSummary> {
        if self.reset_in_progress {
            debug!("event=reset_trigger module=scheduler status=dropped trigger=manual detail=run_in_progress");
            return None;
        }

        self.reset_in_progress = true;
        let summary = self.engine.run_manual();
        let now = self.clock.now();
        self.last_activity = now;
        self.rearm(now);
        self.reset_in_progress = false;
        Some(summary)
    }

    fn rearm(&mut self, now: NaiveDateTime) {
        let next = self.next_reset_instant(now);
        self.armed_deadline =
            (next - now <= Duration::hours(DEADLINE_ARM_WINDOW_HOURS)).then_some(next);
        debug!(
            "event=deadline_rearm module=scheduler status=ok armed={}",
            self.armed_deadline.is_some()
        );
    }
}
