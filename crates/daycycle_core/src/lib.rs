//! Daily reset and carryforward engine for a local-first work tracker.
//! This crate is the single source of truth for day-boundary invariants.

pub mod clock;
pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod repo;
pub mod settings;

pub use clock::{Clock, SystemClock};
pub use engine::decision::{decide, reset_instant, ResetDecision, SessionGap};
pub use engine::executor::{
    load_settings, PhaseOutcome, ResetEngine, ResetPhase, ResetStores, ResetSummary,
};
pub use engine::notify::{ResetCompleteEvent, ResetObserver};
pub use engine::pruner::PruneOutcome;
pub use engine::scheduler::{ResetScheduler, ResetTrigger, CHECK_INTERVAL_SECONDS};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::checklist::{ChecklistItem, ChecklistTemplate};
pub use model::meeting::Meeting;
pub use model::reset::{ResetBookkeeping, ResetHistoryEntry, ResetKind, ResetReason};
pub use model::todo::{Priority, TodoItem};
pub use repo::{RepoError, RepoResult};
pub use settings::{parse_reset_time, ResetSettings, SettingsError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
