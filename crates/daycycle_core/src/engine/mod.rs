//! Daily reset engine.
//!
//! # Responsibility
//! - Decide when a new tracker day begins and drive every state transition
//!   across that boundary.
//! - Keep the decision pure, the phases best-effort and the scheduler the
//!   only place aware of timers and lifecycle signals.
//!
//! # Invariants
//! - At most one executor run is active per engine instance.
//! - Bookkeeping is committed only after every prior phase was attempted.

pub mod carryforward;
pub mod decision;
pub mod executor;
pub mod materializer;
pub mod meeting_reset;
pub mod notify;
pub mod pruner;
pub mod scheduler;
