//! Cherry-pick engine
//!
//! Three-phase pattern:
//! 1. Gather - preflight checks, PR lookup, strategy resolution (read-only)
//! 2. Plan - create `CherryPickPlan` (pure, testable)
//! 3. Execute - create the branch, replay, optionally push (effectful)
//!
//! [`CherryPick::prepare`] covers phases 1 and 2, [`CherryPick::apply`]
//! covers phase 3, and [`CherryPick::run`] does both.

mod conflict;
mod execute;
mod plan;
mod progress;
mod state;

pub use conflict::{classify_replay_failure, is_conflict};
pub use execute::{CherryPick, CherryPickOutcome, run_until_cancelled};
pub use plan::{CherryPickPlan, PlanAction, ReplayStep, create_cherry_pick_plan};
pub use progress::{NoopProgress, ProgressCallback, Step};
pub use state::CherryPickState;
