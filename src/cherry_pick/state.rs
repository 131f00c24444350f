//! Run state machine
//!
//! Transitions are strictly linear; the only way off the line is `Failed`.

use crate::cherry_pick::progress::Step;
use crate::error::{Error, ErrorKind, Result};
use std::fmt;

/// Where a cherry-pick run currently stands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CherryPickState {
    /// Nothing has happened yet
    #[default]
    Idle,
    /// Working tree is clean and no operation is in progress
    PreflightOk,
    /// The PR was fetched and is merged
    PrResolved,
    /// A concrete strategy was chosen
    StrategyResolved,
    /// The working branch exists and is checked out
    BranchReady,
    /// The PR's changes were applied
    Replayed,
    /// The branch was pushed
    Published,
    /// A step failed
    Failed(ErrorKind),
}

impl CherryPickState {
    /// State reached when `step` succeeds
    pub const fn after(step: Step) -> Self {
        match step {
            Step::Preflight => Self::PreflightOk,
            Step::ResolvePr => Self::PrResolved,
            Step::ResolveStrategy => Self::StrategyResolved,
            Step::PrepareBranch => Self::BranchReady,
            Step::Replay => Self::Replayed,
            Step::Publish => Self::Published,
        }
    }

    /// State required before `step` may start
    pub const fn before(step: Step) -> Self {
        match step {
            Step::Preflight => Self::Idle,
            Step::ResolvePr => Self::PreflightOk,
            Step::ResolveStrategy => Self::PrResolved,
            Step::PrepareBranch => Self::StrategyResolved,
            Step::Replay => Self::BranchReady,
            Step::Publish => Self::Replayed,
        }
    }

    /// Move past `step`, rejecting out-of-order transitions
    pub fn advance(self, step: Step) -> Result<Self> {
        if self == Self::before(step) {
            Ok(Self::after(step))
        } else {
            Err(Error::Internal(format!(
                "cannot run step '{step}' from state {self}"
            )))
        }
    }

    /// Whether the run stopped on an error
    pub const fn is_failed(self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Whether no further step will run
    ///
    /// `Replayed` is terminal only when publishing was not requested.
    pub const fn is_terminal(self, push_requested: bool) -> bool {
        match self {
            Self::Published | Self::Failed(_) => true,
            Self::Replayed => !push_requested,
            _ => false,
        }
    }
}

impl fmt::Display for CherryPickState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::PreflightOk => write!(f, "preflight ok"),
            Self::PrResolved => write!(f, "PR resolved"),
            Self::StrategyResolved => write!(f, "strategy resolved"),
            Self::BranchReady => write!(f, "branch ready"),
            Self::Replayed => write!(f, "replayed"),
            Self::Published => write!(f, "published"),
            Self::Failed(kind) => write!(f, "failed ({kind})"),
        }
    }
}
