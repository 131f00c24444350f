//! Cherry-pick planning - pure functions for creating cherry-pick plans
//!
//! No I/O happens here. Everything the plan needs (the PR, the resolved
//! strategy, the clock reading) is passed in by the caller.

use crate::error::{ReplayOperation, Result};
use crate::types::{CherryPickBranch, CherryPickRequest, PullRequest, ResolvedStrategy};
use chrono::{DateTime, Utc};
use std::fmt;

/// How the PR's changes get onto the working branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayStep {
    /// Download the PR's patch series and apply it with `git am -3`
    ApplyPatch {
        /// PR whose patch is applied
        pr_number: u64,
    },
    /// Cherry-pick the PR's single merge commit
    CherryPickCommit {
        /// Merge commit SHA
        sha: String,
    },
}

impl ReplayStep {
    /// The git operation this step leaves in progress on conflict
    pub const fn operation(&self) -> ReplayOperation {
        match self {
            Self::ApplyPatch { .. } => ReplayOperation::Am,
            Self::CherryPickCommit { .. } => ReplayOperation::CherryPick,
        }
    }
}

impl fmt::Display for ReplayStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApplyPatch { pr_number } => {
                write!(f, "apply the patch series of PR #{pr_number} (git am -3)")
            }
            Self::CherryPickCommit { sha } => {
                write!(f, "cherry-pick merge commit {}", short_sha(sha))
            }
        }
    }
}

/// One repository-mutating action, for previews
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanAction {
    /// Fetch a branch from the remote
    Fetch {
        /// Remote name
        remote: String,
        /// Branch to fetch
        refname: String,
    },
    /// Create and check out the working branch
    CreateBranch {
        /// New branch name
        name: String,
        /// Remote-tracking ref it starts from
        start_point: String,
    },
    /// Replay the PR's changes
    Replay(ReplayStep),
    /// Push the working branch
    Push {
        /// Remote name
        remote: String,
        /// Branch to push
        branch: String,
    },
}

impl fmt::Display for PlanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch { remote, refname } => write!(f, "fetch {refname} from {remote}"),
            Self::CreateBranch { name, start_point } => {
                write!(f, "create branch {name} at {start_point}")
            }
            Self::Replay(step) => write!(f, "{step}"),
            Self::Push { remote, branch } => write!(f, "push {branch} to {remote}"),
        }
    }
}

/// Cherry-pick plan - the functional core output
///
/// Created by `create_cherry_pick_plan()` (pure) and executed by
/// [`crate::cherry_pick::CherryPick::apply`] (effectful).
#[derive(Debug, Clone)]
pub struct CherryPickPlan {
    /// The merged PR being cherry-picked
    pub pr: PullRequest,
    /// Concrete strategy; never `auto`
    pub strategy: ResolvedStrategy,
    /// Whether the strategy came from inference rather than the request
    pub strategy_inferred: bool,
    /// Remote to fetch from and push to
    pub remote: String,
    /// Branches fetched before the working branch is created
    pub fetch_refs: Vec<String>,
    /// The working branch
    pub branch: CherryPickBranch,
    /// How the changes are replayed
    pub replay: ReplayStep,
    /// Whether the branch is pushed afterwards
    pub push: bool,
}

impl CherryPickPlan {
    /// Every mutating action, in execution order
    pub fn actions(&self) -> Vec<PlanAction> {
        let mut actions: Vec<PlanAction> = self
            .fetch_refs
            .iter()
            .map(|refname| PlanAction::Fetch {
                remote: self.remote.clone(),
                refname: refname.clone(),
            })
            .collect();

        actions.push(PlanAction::CreateBranch {
            name: self.branch.name.clone(),
            start_point: self.branch.start_point.clone(),
        });
        actions.push(PlanAction::Replay(self.replay.clone()));

        if self.push {
            actions.push(PlanAction::Push {
                remote: self.remote.clone(),
                branch: self.branch.name.clone(),
            });
        }
        actions
    }
}

/// Create a cherry-pick plan (PURE - no I/O, easily testable)
///
/// # Arguments
/// * `request` - What the operator asked for
/// * `pr` - The PR as fetched from the code host; must be merged
/// * `strategy` - The resolved strategy
/// * `strategy_inferred` - Whether `strategy` came from inference
/// * `now` - Clock reading used for the branch name
pub fn create_cherry_pick_plan(
    request: &CherryPickRequest,
    pr: PullRequest,
    strategy: ResolvedStrategy,
    strategy_inferred: bool,
    now: DateTime<Utc>,
) -> Result<CherryPickPlan> {
    let merge_commit = pr.merge_commit()?.to_string();

    let replay = match strategy {
        ResolvedStrategy::Rebase => ReplayStep::ApplyPatch {
            pr_number: pr.number,
        },
        ResolvedStrategy::Squash => ReplayStep::CherryPickCommit { sha: merge_commit },
    };

    // The PR's base branch holds the merge commit; the target is where we build.
    let mut fetch_refs = vec![pr.base_ref.clone()];
    if request.onto() != pr.base_ref {
        fetch_refs.push(request.onto().to_string());
    }
    fetch_refs.retain(|r| !r.is_empty());

    let branch = CherryPickBranch::new(pr.number, request.onto(), request.remote(), now);

    Ok(CherryPickPlan {
        pr,
        strategy,
        strategy_inferred,
        remote: request.remote().to_string(),
        fetch_refs,
        branch,
        replay,
        push: request.push(),
    })
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}
