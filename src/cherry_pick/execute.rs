//! Cherry-pick execution - the run state machine
//!
//! [`CherryPick`] walks the six steps in order, gating each on the previous
//! one. The first failure moves the run to `Failed` and is returned as is;
//! nothing is retried and nothing is rolled back. A cancellation signal
//! given with [`CherryPick::with_cancel`] fails the in-flight step the same
//! way, with [`Error::Cancelled`].

use crate::cherry_pick::conflict::classify_replay_failure;
use crate::cherry_pick::plan::{CherryPickPlan, ReplayStep, create_cherry_pick_plan};
use crate::cherry_pick::progress::{ProgressCallback, Step};
use crate::cherry_pick::state::CherryPickState;
use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::strategy::inspect_merge_strategy;
use crate::types::{CherryPickBranch, CherryPickRequest, PullRequest, ResolvedStrategy};
use crate::vcs::Vcs;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;
use tracing::debug;

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct CherryPickOutcome {
    /// PR that was cherry-picked
    pub pr_number: u64,
    /// Strategy used for the replay
    pub strategy: ResolvedStrategy,
    /// Branch holding the result
    pub branch: CherryPickBranch,
    /// Whether the branch was pushed
    pub pushed: bool,
    /// Final state (`Replayed` or `Published`)
    pub state: CherryPickState,
}

/// Future that completes when the run should stop
type CancelSignal<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// One cherry-pick run over a working repository
///
/// Holds the repository exclusively for the run: every mutating method
/// takes `&mut self`.
pub struct CherryPick<'a> {
    vcs: &'a dyn Vcs,
    platform: &'a dyn PlatformService,
    progress: &'a dyn ProgressCallback,
    clock: fn() -> DateTime<Utc>,
    cancel: Option<CancelSignal<'a>>,
    state: CherryPickState,
}

impl<'a> CherryPick<'a> {
    /// Create a run in the `Idle` state
    pub fn new(
        vcs: &'a dyn Vcs,
        platform: &'a dyn PlatformService,
        progress: &'a dyn ProgressCallback,
    ) -> Self {
        Self {
            vcs,
            platform,
            progress,
            clock: Utc::now,
            cancel: None,
            state: CherryPickState::Idle,
        }
    }

    /// Use a different clock for branch timestamps
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Stop the run when `cancel` completes
    ///
    /// The step in flight is dropped (killing any child process it was
    /// waiting on) and fails with [`Error::Cancelled`].
    #[must_use]
    pub fn with_cancel(mut self, cancel: impl Future<Output = ()> + Send + 'a) -> Self {
        self.cancel = Some(Box::pin(cancel));
        self
    }

    /// Current state
    pub const fn state(&self) -> CherryPickState {
        self.state
    }

    /// Run every step
    pub async fn run(&mut self, request: &CherryPickRequest) -> Result<CherryPickOutcome> {
        let plan = self.prepare(request).await?;
        self.apply(&plan).await
    }

    /// Steps 1-3: check the repository, resolve the PR and the strategy
    ///
    /// Reads only; the repository is untouched when this returns.
    pub async fn prepare(&mut self, request: &CherryPickRequest) -> Result<CherryPickPlan> {
        let (vcs, platform, progress) = (self.vcs, self.platform, self.progress);
        let pr_number = request.pr_number();
        debug!(pr_number, onto = request.onto(), strategy = %request.strategy(), "preparing cherry-pick");

        self.run_step(Step::Preflight, preflight(vcs, progress), |_| {
            "repository is available for cherry-pick".to_string()
        })
        .await?;

        let pr = self
            .run_step(
                Step::ResolvePr,
                resolve_pr(platform, progress, pr_number),
                |_| "fetched the pull request".to_string(),
            )
            .await?;

        let (strategy, inferred) = self
            .run_step(
                Step::ResolveStrategy,
                resolve_strategy(platform, progress, request, &pr),
                |(strategy, _)| format!("determined merge strategy as {strategy}"),
            )
            .await?;

        create_cherry_pick_plan(request, pr, strategy, inferred, (self.clock)())
    }

    /// Steps 4-6: create the branch, replay, and push if requested
    ///
    /// On a conflict the branch stays checked out with the operation in
    /// progress so the operator can finish it.
    pub async fn apply(&mut self, plan: &CherryPickPlan) -> Result<CherryPickOutcome> {
        let (vcs, platform, progress) = (self.vcs, self.platform, self.progress);
        debug!(branch = %plan.branch, replay = %plan.replay, "applying cherry-pick plan");

        self.run_step(
            Step::PrepareBranch,
            prepare_branch(vcs, progress, plan),
            |_| {
                format!(
                    "checked out to {} based on {}",
                    plan.branch, plan.branch.onto
                )
            },
        )
        .await?;

        self.run_step(
            Step::Replay,
            replay(vcs, platform, progress, plan),
            |_| match plan.strategy {
                ResolvedStrategy::Rebase => {
                    format!("rebased branch {} onto {}", plan.branch, plan.branch.onto)
                }
                ResolvedStrategy::Squash => {
                    format!("cherry-picked branch {} onto {}", plan.branch, plan.branch.onto)
                }
            },
        )
        .await?;

        if plan.push {
            self.run_step(Step::Publish, publish(vcs, progress, plan), |_| {
                format!("pushed {} to {}", plan.branch, plan.remote)
            })
            .await?;
        }

        Ok(CherryPickOutcome {
            pr_number: plan.pr.number,
            strategy: plan.strategy,
            branch: plan.branch.clone(),
            pushed: plan.push,
            state: self.state,
        })
    }

    async fn run_step<T, F, S>(&mut self, step: Step, work: F, summary: S) -> Result<T>
    where
        F: Future<Output = Result<T>>,
        S: FnOnce(&T) -> String,
    {
        let next = self.state.advance(step)?;
        self.progress.on_step_started(step).await;

        let result = match self.cancel.as_mut() {
            Some(cancel) => tokio::select! {
                biased;
                () = cancel.as_mut() => {
                    debug!(%step, "cancellation requested");
                    Err(Error::Cancelled)
                }
                result = work => result,
            },
            None => work.await,
        };

        match result {
            Ok(value) => {
                self.state = next;
                debug!(%step, state = %self.state, "step finished");
                self.progress.on_step_finished(step, &summary(&value)).await;
                Ok(value)
            }
            Err(err) => {
                self.state = CherryPickState::Failed(err.kind());
                debug!(%step, error = %err, "step failed");
                self.progress.on_step_failed(step, &err).await;
                Err(err)
            }
        }
    }
}

async fn preflight(vcs: &dyn Vcs, progress: &dyn ProgressCallback) -> Result<()> {
    progress.on_message("checking repository is dirty").await;
    if vcs.is_dirty().await? {
        return Err(Error::Setup(
            "the repository is dirty. please commit your changes before continuing".to_string(),
        ));
    }

    progress
        .on_message("checking repository is in a rebase or am")
        .await;
    if vcs.is_in_rebase_or_am().await? {
        return Err(Error::Setup(
            "the repository is in a rebase or am. please resolve the rebase or am before continuing"
                .to_string(),
        ));
    }
    Ok(())
}

async fn resolve_pr(
    platform: &dyn PlatformService,
    progress: &dyn ProgressCallback,
    pr_number: u64,
) -> Result<PullRequest> {
    progress
        .on_message(&format!("getting the pull request #{pr_number}"))
        .await;
    let pr = platform.get_pull_request(pr_number).await?;
    progress
        .on_message(&format!(
            "{} (#{}) by {}\n  {} ← {}",
            pr.title, pr.number, pr.author, pr.base_ref, pr.head_ref
        ))
        .await;

    pr.merge_commit()?;
    Ok(pr)
}

async fn resolve_strategy(
    platform: &dyn PlatformService,
    progress: &dyn ProgressCallback,
    request: &CherryPickRequest,
    pr: &PullRequest,
) -> Result<(ResolvedStrategy, bool)> {
    if let Some(strategy) = request.strategy().resolved() {
        progress
            .on_message(&format!("using merge strategy {strategy} with given flag"))
            .await;
        return Ok((strategy, false));
    }

    progress
        .on_message("determining merge strategy automatically")
        .await;
    let strategy = inspect_merge_strategy(platform, pr.number, pr.merge_commit()?).await?;
    Ok((strategy, true))
}

async fn prepare_branch(
    vcs: &dyn Vcs,
    progress: &dyn ProgressCallback,
    plan: &CherryPickPlan,
) -> Result<()> {
    progress
        .on_message(&format!("branch name:    {}", plan.branch))
        .await;
    progress
        .on_message(&format!("starting point: {}", plan.branch.start_point))
        .await;

    for refname in &plan.fetch_refs {
        progress
            .on_message(&format!("fetching the branch {refname}"))
            .await;
        vcs.fetch(&plan.remote, refname).await?;
    }

    progress
        .on_message(&format!(
            "checking out a new branch {} based on {}",
            plan.branch, plan.branch.onto
        ))
        .await;
    vcs.checkout_new_branch(&plan.branch.name, &plan.branch.start_point)
        .await
}

async fn replay(
    vcs: &dyn Vcs,
    platform: &dyn PlatformService,
    progress: &dyn ProgressCallback,
    plan: &CherryPickPlan,
) -> Result<()> {
    let operation = plan.replay.operation();
    let result = match &plan.replay {
        ReplayStep::ApplyPatch { pr_number } => {
            progress.on_message("fetching diff").await;
            let patch = platform.get_pull_request_diff(*pr_number).await?;
            if patch.iter().all(u8::is_ascii_whitespace) {
                return Err(Error::Validation(format!(
                    "PR #{pr_number} has an empty patch; nothing to apply"
                )));
            }
            progress.on_message("applying diff").await;
            vcs.apply_patch(&patch).await
        }
        ReplayStep::CherryPickCommit { sha } => {
            progress
                .on_message(&format!("cherry-picking PR merge commit {sha}"))
                .await;
            vcs.replay_commit(sha).await
        }
    };

    result.map_err(|e| classify_replay_failure(e, plan.pr.number, &plan.branch.name, operation))
}

async fn publish(vcs: &dyn Vcs, progress: &dyn ProgressCallback, plan: &CherryPickPlan) -> Result<()> {
    progress
        .on_message(&format!("pushing {} to {}", plan.branch, plan.remote))
        .await;
    vcs.push(&plan.remote, &plan.branch.name).await
}

/// Race `work` against `cancel`
///
/// If `cancel` completes first, `work` is dropped (killing any child process
/// it was waiting on) and [`Error::Cancelled`] is returned. For work outside
/// a [`CherryPick`] run; a run takes its signal through
/// [`CherryPick::with_cancel`] so the state records the cancellation.
pub async fn run_until_cancelled<T, F, C>(work: F, cancel: C) -> Result<T>
where
    F: Future<Output = Result<T>>,
    C: Future<Output = ()>,
{
    tokio::select! {
        biased;
        () = cancel => {
            debug!("cancellation requested");
            Err(Error::Cancelled)
        }
        result = work => result,
    }
}
