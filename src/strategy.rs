//! Merge-strategy inference
//!
//! Works out how a merged PR landed on its base branch using only code-host
//! queries:
//!
//! 1. take the PR's merge commit
//! 2. look up its first parent (`merge~1`)
//! 3. ask which PRs the code host associates with that parent
//!
//! When the PR was rebase-merged, its own commits sit directly below the last
//! one, so the parent belongs to the same PR. When it was squash-merged, the
//! parent is whatever landed before it, which belongs to some other PR.

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::ResolvedStrategy;
use tracing::debug;

/// Infer how `pr_number` was merged
///
/// Fails with a validation error if the PR is not merged.
pub async fn infer_merge_strategy(
    platform: &dyn PlatformService,
    pr_number: u64,
) -> Result<ResolvedStrategy> {
    let pr = platform.get_pull_request(pr_number).await?;
    let merge_commit = pr.merge_commit()?;
    inspect_merge_strategy(platform, pr_number, merge_commit).await
}

/// Infer the strategy from a known merge commit
///
/// Issues exactly two queries: the parent SHA, then the PRs for that parent.
pub async fn inspect_merge_strategy(
    platform: &dyn PlatformService,
    pr_number: u64,
    merge_commit_sha: &str,
) -> Result<ResolvedStrategy> {
    let parent = platform
        .get_commit_parent(merge_commit_sha)
        .await
        .map_err(|e| {
            with_inference_context(
                e,
                &format!("failed to get previous commit SHA for merge commit {merge_commit_sha}"),
            )
        })?;

    let related = platform
        .get_pull_requests_for_commit(&parent)
        .await
        .map_err(|e| {
            with_inference_context(e, &format!("failed to get related PR numbers for commit {parent}"))
        })?;

    debug!(pr_number, merge_commit_sha, %parent, ?related, "inspecting merge strategy");
    classify_merge_strategy(pr_number, &parent, &related)
}

/// Pure classification step
///
/// `Rebase` if `pr_number` is among the PRs associated with the parent
/// commit, `Squash` otherwise. An empty association set is an error: the
/// history cannot be attributed, so neither answer is safe.
pub fn classify_merge_strategy(
    pr_number: u64,
    parent_sha: &str,
    related_prs: &[u64],
) -> Result<ResolvedStrategy> {
    if related_prs.is_empty() {
        return Err(Error::Inference(format!(
            "failed to get related PR numbers for commit {parent_sha}: no related PRs"
        )));
    }

    if related_prs.contains(&pr_number) {
        Ok(ResolvedStrategy::Rebase)
    } else {
        Ok(ResolvedStrategy::Squash)
    }
}

/// Wrap a query failure as an inference error
///
/// Missing tools and cancellation keep their own identity.
fn with_inference_context(err: Error, context: &str) -> Error {
    match err {
        Error::ToolMissing { .. } | Error::Cancelled => err,
        other => Error::Inference(format!("{context}: {other}")),
    }
}
