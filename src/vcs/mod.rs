//! Version-control operations needed by the orchestrator
//!
//! [`Vcs`] is the seam between the cherry-pick state machine and git.
//! [`GitRepo`] implements it by shelling out to the `git` CLI.

mod git;

pub use git::GitRepo;

use crate::error::Result;
use async_trait::async_trait;

/// Typed git operations
///
/// Replay operations (`replay_commit`, `apply_patch`) report failures as
/// [`crate::error::Error::Execution`] with the raw stderr intact; deciding
/// whether a failure is a conflict is left to the caller.
#[async_trait]
pub trait Vcs: Send + Sync {
    /// Whether the working tree has uncommitted changes
    async fn is_dirty(&self) -> Result<bool>;

    /// Whether an interrupted rebase, `git am` or cherry-pick is in progress
    async fn is_in_rebase_or_am(&self) -> Result<bool>;

    /// Fetch `refspec` from `remote`
    async fn fetch(&self, remote: &str, refspec: &str) -> Result<()>;

    /// Create and check out `name` starting at `start_point`
    async fn checkout_new_branch(&self, name: &str, start_point: &str) -> Result<()>;

    /// Cherry-pick a single commit onto the current branch
    async fn replay_commit(&self, sha: &str) -> Result<()>;

    /// Apply a mailbox patch series with a three-way merge
    async fn apply_patch(&self, patch: &[u8]) -> Result<()>;

    /// Push `refname` to `remote`, setting upstream
    async fn push(&self, remote: &str, refname: &str) -> Result<()>;

    /// Currently checked out branch (`None` when detached)
    async fn current_branch(&self) -> Result<Option<String>>;

    /// URL of `remote`
    async fn remote_url(&self, remote: &str) -> Result<String>;
}
