//! Code-host services
//!
//! Provides a unified interface for the pull-request queries the inference
//! engine and orchestrator need, backed either by the `gh` CLI or by the
//! GitHub REST API.

mod detection;
mod factory;
mod gh_cli;
mod github;
mod identity;

pub use detection::parse_repo_info;
pub use factory::{Backend, create_platform_service};
pub use gh_cli::GhCliService;
pub use github::GitHubService;
pub use identity::RepoIdentityCache;

use crate::error::Result;
use crate::types::{PullRequest, RepoIdentity};
use async_trait::async_trait;

/// Platform service trait for pull-request queries
///
/// All methods are read-only. Each call is one or more network round trips.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Fetch a pull request by number
    async fn get_pull_request(&self, number: u64) -> Result<PullRequest>;

    /// Fetch the PR as a mailbox patch series (`git format-patch` output)
    async fn get_pull_request_diff(&self, number: u64) -> Result<Vec<u8>>;

    /// SHA of the first parent of `sha` (`sha~1`)
    async fn get_commit_parent(&self, sha: &str) -> Result<String>;

    /// Numbers of the PRs the code host associates with `sha`
    async fn get_pull_requests_for_commit(&self, sha: &str) -> Result<Vec<u64>>;

    /// `owner/name` of the repository, looked up at most once
    async fn repository_identity(&self) -> Result<RepoIdentity>;
}
