//! Core types for gh-cherry-pick

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// PR lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrState {
    /// PR is open
    Open,
    /// PR was closed without merging
    Closed,
    /// PR was merged
    Merged,
}

impl fmt::Display for PrState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// A pull request, as fetched from the code host
///
/// Snapshot taken once per run; never cached between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// Web URL for the PR
    pub html_url: String,
    /// Login of the PR author
    pub author: String,
    /// Current state
    pub state: PrState,
    /// Whether PR is a draft
    pub is_draft: bool,
    /// SHA of the merge commit (only once merged)
    pub merge_commit_sha: Option<String>,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
}

impl PullRequest {
    /// Whether the PR has been merged
    pub fn is_merged(&self) -> bool {
        self.state == PrState::Merged
    }

    /// Check that the PR is merged and has a merge commit
    pub fn ensure_merged(&self) -> Result<()> {
        if self.is_merged() {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "PR #{} is not merged (current state: {}). please ensure the PR is merged before continuing",
                self.number,
                self.display_state()
            )))
        }
    }

    /// The merge commit SHA, failing if the PR is not merged
    pub fn merge_commit(&self) -> Result<&str> {
        self.ensure_merged()?;
        self.merge_commit_sha
            .as_deref()
            .filter(|sha| !sha.is_empty())
            .ok_or_else(|| {
                Error::Validation(format!(
                    "failed to get merge commit SHA for PR #{}: PR not merged",
                    self.number
                ))
            })
    }

    /// State for display; open drafts show as "draft"
    pub fn display_state(&self) -> String {
        if self.is_draft && self.state == PrState::Open {
            "draft".to_string()
        } else {
            self.state.to_string()
        }
    }
}

/// Merge strategy requested by the operator
///
/// `Auto` only exists at request time; it is resolved to a
/// [`ResolvedStrategy`] before anything is replayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// PR commits were replayed one by one onto the base
    Rebase,
    /// PR commits were collapsed into a single commit
    Squash,
    /// Infer from repository history
    #[default]
    Auto,
}

impl MergeStrategy {
    /// The concrete strategy, or `None` for `Auto`
    pub const fn resolved(self) -> Option<ResolvedStrategy> {
        match self {
            Self::Rebase => Some(ResolvedStrategy::Rebase),
            Self::Squash => Some(ResolvedStrategy::Squash),
            Self::Auto => None,
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rebase => write!(f, "rebase"),
            Self::Squash => write!(f, "squash"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for MergeStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rebase" => Ok(Self::Rebase),
            "squash" => Ok(Self::Squash),
            "auto" => Ok(Self::Auto),
            other => Err(Error::InvalidRequest(format!(
                "unknown merge strategy '{other}' (expected rebase, squash, or auto)"
            ))),
        }
    }
}

/// A merge strategy that drives replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedStrategy {
    /// Apply the PR's patch series with a three-way `git am`
    Rebase,
    /// Cherry-pick the single merge commit
    Squash,
}

impl fmt::Display for ResolvedStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rebase => write!(f, "rebase"),
            Self::Squash => write!(f, "squash"),
        }
    }
}

impl From<ResolvedStrategy> for MergeStrategy {
    fn from(strategy: ResolvedStrategy) -> Self {
        match strategy {
            ResolvedStrategy::Rebase => Self::Rebase,
            ResolvedStrategy::Squash => Self::Squash,
        }
    }
}

/// Default remote name
pub const DEFAULT_REMOTE: &str = "origin";

/// What the operator asked for
///
/// Validated on construction and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CherryPickRequest {
    pr_number: u64,
    onto: String,
    strategy: MergeStrategy,
    push: bool,
    remote: String,
}

impl CherryPickRequest {
    /// Build a request, rejecting a zero PR number or an empty target branch
    pub fn new(pr_number: u64, onto: impl Into<String>) -> Result<Self> {
        let onto = onto.into().trim().to_string();
        if pr_number == 0 {
            return Err(Error::InvalidRequest(
                "a pull request number (--pr) is required".to_string(),
            ));
        }
        if onto.is_empty() {
            return Err(Error::InvalidRequest(
                "a target branch (--onto) is required".to_string(),
            ));
        }
        Ok(Self {
            pr_number,
            onto,
            strategy: MergeStrategy::Auto,
            push: false,
            remote: DEFAULT_REMOTE.to_string(),
        })
    }

    /// Set the requested merge strategy
    #[must_use]
    pub const fn with_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Push the resulting branch when done
    #[must_use]
    pub const fn with_push(mut self, push: bool) -> Self {
        self.push = push;
        self
    }

    /// Use a remote other than `origin`
    pub fn with_remote(mut self, remote: impl Into<String>) -> Result<Self> {
        let remote = remote.into();
        if remote.trim().is_empty() {
            return Err(Error::InvalidRequest("remote name must not be empty".to_string()));
        }
        self.remote = remote;
        Ok(self)
    }

    /// PR number
    pub const fn pr_number(&self) -> u64 {
        self.pr_number
    }

    /// Target branch
    pub fn onto(&self) -> &str {
        &self.onto
    }

    /// Requested strategy (may be `Auto`)
    pub const fn strategy(&self) -> MergeStrategy {
        self.strategy
    }

    /// Whether to push the result
    pub const fn push(&self) -> bool {
        self.push
    }

    /// Remote to fetch from and push to
    pub fn remote(&self) -> &str {
        &self.remote
    }
}

/// The working branch created for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CherryPickBranch {
    /// Local branch name
    pub name: String,
    /// Target branch the work is based on
    pub onto: String,
    /// Remote-tracking ref the branch starts from (e.g. `origin/release/10.0`)
    pub start_point: String,
    /// When the branch name was derived
    pub created_at: DateTime<Utc>,
}

impl CherryPickBranch {
    /// Derive the branch for a PR and target at a point in time
    ///
    /// `cherry-pick-pr-<n>-onto-<target with '/' replaced>-<unix seconds>`
    pub fn new(pr_number: u64, onto: &str, remote: &str, created_at: DateTime<Utc>) -> Self {
        let name = format!(
            "cherry-pick-pr-{pr_number}-onto-{}-{}",
            sanitize_branch_component(onto),
            created_at.timestamp()
        );
        Self {
            name,
            onto: onto.to_string(),
            start_point: format!("{remote}/{onto}"),
            created_at,
        }
    }
}

impl fmt::Display for CherryPickBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Replace path separators so a branch name can be embedded in another
pub fn sanitize_branch_component(name: &str) -> String {
    name.replace(['/', '\\'], "-")
}

/// Repository identity on the code host (`owner/name`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoIdentity {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoIdentity {
    /// Create an identity
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoIdentity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(Error::Parse {
                what: "repository name with owner".to_string(),
                message: format!("expected 'owner/name', got '{s}'"),
            }),
        }
    }
}

/// Platform configuration for the REST backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Repository on the code host
    pub repo: RepoIdentity,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}
