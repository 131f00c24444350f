//! Mock platform service for testing
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use gh_cherry_pick::error::{Error, Result};
use gh_cherry_pick::platform::{PlatformService, RepoIdentityCache};
use gh_cherry_pick::types::{PrState, PullRequest, RepoIdentity};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One recorded call on the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    GetPullRequest(u64),
    GetPullRequestDiff(u64),
    GetCommitParent(String),
    GetPullRequestsForCommit(String),
    RepositoryIdentity,
}

/// Simple mock platform service for testing
///
/// Hand-written rather than generated, so responses can be set per PR/SHA.
///
/// Features:
/// - Configurable responses per PR number and commit SHA
/// - Call tracking for verification
/// - Error injection for failure path testing
/// - A real `RepoIdentityCache`, with a counter for underlying lookups
pub struct MockPlatformService {
    identity: RepoIdentity,
    identity_cache: RepoIdentityCache,
    identity_lookups: AtomicUsize,
    pr_responses: Mutex<HashMap<u64, PullRequest>>,
    diff_responses: Mutex<HashMap<u64, Vec<u8>>>,
    parent_responses: Mutex<HashMap<String, String>>,
    commit_pulls_responses: Mutex<HashMap<String, Vec<u64>>>,
    // Call tracking
    calls: Mutex<Vec<PlatformCall>>,
    // Error injection
    error_on_get_pr: Mutex<Option<String>>,
    error_on_commit_parent: Mutex<Option<String>>,
    error_on_commit_pulls: Mutex<Option<String>>,
    tool_missing: Mutex<bool>,
}

impl Default for MockPlatformService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlatformService {
    /// Create a mock for `134130/test-cherry-pick`
    pub fn new() -> Self {
        Self {
            identity: RepoIdentity::new("134130", "test-cherry-pick"),
            identity_cache: RepoIdentityCache::new(),
            identity_lookups: AtomicUsize::new(0),
            pr_responses: Mutex::new(HashMap::new()),
            diff_responses: Mutex::new(HashMap::new()),
            parent_responses: Mutex::new(HashMap::new()),
            commit_pulls_responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            error_on_get_pr: Mutex::new(None),
            error_on_commit_parent: Mutex::new(None),
            error_on_commit_pulls: Mutex::new(None),
            tool_missing: Mutex::new(false),
        }
    }

    // === Error injection methods ===

    /// Make `get_pull_request` return an error
    pub fn fail_get_pr(&self, msg: &str) {
        *self.error_on_get_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `get_commit_parent` return an error
    pub fn fail_commit_parent(&self, msg: &str) {
        *self.error_on_commit_parent.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `get_pull_requests_for_commit` return an error
    pub fn fail_commit_pulls(&self, msg: &str) {
        *self.error_on_commit_pulls.lock().unwrap() = Some(msg.to_string());
    }

    /// Make every history query fail as if `gh` were not installed
    pub fn simulate_missing_gh(&self) {
        *self.tool_missing.lock().unwrap() = true;
    }

    // === Response setup ===

    /// Set the response for `get_pull_request`
    pub fn set_pr_response(&self, pr: PullRequest) {
        self.pr_responses.lock().unwrap().insert(pr.number, pr);
    }

    /// Set the response for `get_pull_request_diff`
    pub fn set_diff_response(&self, pr_number: u64, patch: &[u8]) {
        self.diff_responses
            .lock()
            .unwrap()
            .insert(pr_number, patch.to_vec());
    }

    /// Set the response for `get_commit_parent`
    pub fn set_parent_response(&self, sha: &str, parent: &str) {
        self.parent_responses
            .lock()
            .unwrap()
            .insert(sha.to_string(), parent.to_string());
    }

    /// Set the response for `get_pull_requests_for_commit`
    pub fn set_commit_pulls_response(&self, sha: &str, prs: Vec<u64>) {
        self.commit_pulls_responses
            .lock()
            .unwrap()
            .insert(sha.to_string(), prs);
    }

    /// Helper: a PR squash-merged into `base`
    ///
    /// The merge commit's parent belongs to an earlier PR.
    pub fn setup_squash_merged_pr(&self, pr_number: u64, base: &str) {
        let merge = format!("merge_sha_{pr_number}");
        let parent = format!("parent_sha_{pr_number}");
        self.set_pr_response(make_merged_pr(pr_number, base, &merge));
        self.set_parent_response(&merge, &parent);
        self.set_commit_pulls_response(&parent, vec![pr_number + 1000]);
    }

    /// Helper: a PR rebase-merged into `base`
    ///
    /// The merge commit's parent is another commit of the same PR.
    pub fn setup_rebase_merged_pr(&self, pr_number: u64, base: &str) {
        let merge = format!("merge_sha_{pr_number}");
        let parent = format!("parent_sha_{pr_number}");
        self.set_pr_response(make_merged_pr(pr_number, base, &merge));
        self.set_parent_response(&merge, &parent);
        self.set_commit_pulls_response(&parent, vec![pr_number]);
        self.set_diff_response(pr_number, &sample_patch(pr_number));
    }

    // === Call verification methods ===

    /// All recorded calls, in order
    pub fn get_calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of underlying identity lookups (cache misses)
    pub fn identity_lookups(&self) -> usize {
        self.identity_lookups.load(Ordering::SeqCst)
    }

    /// Assert that the patch for `pr_number` was never requested
    pub fn assert_diff_not_requested(&self, pr_number: u64) {
        let calls = self.get_calls();
        assert!(
            !calls.contains(&PlatformCall::GetPullRequestDiff(pr_number)),
            "Expected no get_pull_request_diff({pr_number}) but got: {calls:?}"
        );
    }

    fn record(&self, call: PlatformCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn injected(&self, slot: &Mutex<Option<String>>) -> Result<()> {
        if *self.tool_missing.lock().unwrap() {
            return Err(Error::ToolMissing {
                program: "gh".to_string(),
            });
        }
        match slot.lock().unwrap().as_ref() {
            Some(msg) => Err(Error::Platform(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn get_pull_request(&self, number: u64) -> Result<PullRequest> {
        self.record(PlatformCall::GetPullRequest(number));
        if let Some(msg) = self.error_on_get_pr.lock().unwrap().as_ref() {
            return Err(Error::Validation(format!(
                "failed to get the pull request #{number}: {msg}"
            )));
        }
        self.pr_responses
            .lock()
            .unwrap()
            .get(&number)
            .cloned()
            .ok_or_else(|| {
                Error::Validation(format!(
                    "failed to get the pull request #{number}: Could not resolve to a PullRequest"
                ))
            })
    }

    async fn get_pull_request_diff(&self, number: u64) -> Result<Vec<u8>> {
        self.record(PlatformCall::GetPullRequestDiff(number));
        self.diff_responses
            .lock()
            .unwrap()
            .get(&number)
            .cloned()
            .ok_or_else(|| Error::Platform(format!("no patch for PR #{number}")))
    }

    async fn get_commit_parent(&self, sha: &str) -> Result<String> {
        self.record(PlatformCall::GetCommitParent(sha.to_string()));
        self.injected(&self.error_on_commit_parent)?;
        self.parent_responses
            .lock()
            .unwrap()
            .get(sha)
            .cloned()
            .ok_or_else(|| Error::Platform(format!("No commit found for SHA: {sha}~1")))
    }

    async fn get_pull_requests_for_commit(&self, sha: &str) -> Result<Vec<u64>> {
        self.record(PlatformCall::GetPullRequestsForCommit(sha.to_string()));
        self.injected(&self.error_on_commit_pulls)?;
        Ok(self
            .commit_pulls_responses
            .lock()
            .unwrap()
            .get(sha)
            .cloned()
            .unwrap_or_default())
    }

    async fn repository_identity(&self) -> Result<RepoIdentity> {
        self.record(PlatformCall::RepositoryIdentity);
        self.identity_cache
            .get_or_lookup(|| async {
                self.identity_lookups.fetch_add(1, Ordering::SeqCst);
                Ok(self.identity.clone())
            })
            .await
    }
}

/// A merged PR with the given merge commit
pub fn make_merged_pr(number: u64, base: &str, merge_sha: &str) -> PullRequest {
    PullRequest {
        number,
        title: format!("Change {number}"),
        html_url: format!("https://github.com/134130/test-cherry-pick/pull/{number}"),
        author: "134130".to_string(),
        state: PrState::Merged,
        is_draft: false,
        merge_commit_sha: Some(merge_sha.to_string()),
        base_ref: base.to_string(),
        head_ref: format!("feature-{number}"),
    }
}

/// An open PR
pub fn make_open_pr(number: u64, base: &str) -> PullRequest {
    PullRequest {
        state: PrState::Open,
        merge_commit_sha: None,
        ..make_merged_pr(number, base, "")
    }
}

/// A one-commit mailbox patch
pub fn sample_patch(pr_number: u64) -> Vec<u8> {
    format!(
        "From 1111111111111111111111111111111111111111 Mon Sep 17 00:00:00 2001\n\
         From: Test <test@example.com>\n\
         Subject: [PATCH] Change {pr_number}\n\
         \n\
         ---\n \
         file.txt | 1 +\n\
         \n\
         diff --git a/file.txt b/file.txt\n"
    )
    .into_bytes()
}
