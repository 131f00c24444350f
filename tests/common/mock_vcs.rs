//! Mock version-control adapter for testing

#![allow(dead_code)]

use async_trait::async_trait;
use gh_cherry_pick::error::{Error, Result};
use gh_cherry_pick::vcs::Vcs;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// One recorded call on the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCall {
    IsDirty,
    IsInRebaseOrAm,
    Fetch { remote: String, refspec: String },
    CheckoutNewBranch { name: String, start_point: String },
    ReplayCommit(String),
    ApplyPatch(Vec<u8>),
    Push { remote: String, refname: String },
    CurrentBranch,
    RemoteUrl(String),
}

impl VcsCall {
    /// Whether the call changes the repository or talks to the remote
    pub const fn is_side_effect(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. }
                | Self::CheckoutNewBranch { .. }
                | Self::ReplayCommit(_)
                | Self::ApplyPatch(_)
                | Self::Push { .. }
        )
    }
}

/// Failure to inject into a replay
#[derive(Debug, Clone)]
struct ReplayFailure {
    code: Option<i32>,
    stderr: String,
    /// Leave an operation in progress, as git does on conflict
    leaves_operation: bool,
}

/// In-memory stand-in for a git working copy
///
/// Tracks the checked-out branch, the branches created and whether an
/// operation is in progress, so tests can check what a run left behind.
pub struct MockVcs {
    dirty: AtomicBool,
    in_progress: AtomicBool,
    current_branch: Mutex<Option<String>>,
    branches: Mutex<Vec<String>>,
    remotes: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<VcsCall>>,
    // Error injection
    replay_failure: Mutex<Option<ReplayFailure>>,
    error_on_fetch: Mutex<Option<String>>,
    error_on_push: Mutex<Option<String>>,
    hang_on_fetch: AtomicBool,
}

impl Default for MockVcs {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVcs {
    /// A clean repository on `main`
    pub fn new() -> Self {
        let mut remotes = HashMap::new();
        remotes.insert(
            "origin".to_string(),
            "git@github.com:134130/test-cherry-pick.git".to_string(),
        );
        Self {
            dirty: AtomicBool::new(false),
            in_progress: AtomicBool::new(false),
            current_branch: Mutex::new(Some("main".to_string())),
            branches: Mutex::new(vec!["main".to_string()]),
            remotes: Mutex::new(remotes),
            calls: Mutex::new(Vec::new()),
            replay_failure: Mutex::new(None),
            error_on_fetch: Mutex::new(None),
            error_on_push: Mutex::new(None),
            hang_on_fetch: AtomicBool::new(false),
        }
    }

    // === State setup ===

    /// Mark the working tree as having uncommitted changes
    pub fn set_dirty(&self, dirty: bool) {
        self.dirty.store(dirty, Ordering::SeqCst);
    }

    /// Mark an interrupted rebase/am/cherry-pick as present
    pub fn set_in_progress(&self, in_progress: bool) {
        self.in_progress.store(in_progress, Ordering::SeqCst);
    }

    // === Error injection methods ===

    /// Make the next replay stop on a conflict with `stderr`
    pub fn conflict_on_replay(&self, stderr: &str) {
        *self.replay_failure.lock().unwrap() = Some(ReplayFailure {
            code: Some(1),
            stderr: stderr.to_string(),
            leaves_operation: true,
        });
    }

    /// Make the next replay fail for a reason other than a conflict
    pub fn fail_replay(&self, code: i32, stderr: &str) {
        *self.replay_failure.lock().unwrap() = Some(ReplayFailure {
            code: Some(code),
            stderr: stderr.to_string(),
            leaves_operation: false,
        });
    }

    /// Make `fetch` fail
    pub fn fail_fetch(&self, stderr: &str) {
        *self.error_on_fetch.lock().unwrap() = Some(stderr.to_string());
    }

    /// Make `push` fail
    pub fn fail_push(&self, stderr: &str) {
        *self.error_on_push.lock().unwrap() = Some(stderr.to_string());
    }

    /// Make `fetch` never complete
    pub fn hang_on_fetch(&self) {
        self.hang_on_fetch.store(true, Ordering::SeqCst);
    }

    // === Call verification methods ===

    /// All recorded calls, in order
    pub fn get_calls(&self) -> Vec<VcsCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that mutate the repository or touch the remote
    pub fn side_effect_calls(&self) -> Vec<VcsCall> {
        self.get_calls()
            .into_iter()
            .filter(VcsCall::is_side_effect)
            .collect()
    }

    /// Branch currently checked out
    pub fn checked_out(&self) -> Option<String> {
        self.current_branch.lock().unwrap().clone()
    }

    /// Every local branch
    pub fn branches(&self) -> Vec<String> {
        self.branches.lock().unwrap().clone()
    }

    /// Whether an operation is left in progress
    pub fn operation_in_progress(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    /// Assert that nothing but read-only checks happened
    pub fn assert_no_side_effects(&self) {
        let calls = self.side_effect_calls();
        assert!(calls.is_empty(), "Expected no side effects but got: {calls:?}");
    }

    fn record(&self, call: VcsCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn take_replay_failure(&self, command: &str) -> Result<()> {
        let failure = self.replay_failure.lock().unwrap().take();
        match failure {
            Some(f) => {
                if f.leaves_operation {
                    self.in_progress.store(true, Ordering::SeqCst);
                }
                Err(Error::Execution {
                    command: command.to_string(),
                    code: f.code,
                    stderr: f.stderr,
                })
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Vcs for MockVcs {
    async fn is_dirty(&self) -> Result<bool> {
        self.record(VcsCall::IsDirty);
        Ok(self.dirty.load(Ordering::SeqCst))
    }

    async fn is_in_rebase_or_am(&self) -> Result<bool> {
        self.record(VcsCall::IsInRebaseOrAm);
        Ok(self.in_progress.load(Ordering::SeqCst))
    }

    async fn fetch(&self, remote: &str, refspec: &str) -> Result<()> {
        self.record(VcsCall::Fetch {
            remote: remote.to_string(),
            refspec: refspec.to_string(),
        });
        if self.hang_on_fetch.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let error = self.error_on_fetch.lock().unwrap().clone();
        match error {
            Some(stderr) => Err(Error::Execution {
                command: format!("git fetch --recurse-submodules {remote} {refspec}"),
                code: Some(128),
                stderr,
            }),
            None => Ok(()),
        }
    }

    async fn checkout_new_branch(&self, name: &str, start_point: &str) -> Result<()> {
        self.record(VcsCall::CheckoutNewBranch {
            name: name.to_string(),
            start_point: start_point.to_string(),
        });
        self.branches.lock().unwrap().push(name.to_string());
        *self.current_branch.lock().unwrap() = Some(name.to_string());
        Ok(())
    }

    async fn replay_commit(&self, sha: &str) -> Result<()> {
        self.record(VcsCall::ReplayCommit(sha.to_string()));
        self.take_replay_failure(&format!("git cherry-pick --keep-redundant-commits {sha}"))
    }

    async fn apply_patch(&self, patch: &[u8]) -> Result<()> {
        self.record(VcsCall::ApplyPatch(patch.to_vec()));
        self.take_replay_failure("git am -3")
    }

    async fn push(&self, remote: &str, refname: &str) -> Result<()> {
        self.record(VcsCall::Push {
            remote: remote.to_string(),
            refname: refname.to_string(),
        });
        let error = self.error_on_push.lock().unwrap().clone();
        match error {
            Some(stderr) => Err(Error::Execution {
                command: format!("git push --set-upstream {remote} {refname}"),
                code: Some(1),
                stderr,
            }),
            None => Ok(()),
        }
    }

    async fn current_branch(&self) -> Result<Option<String>> {
        self.record(VcsCall::CurrentBranch);
        Ok(self.checked_out())
    }

    async fn remote_url(&self, remote: &str) -> Result<String> {
        self.record(VcsCall::RemoteUrl(remote.to_string()));
        self.remotes
            .lock()
            .unwrap()
            .get(remote)
            .cloned()
            .ok_or_else(|| Error::Execution {
                command: format!("git remote get-url {remote}"),
                code: Some(2),
                stderr: format!("error: No such remote '{remote}'\n"),
            })
    }
}
