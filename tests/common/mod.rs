//! Shared test utilities

#![allow(dead_code)]

mod mock_platform;
mod mock_vcs;

pub use mock_platform::{
    MockPlatformService, PlatformCall, make_merged_pr, make_open_pr, sample_patch,
};
pub use mock_vcs::{MockVcs, VcsCall};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use gh_cherry_pick::cherry_pick::{ProgressCallback, Step};
use gh_cherry_pick::error::Error;
use std::path::Path;
use std::process::Command;
use std::sync::Mutex;

/// Fixed clock for deterministic branch names
pub fn fixed_clock() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

/// A progress event, as recorded by [`RecordingProgress`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started(Step),
    Message(String),
    Finished(Step, String),
    Failed(Step, String),
}

/// Progress callback that records every event
#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Steps that finished successfully, in order
    pub fn finished_steps(&self) -> Vec<Step> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::Finished(step, _) => Some(step),
                _ => None,
            })
            .collect()
    }

    /// The step that failed, if any
    pub fn failed_step(&self) -> Option<Step> {
        self.events().into_iter().find_map(|e| match e {
            ProgressEvent::Failed(step, _) => Some(step),
            _ => None,
        })
    }

    fn push(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl ProgressCallback for RecordingProgress {
    async fn on_step_started(&self, step: Step) {
        self.push(ProgressEvent::Started(step));
    }

    async fn on_message(&self, message: &str) {
        self.push(ProgressEvent::Message(message.to_string()));
    }

    async fn on_step_finished(&self, step: Step, summary: &str) {
        self.push(ProgressEvent::Finished(step, summary.to_string()));
    }

    async fn on_step_failed(&self, step: Step, error: &Error) {
        self.push(ProgressEvent::Failed(step, error.to_string()));
    }
}

/// Run `git` in `dir`, panicking on failure
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Initialize a repository in `dir` with one commit on `main`
pub fn init_repo(dir: &Path) {
    git(dir, &["init", "--quiet", "--initial-branch=main"]);
    git(dir, &["config", "user.name", "Test"]);
    git(dir, &["config", "user.email", "test@example.com"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
    std::fs::write(dir.join("file.txt"), "one\ntwo\nthree\n").unwrap();
    git(dir, &["add", "file.txt"]);
    git(dir, &["commit", "--quiet", "-m", "initial"]);
}

/// Write `content` to `file` and commit it
pub fn commit_file(dir: &Path, file: &str, content: &str, message: &str) -> String {
    std::fs::write(dir.join(file), content).unwrap();
    git(dir, &["add", file]);
    git(dir, &["commit", "--quiet", "-m", message]);
    git(dir, &["rev-parse", "HEAD"])
}
