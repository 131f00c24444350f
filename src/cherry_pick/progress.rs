//! Progress events emitted by the cherry-pick engine
//!
//! The engine never prints. Presentation layers implement
//! [`ProgressCallback`] and decide how (or whether) to show each event.

use crate::error::Error;
use async_trait::async_trait;
use std::fmt;

/// The six steps of a cherry-pick run, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Working tree and interrupted-operation checks
    Preflight,
    /// Fetch the PR and require it to be merged
    ResolvePr,
    /// Use the requested strategy or infer it
    ResolveStrategy,
    /// Fetch the target and create the working branch
    PrepareBranch,
    /// Apply the PR's changes to the working branch
    Replay,
    /// Push the working branch
    Publish,
}

impl Step {
    /// All steps in execution order
    pub const ALL: [Self; 6] = [
        Self::Preflight,
        Self::ResolvePr,
        Self::ResolveStrategy,
        Self::PrepareBranch,
        Self::Replay,
        Self::Publish,
    ];

    /// Short human-readable title
    pub const fn title(self) -> &'static str {
        match self {
            Self::Preflight => "checking repository is ready",
            Self::ResolvePr => "fetching the pull request",
            Self::ResolveStrategy => "determining merge strategy",
            Self::PrepareBranch => "checking out branch",
            Self::Replay => "replaying changes",
            Self::Publish => "pushing branch",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Receiver for engine progress events
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// A step is starting
    async fn on_step_started(&self, step: Step);

    /// Detail within the current step
    async fn on_message(&self, message: &str);

    /// A step completed; `summary` describes the result
    async fn on_step_finished(&self, step: Step, summary: &str);

    /// A step failed; the run stops after this
    async fn on_step_failed(&self, step: Step, error: &Error);
}

/// Progress callback that discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_step_started(&self, _step: Step) {}
    async fn on_message(&self, _message: &str) {}
    async fn on_step_finished(&self, _step: Step, _summary: &str) {}
    async fn on_step_failed(&self, _step: Step, _error: &Error) {}
}
