//! Error types for gh-cherry-pick

use std::fmt;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while cherry-picking a pull request
#[derive(Debug, Error)]
pub enum Error {
    /// The working repository is not in a state we can operate on
    /// (uncommitted changes, interrupted rebase/am/cherry-pick)
    #[error("{0}")]
    Setup(String),

    /// The pull request cannot be used (not found, not merged, ...)
    #[error("{0}")]
    Validation(String),

    /// The request itself is malformed (missing PR number, empty branch)
    #[error("invalid invocation: {0}")]
    InvalidRequest(String),

    /// A required external program is not installed
    #[error("unable to find {program} executable in PATH; please install {program} before retrying")]
    ToolMissing {
        /// Program name (`git`, `gh`)
        program: String,
    },

    /// An external program exited unsuccessfully
    #[error("`{command}` failed ({}): {}", describe_exit(.code), .stderr.trim())]
    Execution {
        /// Command line that was run
        command: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// Replaying the PR hit overlapping changes; the branch is left mid-operation
    #[error("{0}")]
    Conflict(ConflictDetails),

    /// The merge strategy could not be derived from the repository history
    #[error("failed to infer merge strategy: {0}")]
    Inference(String),

    /// The run was interrupted before it finished
    #[error("operation cancelled")]
    Cancelled,

    /// GitHub REST API error
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Octocrab client error
    #[error("GitHub API error: {0}")]
    Octocrab(#[from] octocrab::Error),

    /// Code-host adapter error (unexpected response, etc.)
    #[error("platform error: {0}")]
    Platform(String),

    /// Output from an external tool could not be parsed
    #[error("failed to parse {what}: {message}")]
    Parse {
        /// What was being parsed
        what: String,
        /// Parser message
        message: String,
    },

    /// Configuration file error
    #[error("config error: {0}")]
    Config(String),

    /// Authentication error
    #[error("authentication error: {0}")]
    Auth(String),

    /// IO error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Anything else
    #[error("internal error: {0}")]
    Internal(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    code.map_or_else(
        || "terminated by signal".to_string(),
        |c| format!("exit status {c}"),
    )
}

/// Coarse classification of an [`Error`], used by the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`Error::Setup`]
    Setup,
    /// See [`Error::Validation`] and [`Error::InvalidRequest`]
    Validation,
    /// See [`Error::ToolMissing`]
    ToolMissing,
    /// See [`Error::Execution`]
    Execution,
    /// See [`Error::Conflict`]
    Conflict,
    /// See [`Error::Inference`]
    Inference,
    /// See [`Error::Cancelled`]
    Cancelled,
    /// Adapter, config, IO and internal errors
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Setup => "setup",
            Self::Validation => "validation",
            Self::ToolMissing => "tool missing",
            Self::Execution => "execution",
            Self::Conflict => "conflict",
            Self::Inference => "inference",
            Self::Cancelled => "cancelled",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Classify this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Setup(_) => ErrorKind::Setup,
            Self::Validation(_) | Self::InvalidRequest(_) => ErrorKind::Validation,
            Self::ToolMissing { .. } => ErrorKind::ToolMissing,
            Self::Execution { .. } => ErrorKind::Execution,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Inference(_) => ErrorKind::Inference,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::GitHubApi(_)
            | Self::Octocrab(_)
            | Self::Platform(_)
            | Self::Parse { .. }
            | Self::Config(_)
            | Self::Auth(_)
            | Self::Io(_)
            | Self::Internal(_) => ErrorKind::Other,
        }
    }

    /// Whether the operator can resume the run by hand
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Process exit code for this error
    ///
    /// 2 for a malformed invocation, 1 for every operational failure.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidRequest(_) => 2,
            _ => 1,
        }
    }
}

/// The git operation left in progress after a conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayOperation {
    /// `git am` (patch series replay)
    Am,
    /// `git cherry-pick` (single commit replay)
    CherryPick,
}

impl ReplayOperation {
    /// The git subcommand name
    pub const fn subcommand(self) -> &'static str {
        match self {
            Self::Am => "am",
            Self::CherryPick => "cherry-pick",
        }
    }

    /// Command that resumes the operation after conflicts are resolved
    pub fn continue_command(self) -> String {
        format!("git {} --continue", self.subcommand())
    }

    /// Command that abandons the operation
    pub fn abort_command(self) -> String {
        format!("git {} --abort", self.subcommand())
    }
}

impl fmt::Display for ReplayOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subcommand())
    }
}

/// Everything the operator needs to finish a conflicted replay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictDetails {
    /// PR being replayed
    pub pr_number: u64,
    /// Branch left checked out mid-operation
    pub branch: String,
    /// Operation left in progress
    pub operation: ReplayOperation,
    /// Raw stderr of the failed git invocation
    pub stderr: String,
}

impl fmt::Display for ConflictDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.operation {
            ReplayOperation::Am => "applying the diff of",
            ReplayOperation::CherryPick => "cherry-picking the merge commit of",
        };
        write!(
            f,
            "conflict while {what} PR #{} on branch {}\n\
             please resolve the conflicts and run `{}`. if you want to abort the {}, run `{}`",
            self.pr_number,
            self.branch,
            self.operation.continue_command(),
            self.operation,
            self.operation.abort_command(),
        )?;
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            write!(f, "\n\n{stderr}")?;
        }
        Ok(())
    }
}
