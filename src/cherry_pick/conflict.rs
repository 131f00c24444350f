//! Conflict classification for failed replays
//!
//! Best-effort: git's wording varies between versions and locales, so the
//! raw stderr always travels with the classification.

use crate::error::{ConflictDetails, Error, ReplayOperation};

/// Stderr fragments git prints when a replay stops on overlapping changes
const CONFLICT_MARKERS: &[&str] = &[
    "could not apply",
    "Failed to merge in the changes",
    "CONFLICT",
    "Patch failed at",
];

/// Whether `stderr` from a failed replay looks like a merge conflict
pub fn is_conflict(stderr: &str) -> bool {
    CONFLICT_MARKERS.iter().any(|m| stderr.contains(m))
}

/// Turn a failed replay into a conflict error when it looks like one
///
/// Only [`Error::Execution`] failures with a non-zero exit are candidates;
/// everything else passes through untouched.
pub fn classify_replay_failure(
    err: Error,
    pr_number: u64,
    branch: &str,
    operation: ReplayOperation,
) -> Error {
    match err {
        Error::Execution {
            code: Some(code),
            stderr,
            ..
        } if code != 0 && is_conflict(&stderr) => Error::Conflict(ConflictDetails {
            pr_number,
            branch: branch.to_string(),
            operation,
            stderr,
        }),
        other => other,
    }
}
