//! gh-cherry-pick - port merged pull requests onto other branches
//!
//! Given a merged PR and a target branch, this crate works out whether the PR
//! landed by rebase or by squash, creates a fresh branch from the remote tip
//! of the target, and replays the PR there with the matching technique:
//!
//! - rebase-merged PRs are replayed by applying the PR's patch series with a
//!   three-way `git am`
//! - squash-merged PRs are replayed by cherry-picking the single merge commit
//!
//! The decision logic lives in [`strategy`] and the step sequencing in
//! [`cherry_pick`]. Git and GitHub are reached through the [`vcs::Vcs`] and
//! [`platform::PlatformService`] traits so both can be substituted in tests.

pub mod auth;
pub mod cherry_pick;
pub mod config;
pub mod error;
pub mod exec;
pub mod platform;
pub mod strategy;
pub mod types;
pub mod vcs;
