//! User configuration
//!
//! Read from `config.toml` (see [`config_path`]), then overlaid with
//! environment variables. Command-line flags are applied last by the binary.

mod storage;

pub use storage::{CONFIG_ENV, config_path, load_config, load_config_from, resolve_config_path};

use crate::exec::Executor;
use crate::platform::Backend;
use crate::types::{DEFAULT_REMOTE, MergeStrategy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable overriding the `gh` executable
pub const GH_PATH_ENV: &str = "GH_PATH";

/// Persistent defaults for `gh-cherry-pick`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Remote to fetch from and push to
    pub remote: String,
    /// Default merge strategy
    pub merge: MergeStrategy,
    /// Push the result by default
    pub push: bool,
    /// Code-host backend
    pub backend: Backend,
    /// GitHub Enterprise host for the `api` backend
    pub host: Option<String>,
    /// Path to the `gh` executable
    pub gh_path: Option<PathBuf>,
    /// Path to the `git` executable
    pub git_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: DEFAULT_REMOTE.to_string(),
            merge: MergeStrategy::Auto,
            push: false,
            backend: Backend::Gh,
            host: None,
            gh_path: None,
            git_path: None,
        }
    }
}

impl Config {
    /// Overlay environment variables, read through `var`
    #[must_use]
    pub fn with_env(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(gh) = var(GH_PATH_ENV).filter(|v| !v.trim().is_empty()) {
            self.gh_path = Some(PathBuf::from(gh));
        }
        self
    }

    /// Executor honoring the configured program paths
    pub fn executor(&self) -> Executor {
        let mut exec = Executor::new();
        if let Some(gh) = &self.gh_path {
            exec = exec.with_program("gh", gh);
        }
        if let Some(git) = &self.git_path {
            exec = exec.with_program("git", git);
        }
        exec
    }
}
