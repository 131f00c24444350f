//! Shared command context for CLI commands
//!
//! Opens the repository, resolves configuration and builds the platform
//! service, so commands only deal with their own flags.

use gh_cherry_pick::config::{Config, load_config};
use gh_cherry_pick::error::Result;
use gh_cherry_pick::platform::{Backend, PlatformService, create_platform_service};
use gh_cherry_pick::vcs::GitRepo;
use std::path::Path;
use tracing::debug;

/// Command-line overrides for the configuration
#[derive(Debug, Clone, Default)]
pub struct ContextOverrides {
    /// `--remote`
    pub remote: Option<String>,
    /// `--backend`
    pub backend: Option<Backend>,
}

/// Load the configuration with environment overlays applied
pub fn resolve_config() -> Result<Config> {
    Ok(load_config()?.with_env(|key| std::env::var(key).ok()))
}

/// Shared context for commands that touch the repository and the code host
pub struct CommandContext {
    /// The git working copy
    pub repo: GitRepo,
    /// Platform service (gh CLI or REST)
    pub platform: Box<dyn PlatformService>,
    /// Selected remote name
    pub remote: String,
}

impl CommandContext {
    /// Create a new command context
    ///
    /// - Open the repository containing `path`
    /// - Apply CLI overrides on top of `config`
    /// - Create the platform service for the selected backend
    pub async fn new(path: &Path, config: &Config, overrides: ContextOverrides) -> Result<Self> {
        let exec = config.executor();
        let repo = GitRepo::open(path, exec).await?;
        let repo_root = repo.toplevel().await?;

        let remote = overrides.remote.unwrap_or_else(|| config.remote.clone());
        let backend = overrides.backend.unwrap_or(config.backend);
        debug!(root = %repo_root.display(), %remote, %backend, "opened repository");

        // gh resolves the repository from the working directory
        let platform = create_platform_service(
            backend,
            repo.executor(),
            &repo,
            &remote,
            config.host.as_deref(),
        )
        .await?;

        Ok(Self {
            repo,
            platform,
            remote,
        })
    }
}
