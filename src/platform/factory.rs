//! Platform service construction

use crate::auth::get_github_auth;
use crate::error::{Error, Result};
use crate::exec::Executor;
use crate::platform::{GhCliService, GitHubService, PlatformService, parse_repo_info};
use crate::vcs::Vcs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Which code-host implementation to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Shell out to the `gh` CLI
    #[default]
    Gh,
    /// Call the GitHub REST API directly
    Api,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gh => write!(f, "gh"),
            Self::Api => write!(f, "api"),
        }
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gh" => Ok(Self::Gh),
            "api" => Ok(Self::Api),
            other => Err(Error::InvalidRequest(format!(
                "unknown backend '{other}' (expected gh or api)"
            ))),
        }
    }
}

/// Create the platform service for `backend`
///
/// The `api` backend derives the repository from `remote`'s URL and needs a
/// token; `host` overrides the host found in the URL.
pub async fn create_platform_service(
    backend: Backend,
    exec: &Executor,
    vcs: &dyn Vcs,
    remote: &str,
    host: Option<&str>,
) -> Result<Box<dyn PlatformService>> {
    debug!(%backend, remote, "creating platform service");
    match backend {
        Backend::Gh => Ok(Box::new(GhCliService::new(exec.clone()))),
        Backend::Api => {
            let url = vcs.remote_url(remote).await?;
            let mut config = parse_repo_info(&url)?;
            if let Some(h) = host {
                config.host = Some(h.to_string());
            }
            let auth = get_github_auth(exec, config.host.as_deref()).await?;
            debug!(repo = %config.repo, source = ?auth.source, "using GitHub REST API");
            Ok(Box::new(GitHubService::new(&auth.token, config)?))
        }
    }
}
