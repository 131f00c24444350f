//! GitHub token resolution

use crate::auth::AuthSource;
use crate::error::{Error, Result};
use crate::exec::Executor;
use tracing::debug;

/// Environment variables checked for a token, in order
const TOKEN_VARS: &[&str] = &["GH_TOKEN", "GITHUB_TOKEN"];

/// Resolved GitHub credentials
#[derive(Clone)]
pub struct GitHubAuthConfig {
    /// API token
    pub token: String,
    /// Where the token came from
    pub source: AuthSource,
    /// Host the token is for (None for github.com)
    pub host: Option<String>,
}

impl std::fmt::Debug for GitHubAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubAuthConfig")
            .field("token", &"<redacted>")
            .field("source", &self.source)
            .field("host", &self.host)
            .finish()
    }
}

/// First non-empty token among `GH_TOKEN` and `GITHUB_TOKEN`
pub fn token_from_env() -> Option<String> {
    TOKEN_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|t| t.trim().to_string())
        .find(|t| !t.is_empty())
}

/// Resolve a token for `host`
///
/// Order: `GH_TOKEN`, `GITHUB_TOKEN`, then `gh auth token [--hostname host]`.
pub async fn get_github_auth(exec: &Executor, host: Option<&str>) -> Result<GitHubAuthConfig> {
    if let Some(token) = token_from_env() {
        debug!("using GitHub token from environment");
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::EnvVar,
            host: host.map(ToString::to_string),
        });
    }

    let mut args = vec!["auth", "token"];
    if let Some(h) = host {
        args.extend(["--hostname", h]);
    }
    debug!(?host, "asking gh for a token");
    let token = exec
        .run("gh", &args)
        .await
        .map_err(|e| match e {
            Error::Execution { stderr, .. } => Error::Auth(format!(
                "no GitHub token found. set GH_TOKEN or run `gh auth login`: {}",
                stderr.trim()
            )),
            other => other,
        })?
        .stdout_trimmed();

    if token.is_empty() {
        return Err(Error::Auth(
            "no GitHub token found. set GH_TOKEN or run `gh auth login`".to_string(),
        ));
    }

    Ok(GitHubAuthConfig {
        token,
        source: AuthSource::Cli,
        host: host.map(ToString::to_string),
    })
}
