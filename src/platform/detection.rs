//! Derive the GitHub repository from a git remote URL

use crate::error::{Error, Result};
use crate::types::{PlatformConfig, RepoIdentity};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

const GITHUB_HOST: &str = "github.com";

/// scp-like syntax: `[user@]host:owner/repo[.git]`
static SCP_REMOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[^@/]+@)?(?P<host>[^:/]+):(?P<path>[^/].*)$")
        .expect("scp remote pattern is valid")
});

/// Parse a remote URL into owner, repository and host
///
/// Accepts `https://`, `ssh://` and scp-like (`git@host:owner/repo`) remotes.
/// `host` is `None` for github.com, `Some` for GitHub Enterprise.
pub fn parse_repo_info(remote_url: &str) -> Result<PlatformConfig> {
    let trimmed = remote_url.trim().trim_end_matches('/');
    let unparseable = || {
        Error::Platform(format!(
            "could not determine GitHub repository from remote URL '{remote_url}'"
        ))
    };

    let (host, path) = if trimmed.contains("://") {
        let url = Url::parse(trimmed).map_err(|_| unparseable())?;
        let host = url.host_str().ok_or_else(unparseable)?.to_string();
        (host, url.path().to_string())
    } else {
        let caps = SCP_REMOTE.captures(trimmed).ok_or_else(unparseable)?;
        (caps["host"].to_string(), caps["path"].to_string())
    };

    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let [owner, name] = segments.as_slice() else {
        return Err(unparseable());
    };

    let host = host.to_ascii_lowercase();
    Ok(PlatformConfig {
        repo: RepoIdentity::new(*owner, *name),
        host: (host != GITHUB_HOST).then_some(host),
    })
}
