//! Platform service backed by the `gh` CLI

use crate::error::{Error, Result};
use crate::exec::Executor;
use crate::platform::{PlatformService, RepoIdentityCache};
use crate::types::{PrState, PullRequest, RepoIdentity};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Fields requested from `gh pr view --json`
const PR_FIELDS: &str = "number,title,url,author,state,isDraft,mergeCommit,baseRefName,headRefName";

// `gh --json` response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhPullRequest {
    number: u64,
    title: String,
    url: String,
    author: Option<GhAuthor>,
    state: PrState,
    #[serde(default)]
    is_draft: bool,
    merge_commit: Option<GhCommitRef>,
    base_ref_name: String,
    head_ref_name: String,
}

#[derive(Debug, Deserialize)]
struct GhAuthor {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GhCommitRef {
    oid: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhRepoView {
    name_with_owner: String,
}

#[derive(Deserialize)]
struct ApiCommit {
    sha: String,
}

#[derive(Deserialize)]
struct ApiPullRef {
    number: u64,
}

impl From<GhPullRequest> for PullRequest {
    fn from(pr: GhPullRequest) -> Self {
        Self {
            number: pr.number,
            title: pr.title,
            html_url: pr.url,
            author: pr.author.map(|a| a.login).unwrap_or_default(),
            state: pr.state,
            is_draft: pr.is_draft,
            merge_commit_sha: pr.merge_commit.map(|c| c.oid).filter(|s| !s.is_empty()),
            base_ref: pr.base_ref_name,
            head_ref: pr.head_ref_name,
        }
    }
}

fn parse_json<T: DeserializeOwned>(what: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| Error::Parse {
        what: what.to_string(),
        message: e.to_string(),
    })
}

/// GitHub service using the `gh` executable
///
/// Authentication and host selection are whatever `gh` is configured with.
#[derive(Debug)]
pub struct GhCliService {
    exec: Executor,
    identity: RepoIdentityCache,
}

impl GhCliService {
    /// Create a service; `exec` should run inside the repository
    pub fn new(exec: Executor) -> Self {
        Self {
            exec,
            identity: RepoIdentityCache::new(),
        }
    }

    async fn gh(&self, args: &[&str]) -> Result<Vec<u8>> {
        Ok(self.exec.run("gh", args).await?.stdout)
    }

    async fn lookup_identity(&self) -> Result<RepoIdentity> {
        debug!("looking up repository name with owner");
        let out = self
            .gh(&["repo", "view", "--json", "nameWithOwner"])
            .await
            .map_err(|e| match e {
                Error::Execution { stderr, .. } => Error::Platform(format!(
                    "failed to get repository name with owner: {}",
                    stderr.trim()
                )),
                other => other,
            })?;
        let view: GhRepoView = parse_json("gh repo view output", &out)?;
        view.name_with_owner.parse()
    }
}

#[async_trait]
impl PlatformService for GhCliService {
    async fn get_pull_request(&self, number: u64) -> Result<PullRequest> {
        debug!(number, "getting pull request");
        let number_arg = number.to_string();
        let out = self
            .gh(&["pr", "view", &number_arg, "--json", PR_FIELDS])
            .await
            .map_err(|e| match e {
                Error::Execution { stderr, .. } => Error::Validation(format!(
                    "failed to get the pull request #{number}: {}",
                    stderr.trim()
                )),
                other => other,
            })?;
        let pr: PullRequest = parse_json::<GhPullRequest>("gh pr view output", &out)?.into();
        debug!(number, state = %pr.state, "got pull request");
        Ok(pr)
    }

    async fn get_pull_request_diff(&self, number: u64) -> Result<Vec<u8>> {
        debug!(number, "getting pull request patch");
        let number_arg = number.to_string();
        self.gh(&["pr", "diff", &number_arg, "--patch"]).await
    }

    async fn get_commit_parent(&self, sha: &str) -> Result<String> {
        let repo = self.repository_identity().await?;
        let endpoint = format!("repos/{repo}/commits/{sha}~1");
        debug!(%endpoint, "getting parent commit");
        let out = self.gh(&["api", &endpoint]).await?;
        let commit: ApiCommit = parse_json("commit response", &out)?;
        Ok(commit.sha)
    }

    async fn get_pull_requests_for_commit(&self, sha: &str) -> Result<Vec<u64>> {
        let repo = self.repository_identity().await?;
        let endpoint = format!("repos/{repo}/commits/{sha}/pulls");
        debug!(%endpoint, "listing pull requests for commit");
        let out = self
            .gh(&[
                "api",
                "-H",
                "Accept: application/vnd.github+json",
                "-H",
                "X-GitHub-Api-Version: 2022-11-28",
                &endpoint,
            ])
            .await?;
        let pulls: Vec<ApiPullRef> = parse_json("commit pulls response", &out)?;
        Ok(pulls.into_iter().map(|p| p.number).collect())
    }

    async fn repository_identity(&self) -> Result<RepoIdentity> {
        self.identity.get_or_lookup(|| self.lookup_identity()).await
    }
}
