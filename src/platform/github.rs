//! GitHub REST platform service implementation

use crate::error::{Error, Result};
use crate::platform::{PlatformService, RepoIdentityCache};
use crate::types::{PlatformConfig, PrState, PullRequest, RepoIdentity};
use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// Media type GitHub uses for `git format-patch` output
const PATCH_MEDIA_TYPE: &str = "application/vnd.github.patch";

/// REST API version pinned for raw requests
const API_VERSION: &str = "2022-11-28";

#[derive(Deserialize)]
struct CommitRef {
    sha: String,
}

#[derive(Deserialize)]
struct PullRef {
    number: u64,
}

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
    identity: RepoIdentityCache,
    /// Token for raw HTTP requests (patch download, commit → PR index)
    token: String,
    /// HTTP client for raw requests
    http_client: Client,
    /// API base URL, without trailing slash
    api_base: String,
}

impl GitHubService {
    /// Create a new GitHub service for github.com or an Enterprise host
    pub fn new(token: &str, config: PlatformConfig) -> Result<Self> {
        let api_base = config.host.as_ref().map_or_else(
            || "https://api.github.com".to_string(),
            |h| format!("https://{h}/api/v3"),
        );
        Self::with_api_base(token, config, &api_base)
    }

    /// Create a service talking to an explicit API base URL
    pub fn with_api_base(token: &str, config: PlatformConfig, api_base: &str) -> Result<Self> {
        let api_base = api_base.trim_end_matches('/').to_string();

        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(&api_base)
            .map_err(|e| Error::GitHubApi(e.to_string()))?
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("gh-cherry-pick")
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            identity: RepoIdentityCache::with_value(config.repo.clone()),
            config,
            token: token.to_string(),
            http_client,
            api_base,
        })
    }

    /// The platform configuration
    pub const fn config(&self) -> &PlatformConfig {
        &self.config
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{path}",
            self.api_base, self.config.repo.owner, self.config.repo.name
        )
    }

    async fn raw_get(&self, url: &str, accept: &str) -> Result<reqwest::Response> {
        let response = self
            .http_client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", accept)
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::GitHubApi(format!(
                "{url} returned {status}: {}",
                body.trim()
            )));
        }
        Ok(response)
    }
}

/// Helper to convert an octocrab PR to our `PullRequest` type
fn pr_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    // IssueState is non-exhaustive, so use wildcard for Closed and any future variants
    let state = match pr.state {
        Some(octocrab::models::IssueState::Open) => PrState::Open,
        Some(_) if pr.merged_at.is_some() => PrState::Merged,
        Some(_) | None => PrState::Closed,
    };

    // GitHub reports a test-merge SHA for open PRs; only a merged PR has a
    // real merge commit.
    let merge_commit_sha = if state == PrState::Merged {
        pr.merge_commit_sha.clone()
    } else {
        None
    };

    PullRequest {
        number: pr.number,
        title: pr.title.clone().unwrap_or_default(),
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        author: pr.user.as_ref().map(|u| u.login.clone()).unwrap_or_default(),
        state,
        is_draft: pr.draft.unwrap_or(false),
        merge_commit_sha,
        base_ref: pr.base.ref_field.clone(),
        head_ref: pr.head.ref_field.clone(),
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn get_pull_request(&self, number: u64) -> Result<PullRequest> {
        debug!(number, "getting pull request");

        let pr = self
            .client
            .pulls(&self.config.repo.owner, &self.config.repo.name)
            .get(number)
            .await
            .map_err(|e| Error::Validation(format!("failed to get the pull request #{number}: {e}")))?;

        let result = pr_from_octocrab(&pr);
        debug!(number, state = %result.state, "got pull request");
        Ok(result)
    }

    async fn get_pull_request_diff(&self, number: u64) -> Result<Vec<u8>> {
        debug!(number, "getting pull request patch");
        let url = self.repo_url(&format!("pulls/{number}"));
        let bytes = self
            .raw_get(&url, PATCH_MEDIA_TYPE)
            .await?
            .bytes()
            .await
            .map_err(|e| Error::GitHubApi(format!("failed to read patch for PR #{number}: {e}")))?;
        debug!(number, bytes = bytes.len(), "got pull request patch");
        Ok(bytes.to_vec())
    }

    async fn get_commit_parent(&self, sha: &str) -> Result<String> {
        debug!(sha, "getting parent commit");
        let route = format!(
            "/repos/{}/{}/commits/{sha}~1",
            self.config.repo.owner, self.config.repo.name
        );
        let commit: CommitRef = self.client.get(route, None::<&()>).await?;
        Ok(commit.sha)
    }

    async fn get_pull_requests_for_commit(&self, sha: &str) -> Result<Vec<u64>> {
        debug!(sha, "listing pull requests for commit");
        let url = self.repo_url(&format!("commits/{sha}/pulls"));
        let pulls: Vec<PullRef> = self
            .raw_get(&url, "application/vnd.github+json")
            .await?
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("failed to parse PRs for commit {sha}: {e}")))?;
        let numbers: Vec<u64> = pulls.into_iter().map(|p| p.number).collect();
        debug!(sha, count = numbers.len(), "listed pull requests for commit");
        Ok(numbers)
    }

    async fn repository_identity(&self) -> Result<RepoIdentity> {
        self.identity
            .get_or_lookup(|| async { Ok(self.config.repo.clone()) })
            .await
    }
}
