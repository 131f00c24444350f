//! `git` CLI implementation of [`Vcs`]

use crate::error::{Error, Result};
use crate::exec::Executor;
use crate::vcs::Vcs;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Markers git leaves under its control directory while an operation is paused
const IN_PROGRESS_MARKERS: &[&str] = &["rebase-apply", "rebase-merge", "CHERRY_PICK_HEAD"];

/// A git working copy driven through the `git` executable
#[derive(Debug, Clone)]
pub struct GitRepo {
    exec: Executor,
}

impl GitRepo {
    /// Wrap an executor; its working directory selects the repository
    pub const fn new(exec: Executor) -> Self {
        Self { exec }
    }

    /// Open the repository containing `path`
    pub async fn open(path: &Path, exec: Executor) -> Result<Self> {
        // A missing cwd makes spawn fail with NotFound, which reads as a missing git
        if !path.is_dir() {
            return Err(Error::Setup(format!(
                "{} is not a directory",
                path.display()
            )));
        }
        let repo = Self::new(exec.in_dir(path));
        repo.toplevel().await.map_err(|e| match e {
            Error::Execution { .. } => Error::Setup(format!(
                "{} is not inside a git repository",
                path.display()
            )),
            other => other,
        })?;
        Ok(repo)
    }

    /// The executor used for git commands
    pub const fn executor(&self) -> &Executor {
        &self.exec
    }

    async fn git(&self, args: &[&str]) -> Result<String> {
        let out = self.exec.run("git", args).await?;
        Ok(out.stdout_trimmed())
    }

    /// Top-level directory of the working tree
    pub async fn toplevel(&self) -> Result<PathBuf> {
        self.git(&["rev-parse", "--show-toplevel"])
            .await
            .map(PathBuf::from)
    }

    /// Resolve a path inside the git control directory
    ///
    /// Uses `--git-path` so linked worktrees resolve to their own gitdir.
    async fn git_path(&self, name: &str) -> Result<PathBuf> {
        let raw = PathBuf::from(self.git(&["rev-parse", "--git-path", name]).await?);
        if raw.is_absolute() {
            return Ok(raw);
        }
        match self.exec.cwd() {
            Some(dir) => Ok(dir.join(raw)),
            None => Ok(std::env::current_dir()?.join(raw)),
        }
    }
}

#[async_trait]
impl Vcs for GitRepo {
    async fn is_dirty(&self) -> Result<bool> {
        let status = self.git(&["status", "--porcelain"]).await?;
        debug!(dirty = !status.is_empty(), "checked working tree");
        Ok(!status.is_empty())
    }

    async fn is_in_rebase_or_am(&self) -> Result<bool> {
        for marker in IN_PROGRESS_MARKERS {
            let path = self.git_path(marker).await?;
            if path.exists() {
                debug!(marker, path = %path.display(), "operation in progress");
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn fetch(&self, remote: &str, refspec: &str) -> Result<()> {
        debug!(remote, refspec, "fetching");
        self.git(&["fetch", "--recurse-submodules", remote, refspec])
            .await
            .map(drop)
    }

    async fn checkout_new_branch(&self, name: &str, start_point: &str) -> Result<()> {
        debug!(name, start_point, "creating branch");
        self.git(&["switch", "--no-track", "-c", name, start_point])
            .await
            .map(drop)
    }

    async fn replay_commit(&self, sha: &str) -> Result<()> {
        debug!(sha, "cherry-picking");
        self.git(&["cherry-pick", "--keep-redundant-commits", sha])
            .await
            .map(drop)
    }

    async fn apply_patch(&self, patch: &[u8]) -> Result<()> {
        debug!(bytes = patch.len(), "applying patch");
        self.exec
            .run_with_stdin("git", &["am", "-3"], Some(patch))
            .await
            .map(drop)
    }

    async fn push(&self, remote: &str, refname: &str) -> Result<()> {
        debug!(remote, refname, "pushing");
        self.git(&["push", "--set-upstream", remote, refname])
            .await
            .map(drop)
    }

    async fn current_branch(&self) -> Result<Option<String>> {
        let name = self.git(&["branch", "--show-current"]).await?;
        Ok((!name.is_empty()).then_some(name))
    }

    async fn remote_url(&self, remote: &str) -> Result<String> {
        self.git(&["remote", "get-url", remote]).await
    }
}
