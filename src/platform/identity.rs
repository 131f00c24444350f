//! Compute-once cache for the repository identity

use crate::error::Result;
use crate::types::RepoIdentity;
use std::future::Future;
use tokio::sync::OnceCell;

/// Holds the repository identity once it has been looked up
///
/// Owned by a platform service rather than living in a global, so every
/// service (and every test) starts empty. Concurrent callers wait for the
/// first lookup instead of issuing their own; a failed lookup is not stored.
#[derive(Debug, Default)]
pub struct RepoIdentityCache {
    cell: OnceCell<RepoIdentity>,
}

impl RepoIdentityCache {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache pre-filled with a known identity
    pub fn with_value(identity: RepoIdentity) -> Self {
        Self {
            cell: OnceCell::new_with(Some(identity)),
        }
    }

    /// Return the cached identity, running `lookup` if there is none yet
    pub async fn get_or_lookup<F, Fut>(&self, lookup: F) -> Result<RepoIdentity>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<RepoIdentity>>,
    {
        self.cell.get_or_try_init(lookup).await.cloned()
    }

    /// The identity, if already resolved
    pub fn get(&self) -> Option<&RepoIdentity> {
        self.cell.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_lookup_runs_once() {
        let cache = RepoIdentityCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let id = cache
                .get_or_lookup(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(RepoIdentity::new("o", "r"))
                })
                .await
                .unwrap();
            assert_eq!(id.to_string(), "o/r");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_lookup() {
        let cache = Arc::new(RepoIdentityCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_lookup(|| async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        Ok(RepoIdentity::new("o", "r"))
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_lookup_is_retried() {
        let cache = RepoIdentityCache::new();
        let first = cache
            .get_or_lookup(|| async { Err(Error::Platform("offline".to_string())) })
            .await;
        assert!(first.is_err());
        assert!(cache.get().is_none());

        let second = cache
            .get_or_lookup(|| async { Ok(RepoIdentity::new("o", "r")) })
            .await
            .unwrap();
        assert_eq!(second.owner, "o");
    }

    #[tokio::test]
    async fn test_prefilled_cache_skips_lookup() {
        let cache = RepoIdentityCache::with_value(RepoIdentity::new("o", "r"));
        let calls = AtomicUsize::new(0);
        let id = cache
            .get_or_lookup(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(RepoIdentity::new("other", "repo"))
            })
            .await
            .unwrap();
        assert_eq!(id.name, "r");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
