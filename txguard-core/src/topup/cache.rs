//! Process-wide query cache for the user/account aggregate.
//!
//! The aggregate is the only shared mutable resource in the engine. Normal
//! writes come from the server-driven refresh path; the top-up pipeline is
//! the only other writer, and it always pairs an optimistic write with a
//! rollback or a forced invalidation. The cache does not own the entry's
//! lifecycle, it only holds what collaborators put there.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::task::AbortHandle;
use uuid::Uuid;

/// Stable identity of the current-user aggregate entry.
pub const CURRENT_USER_KEY: &str = "auth/current-user";

/// The cached account aggregate holding the balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub balance: f64,
    pub cashback_balance: f64,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    user: User,
    stale: bool,
}

/// Keyed cache with per-key refresh cancellation and staleness marking.
#[derive(Default)]
pub struct UserCache {
    entries: DashMap<String, CacheEntry>,
    refreshes: DashMap<String, AbortHandle>,
}

impl UserCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<User> {
        self.entries.get(key).map(|entry| entry.user.clone())
    }

    /// Overwrite an entry and mark it fresh. Used by both the refresh path
    /// and the pipeline's optimistic write / rollback.
    pub fn set(&self, key: &str, user: User) {
        self.entries.insert(
            key.to_string(),
            CacheEntry { user, stale: false },
        );
    }

    pub fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Mark an entry stale so the next read triggers a re-fetch of ground
    /// truth. The cached value stays readable until the refresh lands.
    pub fn invalidate(&self, key: &str) {
        if let Some(mut entry) = self.entries.get_mut(key) {
            entry.stale = true;
        }
    }

    pub fn is_stale(&self, key: &str) -> bool {
        self.entries.get(key).map(|entry| entry.stale).unwrap_or(true)
    }

    /// Register the abort handle of an in-flight refresh task for `key`,
    /// replacing (and aborting) any previous one.
    pub fn register_refresh(&self, key: &str, handle: AbortHandle) {
        if let Some((_, previous)) = self.refreshes.remove(key) {
            previous.abort();
        }
        self.refreshes.insert(key.to_string(), handle);
    }

    /// Abort the in-flight refresh for `key`, if any. Called before an
    /// optimistic write so a stale refresh cannot clobber it afterwards.
    pub fn cancel_refresh(&self, key: &str) {
        if let Some((_, handle)) = self.refreshes.remove(key) {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for UserCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCache")
            .field("entries", &self.entries.len())
            .field("refreshes", &self.refreshes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(balance: f64) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Amina".into(),
            phone: "+2348012345678".into(),
            balance,
            cashback_balance: 0.0,
        }
    }

    #[test]
    fn test_set_get_invalidate() {
        let cache = UserCache::new();
        assert!(cache.get(CURRENT_USER_KEY).is_none());
        assert!(cache.is_stale(CURRENT_USER_KEY));

        cache.set(CURRENT_USER_KEY, user(100.0));
        assert!(!cache.is_stale(CURRENT_USER_KEY));
        assert_eq!(cache.get(CURRENT_USER_KEY).unwrap().balance, 100.0);

        cache.invalidate(CURRENT_USER_KEY);
        assert!(cache.is_stale(CURRENT_USER_KEY));
        // Invalidation marks stale but keeps the value readable.
        assert!(cache.get(CURRENT_USER_KEY).is_some());
    }

    #[tokio::test]
    async fn test_cancel_refresh_aborts_task() {
        let cache = UserCache::new();
        let task = tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        });
        cache.register_refresh(CURRENT_USER_KEY, task.abort_handle());

        cache.cancel_refresh(CURRENT_USER_KEY);
        assert!(task.await.unwrap_err().is_cancelled());

        // Cancelling again is a no-op.
        cache.cancel_refresh(CURRENT_USER_KEY);
    }
}
