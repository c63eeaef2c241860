// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user locks around snapshot load-modify-write cycles.
//!
//! User data lives in a handful of whole-list documents, so two requests for
//! the same user that both load, mutate and write back would otherwise lose
//! one of the updates. Locks are per process; a single instance serves a
//! given user's requests.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Shared per-user mutexes for use in AppState.
#[derive(Clone, Default)]
pub struct UserLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `user_id`'s data.
    ///
    /// The lock is held until the returned guard is dropped.
    pub async fn lock(&self, user_id: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_user_waits_for_release() {
        let locks = UserLocks::new();
        let guard = locks.lock("alice").await;

        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.lock("alice")).await;
        assert!(blocked.is_err());

        drop(guard);
        let acquired = tokio::time::timeout(Duration::from_millis(50), locks.lock("alice")).await;
        assert!(acquired.is_ok());
    }

    #[tokio::test]
    async fn test_users_do_not_block_each_other() {
        let locks = UserLocks::new();
        let _alice = locks.lock("alice").await;

        let bob = tokio::time::timeout(Duration::from_millis(50), locks.lock("bob")).await;
        assert!(bob.is_ok());
    }

    #[tokio::test]
    async fn test_clones_share_locks() {
        let locks = UserLocks::new();
        let other = locks.clone();
        let _guard = locks.lock("alice").await;

        let blocked = tokio::time::timeout(Duration::from_millis(50), other.lock("alice")).await;
        assert!(blocked.is_err());
    }
}
