//! Per-user mutual exclusion
//!
//! Every charge and use of a user runs while holding that user's lock, so mutations of the same
//! user never interleave while different users never wait on each other.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::UserId;

/// Proof that the holder has exclusive access to a user's balance and history
///
/// The lock is released when the guard is dropped.
pub type AccountGuard = OwnedMutexGuard<()>;

/// Registry of per-user locks, created on first use
#[derive(Debug, Default)]
pub struct AccountLocks {
    locks: Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no one else holds the lock for `user_id`
    ///
    /// Waiters are served in the order they started waiting.
    pub async fn acquire(&self, user_id: UserId) -> AccountGuard {
        let lock = self.lock_for(user_id);
        lock.lock_owned().await
    }

    /// Lock for `user_id`, inserting it if this is the first request for that user
    fn lock_for(&self, user_id: UserId) -> Arc<AsyncMutex<()>> {
        self.registry()
            .entry(user_id)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Drop the locks that are neither held nor waited on
    ///
    /// Returns the number of locks removed.
    pub fn prune_idle(&self) -> usize {
        let mut locks = self.registry();
        let before = locks.len();
        // Holders and waiters keep their own `Arc`, and new ones can only get one through the
        // registry, which we hold.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - locks.len()
    }

    /// Number of users with a lock in the registry
    pub fn len(&self) -> usize {
        self.registry().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The map is never left half-updated, so a poisoned registry is still usable.
    fn registry(&self) -> MutexGuard<'_, HashMap<UserId, Arc<AsyncMutex<()>>>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
