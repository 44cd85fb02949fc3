//! Keyed async mutual exclusion.
//!
//! The ballot record is the unit of mutual exclusion: every read-recount-
//! write on a ballot runs under that ballot's lock, while work on different
//! ballots proceeds in parallel. Agenda items get their own lock space so
//! two `StartVote` calls for one item cannot both pass the "no open ballot"
//! check.
//!
//! Lock order is always ballot, then agenda item.

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::foundation::{AgendaItemId, BallotId};

/// One async mutex per key, created on first use.
pub struct KeyedLocks<K> {
    locks: DashMap<K, Arc<Mutex<()>>>,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Waits for exclusive access to `key`.
    pub async fn lock(&self, key: &K) -> OwnedMutexGuard<()> {
        // The map shard is released before awaiting the mutex.
        let lock = Arc::clone(&self.locks.entry(key.clone()).or_default());
        lock.lock_owned().await
    }

    /// Drops the mutex for `key` if nobody holds or awaits it.
    pub fn release(&self, key: &K) {
        self.locks.remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Number of keys with a live mutex.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock spaces shared by the vote handlers.
#[derive(Default)]
pub struct VoteLocks {
    pub ballots: KeyedLocks<BallotId>,
    pub agenda_items: KeyedLocks<AgendaItemId>,
}

impl VoteLocks {
    pub fn new() -> Self {
        Self::default()
    }
}
