//! Suggestion history ledger: per-user memory of recently returned option
//! sets, fed back into the prompt so the model avoids repeats.
//!
//! Process memory only. Each user has their own async mutex; a request holds
//! its user's guard from reading history until it records the new set, so
//! concurrent requests from one user cannot lose an update, and other users
//! never wait on it.

use std::collections::VecDeque;
use std::sync::Arc;

use dashmap::DashMap;
use ootd_core::{OptionSet, UserId};
use tokio::sync::{Mutex, OwnedMutexGuard};

pub const DEFAULT_HISTORY_CAPACITY: usize = 1;

type Entry = Arc<Mutex<VecDeque<OptionSet>>>;

pub struct SuggestionLedger {
    entries: DashMap<UserId, Entry>,
    capacity: usize,
}

impl Default for SuggestionLedger {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl SuggestionLedger {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of users with an entry.
    pub fn users(&self) -> usize {
        self.entries.len()
    }

    /// Take exclusive access to one user's history.
    pub async fn lock(&self, user_id: UserId) -> LedgerGuard {
        // clone the Arc out so the map shard is not held across the await
        let entry: Entry = self.entries.entry(user_id).or_default().value().clone();
        LedgerGuard {
            capacity: self.capacity,
            sets: entry.lock_owned().await,
        }
    }

    /// Previously returned sets, most recent last.
    pub async fn get(&self, user_id: UserId) -> Vec<OptionSet> {
        self.lock(user_id).await.prior()
    }

    pub async fn push(&self, user_id: UserId, set: OptionSet) {
        self.lock(user_id).await.record(set);
    }

    pub async fn clear(&self, user_id: UserId) {
        self.lock(user_id).await.clear();
    }
}

pub struct LedgerGuard {
    capacity: usize,
    sets: OwnedMutexGuard<VecDeque<OptionSet>>,
}

impl LedgerGuard {
    pub fn prior(&self) -> Vec<OptionSet> {
        self.sets.iter().cloned().collect()
    }

    /// Append, then evict oldest entries beyond capacity.
    pub fn record(&mut self, set: OptionSet) {
        self.sets.push_back(set);
        while self.sets.len() > self.capacity {
            self.sets.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.sets.clear();
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
