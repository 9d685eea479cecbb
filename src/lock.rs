//! Per-key mutual exclusion with FIFO hand-off.
//!
//! Each key maps to a ticket lock: an acquirer takes the next ticket and
//! waits until it is being served, so waiters on one key are granted access
//! strictly in arrival order. Keys never contend with each other.
//!
//! Lock entries are reference counted. Every clone of an entry's `Arc` is
//! taken or dropped while the registry map is locked, so when a releasing
//! guard observes that only the map and itself hold the entry, nobody else
//! is holding or waiting and the entry is removed.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Tickets {
    next: u64,
    serving: u64,
}

#[derive(Debug, Default)]
struct TicketLock {
    tickets: Mutex<Tickets>,
    turn: Condvar,
}

impl TicketLock {
    fn tickets(&self) -> MutexGuard<'_, Tickets> {
        self.tickets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) {
        let mut tickets = self.tickets();
        let ticket = tickets.next;
        tickets.next += 1;
        while tickets.serving != ticket {
            tickets = self
                .turn
                .wait(tickets)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn unlock(&self) {
        self.tickets().serving += 1;
        self.turn.notify_all();
    }

    fn queue_len(&self) -> u64 {
        let tickets = self.tickets();
        tickets.next - tickets.serving
    }
}

/// Registry of lazily created, FIFO-fair locks keyed by `K`.
#[derive(Debug)]
pub struct KeyLockRegistry<K> {
    locks: Mutex<HashMap<K, Arc<TicketLock>>>,
}

impl<K: Eq + Hash + Clone> KeyLockRegistry<K> {
    pub fn new() -> Self {
        KeyLockRegistry {
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn locks(&self) -> MutexGuard<'_, HashMap<K, Arc<TicketLock>>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until the caller owns the lock for `key`.
    ///
    /// The lock is created on first reference; concurrent first references
    /// for one key always resolve to the same lock. Released when the
    /// returned guard is dropped.
    pub fn acquire(&self, key: K) -> KeyLockGuard<'_, K> {
        let lock = Arc::clone(self.locks().entry(key.clone()).or_default());
        lock.lock();
        KeyLockGuard {
            registry: self,
            key,
            lock: Some(lock),
        }
    }

    /// Number of live lock entries.
    pub fn len(&self) -> usize {
        self.locks().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Holder plus waiters currently queued on `key`.
    pub fn queue_len(&self, key: &K) -> u64 {
        self.locks()
            .get(key)
            .map(|lock| lock.queue_len())
            .unwrap_or(0)
    }

    fn release(&self, key: &K, lock: Arc<TicketLock>) {
        lock.unlock();

        let mut locks = self.locks();
        // One reference in the map, one here
        if Arc::strong_count(&lock) == 2 {
            locks.remove(key);
        }
        drop(lock);
    }
}

impl<K: Eq + Hash + Clone> Default for KeyLockRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive ownership of one key's lock. Releases on drop.
#[derive(Debug)]
pub struct KeyLockGuard<'a, K: Eq + Hash + Clone> {
    registry: &'a KeyLockRegistry<K>,
    key: K,
    lock: Option<Arc<TicketLock>>,
}

impl<K: Eq + Hash + Clone> KeyLockGuard<'_, K> {
    pub fn key(&self) -> &K {
        &self.key
    }
}

impl<K: Eq + Hash + Clone> Drop for KeyLockGuard<'_, K> {
    fn drop(&mut self) {
        if let Some(lock) = self.lock.take() {
            self.registry.release(&self.key, lock);
        }
    }
}
