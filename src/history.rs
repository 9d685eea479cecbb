//! Append-only transaction history.
//!
//! Entry ids come from a single atomic counter shared by all users, so they
//! are unique and increasing across the whole log. An id is drawn while the
//! entry table is write-locked, so every user's entries are stored in id
//! order even under concurrent appends. Through the ledger, that is also the
//! order in which the user's operations were committed.

use crate::amount::Amount;
use crate::error::Result;
use crate::UserId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

/// Direction of a recorded transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TxKind {
    /// Points were added.
    Charge,

    /// Points were spent.
    Use,
}

/// An immutable record of one committed charge or use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// Globally monotonic id
    pub id: u64,

    pub user_id: UserId,

    pub amount: Amount,

    pub kind: TxKind,

    /// Timestamp of the balance commit this entry records
    pub timestamp: DateTime<Utc>,
}

/// Append-only log of transaction records.
pub trait HistoryLog: Send + Sync {
    /// Assigns the next global id and stores the entry.
    fn append(
        &self,
        user_id: UserId,
        amount: Amount,
        kind: TxKind,
        timestamp: DateTime<Utc>,
    ) -> Result<HistoryEntry>;

    /// All entries for `user_id` in insertion order. Possibly empty.
    fn list_by_user(&self, user_id: UserId) -> Vec<HistoryEntry>;

    /// All entries across users, ordered by id.
    fn all(&self) -> Vec<HistoryEntry>;
}

/// In-memory history log living for the lifetime of the process.
#[derive(Debug)]
pub struct MemoryHistoryLog {
    next_id: AtomicU64,
    entries: RwLock<HashMap<UserId, Vec<HistoryEntry>>>,
}

impl MemoryHistoryLog {
    pub fn new() -> Self {
        MemoryHistoryLog {
            next_id: AtomicU64::new(1),
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryHistoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryLog for MemoryHistoryLog {
    fn append(
        &self,
        user_id: UserId,
        amount: Amount,
        kind: TxKind,
        timestamp: DateTime<Utc>,
    ) -> Result<HistoryEntry> {
        // Id assignment and push share the write guard so id order is push order
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = HistoryEntry {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            user_id,
            amount,
            kind,
            timestamp,
        };
        entries.entry(user_id).or_default().push(entry.clone());

        Ok(entry)
    }

    fn list_by_user(&self, user_id: UserId) -> Vec<HistoryEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    fn all(&self) -> Vec<HistoryEntry> {
        let mut entries: Vec<_> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .flatten()
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.id);
        entries
    }
}
