//! Current balance per user.

use crate::user_point::UserPoint;
use crate::UserId;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Keyed store of the current balance per user.
///
/// Individual calls are thread-safe, but a `get` followed by a `set` is not
/// atomic. The ledger serializes read-modify-write per user with its own
/// lock.
pub trait BalanceStore: Send + Sync {
    /// Returns the stored row, or a fresh zero-balance row. Never fails.
    fn get(&self, user_id: UserId) -> UserPoint;

    /// Overwrites the row, stamps the current time and returns the snapshot.
    fn set(&self, user_id: UserId, point: i64) -> UserPoint;

    /// Every stored row, sorted by user id.
    fn all(&self) -> Vec<UserPoint>;
}

/// In-memory balance store living for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryBalanceStore {
    rows: RwLock<HashMap<UserId, UserPoint>>,
}

impl MemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BalanceStore for MemoryBalanceStore {
    fn get(&self, user_id: UserId) -> UserPoint {
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| UserPoint::empty(user_id))
    }

    fn set(&self, user_id: UserId, point: i64) -> UserPoint {
        let row = UserPoint {
            id: user_id,
            point,
            updated_at: Utc::now(),
        };
        self.rows
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id, row.clone());
        row
    }

    fn all(&self) -> Vec<UserPoint> {
        let mut rows: Vec<_> = self
            .rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.id);
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_synthesizes_without_storing() {
        let store = MemoryBalanceStore::new();
        let row = store.get(1);

        assert_eq!(row.id, 1);
        assert_eq!(row.point, 0);
        assert!(store.all().is_empty());
    }

    #[test]
    fn test_set_overwrites_and_stamps() {
        let store = MemoryBalanceStore::new();
        let before = Utc::now();

        store.set(1, 100);
        let row = store.set(1, 40);

        assert_eq!(row.point, 40);
        assert!(row.updated_at >= before);
        assert_eq!(store.get(1), row);
    }

    #[test]
    fn test_returned_rows_are_detached_snapshots() {
        let store = MemoryBalanceStore::new();
        let mut row = store.set(1, 100);
        row.point = -5;

        assert_eq!(store.get(1).point, 100);
    }

    #[test]
    fn test_all_is_sorted_by_user() {
        let store = MemoryBalanceStore::new();
        store.set(3, 30);
        store.set(1, 10);
        store.set(2, 20);

        let ids: Vec<_> = store.all().iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
