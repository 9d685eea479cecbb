//! Ledger service orchestrating balance changes and their audit trail.
//!
//! Charge and use run as a read-modify-write of the user's balance under
//! that user's lock, so operations on one user are totally ordered while
//! different users proceed in parallel. Queries take no lock.
//!
//! The balance commit is the authoritative transition. The history append
//! that follows is best effort: a failure is logged and neither retried,
//! rolled back, nor surfaced to the caller.

use crate::amount::Amount;
use crate::error::{LedgerError, Result};
use crate::history::{HistoryEntry, HistoryLog, MemoryHistoryLog, TxKind};
use crate::lock::KeyLockRegistry;
use crate::policy::LimitPolicy;
use crate::store::{BalanceStore, MemoryBalanceStore};
use crate::user_point::UserPoint;
use crate::UserId;
use log::{debug, error};
use std::sync::atomic::{AtomicU64, Ordering};

/// Points ledger over a balance store and a history log.
///
/// Shareable across threads by reference; all methods take `&self`.
pub struct LedgerService<B = MemoryBalanceStore, H = MemoryHistoryLog> {
    policy: LimitPolicy,
    balances: B,
    history: H,
    locks: KeyLockRegistry<UserId>,
    history_failures: AtomicU64,
}

impl LedgerService {
    /// Creates a ledger backed by fresh in-memory stores.
    pub fn new(policy: LimitPolicy) -> Self {
        Self::with_stores(policy, MemoryBalanceStore::new(), MemoryHistoryLog::new())
    }
}

impl<B: BalanceStore, H: HistoryLog> LedgerService<B, H> {
    /// Creates a ledger over the given stores.
    pub fn with_stores(policy: LimitPolicy, balances: B, history: H) -> Self {
        LedgerService {
            policy,
            balances,
            history,
            locks: KeyLockRegistry::new(),
            history_failures: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> &LimitPolicy {
        &self.policy
    }

    pub fn balances(&self) -> &B {
        &self.balances
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    /// Number of history appends that failed after their balance commit.
    pub fn history_failures(&self) -> u64 {
        self.history_failures.load(Ordering::Relaxed)
    }

    /// Adds `amount` points to the user's balance.
    ///
    /// Fails with `InvalidAmount` for `amount <= 0` and `LimitExceeded` if
    /// the new balance would be above the ceiling. No state changes on
    /// failure. The floor is not checked: a charge that leaves the balance
    /// below a positive floor still commits.
    pub fn charge(&self, user_id: UserId, amount: i64) -> Result<UserPoint> {
        let amount = Amount::new(amount)?;

        if self.policy.exceeds_span(amount) {
            debug!(
                "Rejecting charge of {} for user {} without locking: above ceiling {}",
                amount,
                user_id,
                self.policy.max()
            );
            let current = self.balances.get(user_id).point;
            return Err(self.policy.limit_exceeded(user_id, current, amount));
        }

        let _guard = self.locks.acquire(user_id);

        let current = self.balances.get(user_id);
        let balance = current
            .charged(amount)
            .ok_or_else(|| self.policy.limit_exceeded(user_id, current.point, amount))?;
        self.policy.check_ceiling(user_id, current.point, amount, balance)?;

        let updated = self.balances.set(user_id, balance);
        self.record(&updated, amount, TxKind::Charge);

        debug!(
            "Charged {} to user {}, balance {} -> {}",
            amount, user_id, current.point, updated.point
        );
        Ok(updated)
    }

    /// Spends `amount` points from the user's balance.
    ///
    /// Fails with `InvalidAmount` for `amount <= 0` and
    /// `InsufficientBalance` if the new balance would be below the floor.
    /// No state changes on failure.
    pub fn use_points(&self, user_id: UserId, amount: i64) -> Result<UserPoint> {
        let amount = Amount::new(amount)?;

        let _guard = self.locks.acquire(user_id);

        let current = self.balances.get(user_id);
        let balance = current
            .used(amount)
            .ok_or_else(|| self.policy.insufficient(user_id, current.point, amount))?;
        self.policy.check_floor(user_id, current.point, amount, balance)?;

        let updated = self.balances.set(user_id, balance);
        self.record(&updated, amount, TxKind::Use);

        debug!(
            "Used {} from user {}, balance {} -> {}",
            amount, user_id, current.point, updated.point
        );
        Ok(updated)
    }

    /// Current balance of a user with at least one recorded transaction.
    ///
    /// Fails with `InvalidUser` otherwise, even though a zero-balance row
    /// could be synthesized.
    pub fn query(&self, user_id: UserId) -> Result<UserPoint> {
        if self.history.list_by_user(user_id).is_empty() {
            return Err(LedgerError::InvalidUser(user_id));
        }
        Ok(self.balances.get(user_id))
    }

    /// All history entries of a user in insertion order.
    ///
    /// Fails with `InvalidUser` if there are none.
    pub fn list_history(&self, user_id: UserId) -> Result<Vec<HistoryEntry>> {
        let entries = self.history.list_by_user(user_id);
        if entries.is_empty() {
            return Err(LedgerError::InvalidUser(user_id));
        }
        Ok(entries)
    }

    /// Best-effort audit append for a committed balance.
    fn record(&self, committed: &UserPoint, amount: Amount, kind: TxKind) {
        if let Err(e) = self
            .history
            .append(committed.id, amount, kind, committed.updated_at)
        {
            self.history_failures.fetch_add(1, Ordering::Relaxed);
            error!(
                "History append failed for user {} ({:?} {}), balance {} kept: {}",
                committed.id, kind, amount, committed.point, e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(min: i64, max: i64) -> LedgerService {
        LedgerService::new(LimitPolicy::new(min, max).unwrap())
    }

    #[test]
    fn test_charge_creates_history() {
        let ledger = ledger(0, 1000);
        let updated = ledger.charge(1, 100).unwrap();

        assert_eq!(updated.id, 1);
        assert_eq!(updated.point, 100);

        let entries = ledger.list_history(1).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, TxKind::Charge);
        assert_eq!(entries[0].amount.get(), 100);
        assert_eq!(entries[0].timestamp, updated.updated_at);
    }

    #[test]
    fn test_charge_up_to_exact_ceiling() {
        let ledger = ledger(0, 1000);
        ledger.charge(1, 600).unwrap();
        assert_eq!(ledger.charge(1, 400).unwrap().point, 1000);
        assert!(matches!(
            ledger.charge(1, 1),
            Err(LedgerError::LimitExceeded { balance: 1000, .. })
        ));
    }

    #[test]
    fn test_fast_reject_reports_current_balance() {
        let ledger = ledger(0, 1000);
        ledger.charge(1, 250).unwrap();

        match ledger.charge(1, 5000) {
            Err(LedgerError::LimitExceeded { balance, amount, .. }) => {
                assert_eq!((balance, amount), (250, 5000))
            }
            other => panic!("Expected LimitExceeded, got {:?}", other),
        }
        assert_eq!(ledger.query(1).unwrap().point, 250);
    }

    #[test]
    fn test_use_down_to_exact_floor() {
        let ledger = ledger(-100, 1000);
        ledger.charge(1, 50).unwrap();
        assert_eq!(ledger.use_points(1, 150).unwrap().point, -100);
        assert!(matches!(
            ledger.use_points(1, 1),
            Err(LedgerError::InsufficientBalance { min: -100, .. })
        ));
    }

    #[test]
    fn test_charge_does_not_enforce_positive_floor() {
        let ledger = ledger(100, 1000);

        assert_eq!(ledger.charge(1, 50).unwrap().point, 50);
        assert!(matches!(
            ledger.use_points(1, 10),
            Err(LedgerError::InsufficientBalance { balance: 50, min: 100, .. })
        ));

        assert_eq!(ledger.charge(1, 100).unwrap().point, 150);
        assert_eq!(ledger.use_points(1, 50).unwrap().point, 100);
        assert_eq!(ledger.list_history(1).unwrap().len(), 3);
    }

    #[test]
    fn test_use_without_prior_charge_fails() {
        let ledger = ledger(0, 1000);
        assert!(matches!(
            ledger.use_points(1, 1),
            Err(LedgerError::InsufficientBalance { balance: 0, .. })
        ));
        assert!(ledger.balances().all().is_empty());
    }

    #[test]
    fn test_query_is_gated_on_history() {
        let ledger = ledger(0, 1000);
        assert!(matches!(ledger.query(9), Err(LedgerError::InvalidUser(9))));
        assert!(matches!(
            ledger.list_history(9),
            Err(LedgerError::InvalidUser(9))
        ));

        ledger.charge(9, 1).unwrap();
        assert_eq!(ledger.query(9).unwrap().point, 1);
    }

    #[test]
    fn test_invalid_amount_leaves_state_untouched() {
        let ledger = ledger(0, 1000);
        for amount in [0, -1, i64::MIN] {
            assert!(matches!(
                ledger.charge(1, amount),
                Err(LedgerError::InvalidAmount { .. })
            ));
            assert!(matches!(
                ledger.use_points(1, amount),
                Err(LedgerError::InvalidAmount { .. })
            ));
        }
        assert!(ledger.balances().all().is_empty());
        assert!(ledger.history().all().is_empty());
    }

    #[test]
    fn test_overflow_is_limit_exceeded() {
        let ledger = ledger(0, i64::MAX);
        ledger.charge(1, i64::MAX).unwrap();
        assert!(matches!(
            ledger.charge(1, 1),
            Err(LedgerError::LimitExceeded { .. })
        ));
        assert_eq!(ledger.query(1).unwrap().point, i64::MAX);
    }
}
