//! Per-user balance snapshot.

use crate::amount::Amount;
use crate::UserId;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A user's point balance as of its last commit.
///
/// # Invariants
///
/// - `min <= point <= max` of the active [`LimitPolicy`](crate::LimitPolicy)
///   after every successful commit
/// - Only mutated by the ledger while holding the owning user's lock
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPoint {
    /// User identifier.
    pub id: UserId,

    /// Current balance.
    pub point: i64,

    /// Time of the last commit (or of synthesis for a fresh row).
    pub updated_at: DateTime<Utc>,
}

impl UserPoint {
    /// Creates a zero-balance row for a user that has never been written.
    pub fn empty(id: UserId) -> Self {
        UserPoint {
            id,
            point: 0,
            updated_at: Utc::now(),
        }
    }

    /// Balance after charging `amount`, or `None` on overflow.
    pub fn charged(&self, amount: Amount) -> Option<i64> {
        self.point.checked_add(amount.get())
    }

    /// Balance after using `amount`, or `None` on overflow.
    pub fn used(&self, amount: Amount) -> Option<i64> {
        self.point.checked_sub(amount.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(value: i64) -> Amount {
        Amount::new(value).unwrap()
    }

    #[test]
    fn test_empty_row_has_zero_balance() {
        let row = UserPoint::empty(7);
        assert_eq!(row.id, 7);
        assert_eq!(row.point, 0);
    }

    #[test]
    fn test_charge_and_use_do_not_mutate() {
        let row = UserPoint {
            point: 100,
            ..UserPoint::empty(1)
        };

        assert_eq!(row.charged(amt(50)), Some(150));
        assert_eq!(row.used(amt(30)), Some(70));
        assert_eq!(row.used(amt(130)), Some(-30));
        assert_eq!(row.point, 100);
    }

    #[test]
    fn test_overflow_is_reported() {
        let row = UserPoint {
            point: i64::MAX,
            ..UserPoint::empty(1)
        };
        assert_eq!(row.charged(amt(1)), None);

        let row = UserPoint {
            point: i64::MIN,
            ..UserPoint::empty(1)
        };
        assert_eq!(row.used(amt(1)), None);
    }
}
