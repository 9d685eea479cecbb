//! Balance bounds applied uniformly to every user.

use crate::amount::Amount;
use crate::error::{LedgerError, Result};
use crate::UserId;

/// Immutable `[min, max]` balance bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitPolicy {
    min: i64,
    max: i64,
}

impl LimitPolicy {
    /// Creates a policy, rejecting `min > max`.
    pub fn new(min: i64, max: i64) -> Result<Self> {
        if min > max {
            return Err(LedgerError::InvalidPolicy { min, max });
        }
        Ok(LimitPolicy { min, max })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    /// Returns `true` if `min <= balance <= max`.
    pub fn contains(&self, balance: i64) -> bool {
        self.min <= balance && balance <= self.max
    }

    /// Fails with `LimitExceeded` if `balance` is above the ceiling.
    ///
    /// `current` and `amount` only feed the error message.
    pub fn check_ceiling(
        &self,
        user_id: UserId,
        current: i64,
        amount: Amount,
        balance: i64,
    ) -> Result<()> {
        if balance > self.max {
            return Err(self.limit_exceeded(user_id, current, amount));
        }
        Ok(())
    }

    /// Fails with `InsufficientBalance` if `balance` is below the floor.
    pub fn check_floor(
        &self,
        user_id: UserId,
        current: i64,
        amount: Amount,
        balance: i64,
    ) -> Result<()> {
        if balance < self.min {
            return Err(self.insufficient(user_id, current, amount));
        }
        Ok(())
    }

    /// Returns `true` if no reachable balance could absorb a charge of
    /// `amount` without crossing the ceiling.
    ///
    /// The lowest reachable balance is `min(min, 0)`, since fresh rows
    /// start at zero even when the floor is positive.
    pub fn exceeds_span(&self, amount: Amount) -> bool {
        let lowest = self.min.min(0);
        lowest
            .checked_add(amount.get())
            .map_or(true, |balance| balance > self.max)
    }

    pub(crate) fn limit_exceeded(
        &self,
        user_id: UserId,
        current: i64,
        amount: Amount,
    ) -> LedgerError {
        LedgerError::LimitExceeded {
            user_id,
            balance: current,
            amount: amount.get(),
            max: self.max,
        }
    }

    pub(crate) fn insufficient(
        &self,
        user_id: UserId,
        current: i64,
        amount: Amount,
    ) -> LedgerError {
        LedgerError::InsufficientBalance {
            user_id,
            balance: current,
            amount: amount.get(),
            min: self.min,
        }
    }
}
