//! Validated point amount for charge and use operations.

use crate::error::{LedgerError, Result};
use serde::{Serialize, Serializer};
use std::fmt;

/// A strictly positive number of points.
///
/// Construction is the only validation point: once an `Amount` exists it is
/// guaranteed to be greater than zero.
///
/// # Examples
///
/// ```
/// use points_ledger::Amount;
///
/// let amount = Amount::new(400).unwrap();
/// assert_eq!(amount.get(), 400);
/// assert!(Amount::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    /// Creates a new amount, rejecting zero and negative values.
    pub fn new(value: i64) -> Result<Self> {
        if value <= 0 {
            return Err(LedgerError::InvalidAmount { amount: value });
        }
        Ok(Amount(value))
    }

    /// Returns the raw number of points.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Amount {
    type Error = LedgerError;

    fn try_from(value: i64) -> Result<Self> {
        Amount::new(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_amount_is_accepted() {
        let amount = Amount::new(1).unwrap();
        assert_eq!(amount.get(), 1);
        assert_eq!(amount.to_string(), "1");
    }

    #[test]
    fn test_zero_and_negative_are_rejected() {
        assert!(matches!(
            Amount::new(0),
            Err(LedgerError::InvalidAmount { amount: 0 })
        ));
        assert!(matches!(
            Amount::try_from(-5),
            Err(LedgerError::InvalidAmount { amount: -5 })
        ));
    }

    #[test]
    fn test_ordering_follows_value() {
        assert!(Amount::new(10).unwrap() < Amount::new(11).unwrap());
    }
}
