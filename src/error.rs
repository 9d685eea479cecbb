//! Error types for the points ledger.

use crate::UserId;
use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur during ledger operation.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Charge/use amount was zero or negative
    #[error("Amount must be positive, got {amount}")]
    InvalidAmount { amount: i64 },

    /// Resulting balance would exceed the configured ceiling
    #[error("Charging {amount} to user {user_id} (balance {balance}) would exceed the maximum of {max}")]
    LimitExceeded {
        user_id: UserId,
        balance: i64,
        amount: i64,
        max: i64,
    },

    /// Resulting balance would fall below the configured floor
    #[error("Insufficient balance for user {user_id}: balance {balance}, requested {amount}, minimum {min}")]
    InsufficientBalance {
        user_id: UserId,
        balance: i64,
        amount: i64,
        min: i64,
    },

    /// Query or history for a user without any transaction
    #[error("Invalid user {0}: no transactions recorded")]
    InvalidUser(UserId),

    /// Append to the history log failed
    #[error("History write failed: {0}")]
    HistoryWrite(String),

    /// Limit bounds are inverted
    #[error("Invalid limit policy: min {min} is greater than max {max}")]
    InvalidPolicy { min: i64, max: i64 },

    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Environment configuration value could not be parsed
    #[error("Invalid configuration value for {key}: {value:?}")]
    InvalidConfig { key: &'static str, value: String },

    /// Unrecognized command-line flag
    #[error("Unknown argument {0}. Usage: points-ledger <commands.csv> [--history]")]
    UnknownArgument(String),

    /// Missing input file argument
    #[error("Missing input file argument. Usage: points-ledger <commands.csv> [--history]")]
    MissingArgument,
}
