//! # Points Ledger
//!
//! Tracks a per-user points balance with bounded charge/use operations and
//! an append-only history of every committed change.
//!
//! ## Design Principles
//!
//! - **Per-user serialization**: charge/use for one user run under that
//!   user's FIFO lock; different users never wait on each other
//! - **Bounded balances**: `min <= balance <= max` after every commit
//! - **Balance first**: the balance commit defines success, history
//!   appends are best effort
//! - **Injected stores**: balance and history stores are plain values
//!   handed to the service, swappable in tests
//!
//! ## Example
//!
//! ```
//! use points_ledger::{LedgerError, LedgerService, LimitPolicy};
//!
//! let ledger = LedgerService::new(LimitPolicy::new(0, 1000).unwrap());
//!
//! assert!(matches!(ledger.charge(1, 1500), Err(LedgerError::LimitExceeded { .. })));
//! assert_eq!(ledger.charge(1, 400).unwrap().point, 400);
//! assert!(matches!(ledger.use_points(1, 500), Err(LedgerError::InsufficientBalance { .. })));
//! assert_eq!(ledger.use_points(1, 400).unwrap().point, 0);
//! assert_eq!(ledger.list_history(1).unwrap().len(), 2);
//! ```

pub mod amount;
pub mod batch;
pub mod command;
pub mod config;
pub mod error;
pub mod history;
pub mod ledger;
pub mod lock;
pub mod policy;
pub mod store;
pub mod user_point;

/// User identifier. Callers only pass positive ids.
pub type UserId = u64;

pub use amount::Amount;
pub use batch::{process_csv, write_balances, write_history, BatchSummary};
pub use command::{Command, CommandKind, CommandRecord};
pub use config::LimitConfig;
pub use error::{LedgerError, Result};
pub use history::{HistoryEntry, HistoryLog, MemoryHistoryLog, TxKind};
pub use ledger::LedgerService;
pub use lock::{KeyLockGuard, KeyLockRegistry};
pub use policy::LimitPolicy;
pub use store::{BalanceStore, MemoryBalanceStore};
pub use user_point::UserPoint;
