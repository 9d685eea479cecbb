//! Batch command models for CSV parsing.

use crate::UserId;
use serde::Deserialize;

/// Raw command record as read from CSV.
///
/// The amount column is only meaningful for `charge` and `use`.
#[derive(Debug, Deserialize)]
pub struct CommandRecord {
    /// Operation: charge, use, point, history
    #[serde(rename = "type")]
    pub op: String,

    /// Target user id
    pub user: UserId,

    /// Amount (present for charge/use, absent for point/history)
    pub amount: Option<String>,
}

impl CommandRecord {
    /// Parses the raw CSV record into a typed command.
    ///
    /// Returns `None` for an unknown operation, a zero user id, or a
    /// missing/unparseable amount. The sign of the amount is left for the
    /// ledger to validate.
    pub fn parse(&self) -> Option<Command> {
        if self.user == 0 {
            return None;
        }

        let kind = match self.op.trim().to_lowercase().as_str() {
            "charge" => CommandKind::Charge(self.parse_amount()?),
            "use" => CommandKind::Use(self.parse_amount()?),
            "point" => CommandKind::Point,
            "history" => CommandKind::History,
            _ => return None,
        };

        Some(Command {
            user: self.user,
            kind,
        })
    }

    fn parse_amount(&self) -> Option<i64> {
        let trimmed = self.amount.as_deref()?.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse().ok()
    }
}

/// A parsed command ready for the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub user: UserId,
    pub kind: CommandKind,
}

/// Ledger operation selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    /// Add points.
    Charge(i64),

    /// Spend points.
    Use(i64),

    /// Read the current balance.
    Point,

    /// Read the transaction history.
    History,
}
