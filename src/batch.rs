//! Streaming CSV front end for the ledger.
//!
//! Stands in for a request-handling layer: each row is one request. Rows
//! that fail to parse, or whose operation the ledger rejects, are logged at
//! warn level and skipped.

use crate::command::{CommandKind, CommandRecord};
use crate::error::Result;
use crate::history::HistoryLog;
use crate::ledger::LedgerService;
use crate::store::BalanceStore;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use log::{debug, warn};
use std::io::{Read, Write};

/// Row counts from one batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Rows the ledger accepted.
    pub applied: usize,

    /// Rows the ledger rejected.
    pub rejected: usize,

    /// Rows that could not be parsed.
    pub malformed: usize,
}

/// Applies commands from a CSV reader in streaming fashion.
///
/// Only I/O failures of the reader abort the run.
pub fn process_csv<R, B, H>(ledger: &LedgerService<B, H>, reader: R) -> Result<BatchSummary>
where
    R: Read,
    B: BalanceStore,
    H: HistoryLog,
{
    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut summary = BatchSummary::default();

    for (row_idx, result) in csv_reader.deserialize::<CommandRecord>().enumerate() {
        let row_num = row_idx + 2; // 1-indexed, accounting for header row

        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                warn!("Row {}: CSV parse error: {}", row_num, e);
                summary.malformed += 1;
                continue;
            }
        };

        let Some(command) = record.parse() else {
            warn!("Row {}: Failed to parse command record", row_num);
            summary.malformed += 1;
            continue;
        };

        let outcome = match command.kind {
            CommandKind::Charge(amount) => ledger
                .charge(command.user, amount)
                .map(|row| debug!("Row {}: user {} balance {}", row_num, row.id, row.point)),
            CommandKind::Use(amount) => ledger
                .use_points(command.user, amount)
                .map(|row| debug!("Row {}: user {} balance {}", row_num, row.id, row.point)),
            CommandKind::Point => ledger
                .query(command.user)
                .map(|row| debug!("Row {}: user {} has {} points", row_num, row.id, row.point)),
            CommandKind::History => ledger.list_history(command.user).map(|entries| {
                debug!(
                    "Row {}: user {} has {} history entries",
                    row_num,
                    command.user,
                    entries.len()
                )
            }),
        };

        match outcome {
            Ok(()) => summary.applied += 1,
            Err(e) => {
                warn!("Row {}: {}", row_num, e);
                summary.rejected += 1;
            }
        }
    }

    Ok(summary)
}

/// Writes every balance row as CSV, sorted by user id.
///
/// The header is written even when there are no rows.
pub fn write_balances<W, B, H>(ledger: &LedgerService<B, H>, writer: W) -> Result<()>
where
    W: Write,
    B: BalanceStore,
    H: HistoryLog,
{
    let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record(["id", "point", "updated_at"])?;
    for row in ledger.balances().all() {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes every history entry as CSV, ordered by entry id.
pub fn write_history<W, B, H>(ledger: &LedgerService<B, H>, writer: W) -> Result<()>
where
    W: Write,
    B: BalanceStore,
    H: HistoryLog,
{
    let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record(["id", "user_id", "amount", "kind", "timestamp"])?;
    for entry in ledger.history().all() {
        csv_writer.serialize(entry)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::LimitPolicy;
    use std::io::Cursor;

    fn run(csv: &str) -> (LedgerService, BatchSummary) {
        let ledger = LedgerService::new(LimitPolicy::new(0, 1000).unwrap());
        let summary = process_csv(&ledger, Cursor::new(csv)).unwrap();
        (ledger, summary)
    }

    #[test]
    fn test_scenario_counts() {
        let csv = r#"type,user,amount
charge,1,1500
charge,1,400
use,1,500
use,1,400
point,1,
history,1,"#;

        let (ledger, summary) = run(csv);
        assert_eq!(
            summary,
            BatchSummary {
                applied: 4,
                rejected: 2,
                malformed: 0
            }
        );
        assert_eq!(ledger.query(1).unwrap().point, 0);
        assert_eq!(ledger.list_history(1).unwrap().len(), 2);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let csv = r#"type,user,amount
charge,abc,10
refund,1,10
charge,0,10
charge,1,
charge,2,10"#;

        let (ledger, summary) = run(csv);
        assert_eq!(summary.malformed, 4);
        assert_eq!(summary.applied, 1);
        assert_eq!(ledger.query(2).unwrap().point, 10);
    }

    #[test]
    fn test_balances_output() {
        let (ledger, _) = run("type,user,amount\ncharge,2,20\ncharge,1,10\n");
        let mut output = Vec::new();
        write_balances(&ledger, &mut output).unwrap();

        let output = String::from_utf8(output).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[0], "id,point,updated_at");
        assert!(lines[1].starts_with("1,10,"));
        assert!(lines[2].starts_with("2,20,"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_history_output() {
        let (ledger, _) = run("type,user,amount\ncharge,1,10\nuse,1,4\n");
        let mut output = Vec::new();
        write_history(&ledger, &mut output).unwrap();

        let output = String::from_utf8(output).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[0], "id,user_id,amount,kind,timestamp");
        assert!(lines[1].starts_with("1,1,10,CHARGE,"));
        assert!(lines[2].starts_with("2,1,4,USE,"));
    }
}
