//! Points Ledger CLI
//!
//! Applies charge/use/point/history commands from a CSV file and writes the
//! final balances (or the full history) to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- commands.csv > balances.csv
//! cargo run -- commands.csv --history > history.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity
//! - `POINT_LIMIT_MIN` / `POINT_LIMIT_MAX`: balance bounds (default 0 and 1000000)

use log::info;
use points_ledger::{batch, LedgerError, LedgerService, LimitConfig, Result};
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    if let Some(unknown) = args
        .iter()
        .find(|arg| arg.starts_with("--") && arg.as_str() != "--history")
    {
        return Err(LedgerError::UnknownArgument(unknown.clone()));
    }
    let history = args.iter().any(|arg| arg == "--history");
    let input_path = args
        .iter()
        .find(|arg| !arg.starts_with("--"))
        .ok_or(LedgerError::MissingArgument)?;

    let policy = LimitConfig::from_env()?.policy()?;
    info!("Limits: min {}, max {}", policy.min(), policy.max());

    let file = File::open(input_path)?;
    let reader = BufReader::new(file);

    let ledger = LedgerService::new(policy);
    let summary = batch::process_csv(&ledger, reader)?;
    info!(
        "Processed {}: {} applied, {} rejected, {} malformed",
        input_path, summary.applied, summary.rejected, summary.malformed
    );

    let stdout = io::stdout();
    let handle = stdout.lock();
    if history {
        batch::write_history(&ledger, handle)?;
    } else {
        batch::write_balances(&ledger, handle)?;
    }

    Ok(())
}
