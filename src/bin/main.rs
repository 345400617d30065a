// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use atm_ledger::{AccountId, Ledger, LedgerError, Pin, Session, Transaction};
use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use thiserror::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// ATM Ledger - Replay terminal operations against an in-memory ledger
///
/// Reads operations from a CSV file and writes account balances (or one
/// account's history) to stdout. Rejected operations are logged and skipped.
#[derive(Parser, Debug)]
#[command(name = "atm-ledger")]
#[command(about = "Replays ATM operations from a CSV file", long_about = None)]
struct Args {
    /// Path to CSV file with operations
    ///
    /// Expected format: op,account,pin,recipient,amount
    /// Example: cargo run -- operations.csv > balances.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Start without the demo account (1001 / PIN 1234 / 1000.00)
    #[arg(long)]
    no_demo_account: bool,

    /// Print this account's transaction history instead of the balances
    #[arg(long, value_name = "ID")]
    history: Option<u32>,

    /// Log filter, e.g. `debug` or `atm_ledger=info` (defaults to RUST_LOG, then `warn`)
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    let ledger = if args.no_demo_account {
        Ledger::new()
    } else {
        Ledger::with_demo_account()
    };

    if let Err(e) = process_operations(&ledger, BufReader::new(file)) {
        eprintln!("Error processing operations: {}", e);
        process::exit(1);
    }

    let written = match args.history {
        Some(id) => match ledger.history(AccountId(id)) {
            Ok(transactions) => write_history(&transactions, std::io::stdout()),
            Err(e) => {
                eprintln!("Error reading history of account {}: {}", id, e);
                process::exit(1);
            }
        },
        None => write_accounts(&ledger, std::io::stdout()),
    };
    if let Err(e) = written {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Installs a stderr subscriber so stdout stays machine-readable.
fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Why a single row was skipped.
#[derive(Debug, Error, PartialEq, Eq)]
enum RowError {
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("missing or malformed field '{0}'")]
    MissingField(&'static str),

    #[error("invalid account id or PIN")]
    AuthenticationFailed,

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Raw CSV record matching the input format.
///
/// Fields: `op, account, pin, recipient, amount`
#[derive(Debug, Deserialize)]
struct CsvRecord {
    op: String,
    #[serde(deserialize_with = "csv::invalid_option")]
    account: Option<u32>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pin: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    recipient: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    amount: Option<Decimal>,
}

impl CsvRecord {
    fn account(&self) -> Result<AccountId, RowError> {
        self.account.map(AccountId).ok_or(RowError::MissingField("account"))
    }

    fn pin(&self) -> Result<Pin, RowError> {
        self.pin.map(Pin).ok_or(RowError::MissingField("pin"))
    }

    fn recipient(&self) -> Result<AccountId, RowError> {
        self.recipient
            .map(AccountId)
            .ok_or(RowError::MissingField("recipient"))
    }

    fn amount(&self) -> Result<Decimal, RowError> {
        self.amount.ok_or(RowError::MissingField("amount"))
    }

    fn login<'a>(&self, ledger: &'a Ledger) -> Result<Session<'a>, RowError> {
        ledger
            .login(self.account()?, self.pin()?)
            .ok_or(RowError::AuthenticationFailed)
    }

    /// Runs the operation this row describes.
    ///
    /// Everything except `register` starts with a PIN check, the way the
    /// terminal menu only opens after login.
    fn apply(&self, ledger: &Ledger) -> Result<(), RowError> {
        match self.op.to_lowercase().as_str() {
            "register" => {
                ledger.register(self.account()?, self.pin()?, self.amount()?)?;
            }
            "login" => {
                let session = self.login(ledger)?;
                let balance = session.balance()?;
                info!(account = %session.account_id(), balance = %balance, "logged in");
            }
            "deposit" => {
                let session = self.login(ledger)?;
                session.deposit(self.amount()?)?;
            }
            "withdraw" | "withdrawal" => {
                let session = self.login(ledger)?;
                session.withdraw(self.amount()?)?;
            }
            "transfer" => {
                let session = self.login(ledger)?;
                session.transfer_to(self.recipient()?, self.amount()?)?;
            }
            "history" => {
                let session = self.login(ledger)?;
                for tx in session.history()? {
                    info!(
                        account = %session.account_id(),
                        sequence = tx.sequence(),
                        kind = %tx.kind(),
                        amount = %tx.amount(),
                        "history"
                    );
                }
            }
            other => return Err(RowError::UnknownOperation(other.to_string())),
        }
        Ok(())
    }
}

/// Replays operations from a CSV reader against `ledger`.
///
/// Rows are streamed one at a time. Malformed rows and rejected operations
/// are logged at `warn` and skipped; they never abort the run.
///
/// # CSV Format
///
/// Expected columns: `op, account, pin, recipient, amount`
/// - `op`: register, login, deposit, withdraw, transfer or history
/// - `account`: Account id (u32)
/// - `pin`: Numeric PIN (u32)
/// - `recipient`: Destination account id (transfer only)
/// - `amount`: Decimal amount (register, deposit, withdraw, transfer)
///
/// # Example
///
/// ```csv
/// op,account,pin,recipient,amount
/// register,1002,4321,,0.00
/// withdraw,1001,1234,,200.00
/// transfer,1001,1234,1002,100.00
/// ```
///
/// # Errors
///
/// Returns a CSV error only if the underlying reader fails.
pub fn process_operations<R: Read>(ledger: &Ledger, reader: R) -> Result<(), csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    for (index, result) in rdr.deserialize::<CsvRecord>().enumerate() {
        // Header is line 1.
        let line = index + 2;
        match result {
            Ok(record) => match record.apply(ledger) {
                Ok(()) => debug!(line, op = %record.op, "applied"),
                Err(e) => warn!(line, op = %record.op, error = %e, "skipping operation"),
            },
            Err(e) if e.is_io_error() => return Err(e),
            Err(e) => warn!(line, error = %e, "skipping malformed row"),
        }
    }

    Ok(())
}

/// Writes every account's balance as CSV.
///
/// # CSV Format
///
/// Columns: `account, balance, transactions`
///
/// ```csv
/// account,balance,transactions
/// 1001,750.00,3
/// 1002,100.00,1
/// ```
pub fn write_accounts<W: Write>(ledger: &Ledger, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    for account in ledger.accounts() {
        wtr.serialize(account)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes a transaction history as CSV.
///
/// # CSV Format
///
/// Columns: `sequence, date, type, amount`
pub fn write_history<W: Write>(transactions: &[Transaction], writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    for tx in transactions {
        wtr.serialize(tx)?;
    }
    wtr.flush()?;
    Ok(())
}
