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

//! # ATM Ledger
//!
//! This library provides the in-memory account ledger behind an ATM-style
//! terminal: registration, PIN login, deposits, withdrawals, transfers and
//! per-account transaction history.
//!
//! ## Core Components
//!
//! - [`Ledger`]: Owns every account and exposes all operations
//! - [`AccountSnapshot`]: Point-in-time view of one account
//! - [`Session`]: Operations scoped to an authenticated account
//! - [`Transaction`]: Immutable record of one balance change
//! - [`LedgerError`]: Reasons an operation was rejected
//!
//! ## Example
//!
//! ```
//! use atm_ledger::{AccountId, Ledger, Pin, TransactionKind};
//! use rust_decimal_macros::dec;
//!
//! let ledger = Ledger::new();
//! ledger.register(AccountId(1001), Pin(1234), dec!(1000.00)).unwrap();
//! ledger.register(AccountId(1002), Pin(4321), dec!(0.00)).unwrap();
//!
//! let session = ledger.login(AccountId(1001), Pin(1234)).unwrap();
//! assert_eq!(session.withdraw(dec!(200.00)).unwrap(), dec!(800.00));
//! assert_eq!(session.deposit(dec!(50.00)).unwrap(), dec!(850.00));
//!
//! let receipt = session.transfer_to(AccountId(1002), dec!(100.00)).unwrap();
//! assert_eq!(receipt.from_balance, dec!(750.00));
//! assert_eq!(receipt.to_balance, dec!(100.00));
//!
//! let history = ledger.history(AccountId(1002)).unwrap();
//! assert_eq!(history[0].kind(), TransactionKind::TransferFrom(AccountId(1001)));
//! ```
//!
//! ## Thread Safety
//!
//! The ledger can be shared across threads. Operations on one account are
//! serialized; transfers lock both accounts in id order and are atomic.

mod account;
mod base;
pub mod error;
mod ledger;
mod session;
mod transaction;

pub use account::AccountSnapshot;
pub use base::{AccountId, Pin};
pub use error::LedgerError;
pub use ledger::{Ledger, TransferReceipt};
pub use session::Session;
pub use transaction::{Transaction, TransactionKind};
