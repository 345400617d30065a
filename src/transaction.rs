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

//! Transaction records.
//!
//! A [`Transaction`] is written once, when a posting succeeds, and is never
//! modified afterwards. A transfer produces two of them: a
//! [`TransferTo`](TransactionKind::TransferTo) debit on the sender and a
//! [`TransferFrom`](TransactionKind::TransferFrom) credit on the recipient.

use crate::base::AccountId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;

/// Decimal places used when amounts are rendered for people.
pub(crate) const DISPLAY_PRECISION: usize = 2;

/// Timestamp layout of the history listing.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders an amount the way a receipt shows it, e.g. `-200.00`.
pub(crate) fn display_amount(amount: Decimal) -> String {
    format!("{:.*}", DISPLAY_PRECISION, amount)
}

/// What caused a balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    /// Debit side of a transfer, naming the recipient.
    TransferTo(AccountId),
    /// Credit side of a transfer, naming the sender.
    TransferFrom(AccountId),
}

impl TransactionKind {
    /// Whether postings of this kind add to the balance.
    pub fn is_credit(&self) -> bool {
        matches!(self, Self::Deposit | Self::TransferFrom(_))
    }

    /// Whether this is one side of a transfer.
    pub fn is_transfer(&self) -> bool {
        matches!(self, Self::TransferTo(_) | Self::TransferFrom(_))
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposit => f.write_str("Deposit"),
            Self::Withdrawal => f.write_str("Withdrawal"),
            Self::TransferTo(recipient) => write!(f, "Transfer to {recipient}"),
            Self::TransferFrom(sender) => write!(f, "Transfer from {sender}"),
        }
    }
}

/// Immutable record of one balance change.
///
/// `amount` is signed: credits are positive, debits negative. `sequence` is
/// ledger-wide and strictly increasing, so it orders records even when two
/// timestamps are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    sequence: u64,
    kind: TransactionKind,
    amount: Decimal,
    timestamp: DateTime<Utc>,
}

impl Transaction {
    pub(crate) fn new(sequence: u64, kind: TransactionKind, amount: Decimal) -> Self {
        Self {
            sequence,
            kind,
            amount,
            timestamp: Utc::now(),
        }
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Serialize for Transaction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Transaction", 4)?;
        state.serialize_field("sequence", &self.sequence)?;
        state.serialize_field("date", &self.timestamp.format(DATE_FORMAT).to_string())?;
        state.serialize_field("type", &self.kind.to_string())?;
        state.serialize_field("amount", &display_amount(self.amount))?;
        state.end()
    }
}
