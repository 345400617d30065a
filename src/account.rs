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

//! Account management.
//!
//! An [`Account`] owns its balance, its PIN and its own transaction log
//! behind a single lock, so a balance change and the record describing it
//! are always observed together. Accounts never leave the ledger; callers
//! see them through [`AccountSnapshot`].

use crate::LedgerError;
use crate::base::{AccountId, Pin};
use crate::transaction::{Transaction, TransactionKind, display_amount};
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};

#[derive(Debug)]
pub(crate) struct AccountData {
    id: AccountId,
    pin: Pin,
    balance: Decimal,
    /// Postings in the order they were applied.
    history: Vec<Transaction>,
}

impl AccountData {
    fn new(id: AccountId, pin: Pin, balance: Decimal) -> Self {
        Self {
            id,
            pin,
            balance,
            history: Vec::new(),
        }
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.balance >= Decimal::ZERO,
            "Invariant violated: balance of {} went negative: {}",
            self.id,
            self.balance
        );
        debug_assert!(
            self.history
                .windows(2)
                .all(|pair| pair[0].sequence() < pair[1].sequence()),
            "Invariant violated: history of {} is out of order",
            self.id
        );
    }

    /// Returns the balance a signed posting of `amount` would leave.
    ///
    /// The sign must match the kind: credits positive, debits negative.
    /// Zero postings are rejected, as is anything that would overdraw.
    pub(crate) fn check_posting(
        &self,
        kind: TransactionKind,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        if amount.is_zero() || amount.is_sign_positive() != kind.is_credit() {
            return Err(LedgerError::InvalidAmount);
        }
        let new_balance = self
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::InvalidAmount)?;
        if new_balance < Decimal::ZERO {
            return Err(LedgerError::InsufficientFunds);
        }
        Ok(new_balance)
    }

    /// Applies a posting previously validated with [`check_posting`](Self::check_posting).
    pub(crate) fn commit(&mut self, transaction: Transaction) -> Decimal {
        self.balance += transaction.amount();
        self.history.push(transaction);
        self.assert_invariants();
        self.balance
    }

    fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot {
            id: self.id,
            balance: self.balance,
            transactions: self.history.len(),
        }
    }
}

/// Ledger account.
#[derive(Debug)]
pub(crate) struct Account {
    inner: Mutex<AccountData>,
}

impl Account {
    /// Opens an account with the given opening balance and an empty history.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidAmount`] if `opening_balance` is negative.
    pub(crate) fn open(
        id: AccountId,
        pin: Pin,
        opening_balance: Decimal,
    ) -> Result<Self, LedgerError> {
        if opening_balance < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        Ok(Self {
            inner: Mutex::new(AccountData::new(id, pin, opening_balance)),
        })
    }

    /// Plain equality against the stored PIN.
    pub(crate) fn verify_pin(&self, pin: Pin) -> bool {
        self.inner.lock().pin == pin
    }

    /// Copy of the transaction log, earliest first.
    pub(crate) fn history(&self) -> Vec<Transaction> {
        self.inner.lock().history.clone()
    }

    /// Point-in-time view of the account.
    pub(crate) fn snapshot(&self) -> AccountSnapshot {
        self.inner.lock().snapshot()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, AccountData> {
        self.inner.lock()
    }
}

/// Immutable view of an account at one moment.
///
/// Every successful mutation yields a fresh snapshot; holding one never
/// blocks the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub id: AccountId,
    pub balance: Decimal,
    /// Number of entries in the account's history.
    pub transactions: usize,
}

impl Serialize for AccountSnapshot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("AccountSnapshot", 3)?;
        state.serialize_field("account", &self.id)?;
        state.serialize_field("balance", &display_amount(self.balance))?;
        state.serialize_field("transactions", &self.transactions)?;
        state.end()
    }
}
