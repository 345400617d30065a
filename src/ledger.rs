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

//! The account ledger.
//!
//! The [`Ledger`] is the sole owner of account state. Every operation
//! validates its input before touching an account, so a rejected call leaves
//! no trace.
//!
//! # Operations
//!
//! - **Register**: Opens an account with a PIN and opening balance.
//! - **Authenticate**: Compares a PIN with the stored one.
//! - **Deposit / Withdraw**: Credit or debit one account.
//! - **Transfer**: Debit one account and credit another as a single step.
//! - **History**: Lists an account's postings, earliest first.
//!
//! # Thread Safety
//!
//! Accounts live in a [`DashMap`] and each carries its own lock, so work on
//! different accounts runs in parallel while work on one account is
//! serialized. A transfer takes both account locks in ascending id order and
//! writes the debit and the credit before releasing either, so no reader ever
//! sees money that has left the sender without reaching the recipient.

use crate::account::{Account, AccountSnapshot};
use crate::base::{AccountId, Pin};
use crate::session::Session;
use crate::transaction::{Transaction, TransactionKind};
use crate::LedgerError;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Result of a completed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReceipt {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Decimal,
    /// Sender balance after the debit.
    pub from_balance: Decimal,
    /// Recipient balance after the credit.
    pub to_balance: Decimal,
}

/// In-memory ledger owning all accounts and their transaction logs.
///
/// # Invariants
///
/// - An id, once registered, maps to exactly one account for the ledger's lifetime.
/// - Balances never go negative.
/// - Each account's history is in posting order and only grows.
/// - A transfer conserves the sum of the two balances involved.
pub struct Ledger {
    /// Accounts indexed by id.
    accounts: DashMap<AccountId, Arc<Account>>,
    /// Next transaction sequence number.
    sequence: AtomicU64,
}

impl Ledger {
    /// Id, PIN and balance of the account a fresh terminal ships with.
    pub const DEMO_ACCOUNT: (AccountId, Pin, Decimal) = (AccountId(1001), Pin(1234), dec!(1000.00));

    /// Creates a ledger with no accounts.
    pub fn new() -> Self {
        Ledger {
            accounts: DashMap::new(),
            sequence: AtomicU64::new(1),
        }
    }

    /// Creates a ledger holding only the demo account.
    pub fn with_demo_account() -> Self {
        let ledger = Self::new();
        let (id, pin, balance) = Self::DEMO_ACCOUNT;
        let registered = ledger.register(id, pin, balance);
        debug_assert!(registered.is_ok(), "demo account rejected: {registered:?}");
        ledger
    }

    /// Registers a new account.
    ///
    /// The initial deposit becomes the opening balance; it is not recorded in
    /// the history.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] - `initial_deposit` is negative.
    /// - [`LedgerError::AccountAlreadyExists`] - `id` is taken; the existing
    ///   account is left as it was.
    pub fn register(
        &self,
        id: AccountId,
        pin: Pin,
        initial_deposit: Decimal,
    ) -> Result<AccountSnapshot, LedgerError> {
        let account = Account::open(id, pin, initial_deposit).inspect_err(|e| {
            warn!(account = %id, amount = %initial_deposit, error = %e, "registration rejected");
        })?;

        // Entry API keeps the check-and-insert atomic.
        match self.accounts.entry(id) {
            Entry::Occupied(_) => {
                warn!(account = %id, "registration rejected: id taken");
                Err(LedgerError::AccountAlreadyExists)
            }
            Entry::Vacant(entry) => {
                let snapshot = account.snapshot();
                entry.insert(Arc::new(account));
                debug!(account = %id, balance = %initial_deposit, "account registered");
                Ok(snapshot)
            }
        }
    }

    /// Returns `true` iff `id` is registered and `pin` matches its PIN.
    ///
    /// There is no lockout or attempt counting.
    pub fn authenticate(&self, id: AccountId, pin: Pin) -> bool {
        // Straight to the map: an unknown id is just a failed login.
        let authenticated = self
            .accounts
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .is_some_and(|account| account.verify_pin(pin));
        if !authenticated {
            warn!(account = %id, "authentication failed");
        }
        authenticated
    }

    /// Authenticates and returns a session bound to `id`.
    pub fn login(&self, id: AccountId, pin: Pin) -> Option<Session<'_>> {
        self.authenticate(id, pin).then(|| Session::new(self, id))
    }

    /// Point-in-time view of one account.
    pub fn get_account(&self, id: AccountId) -> Result<AccountSnapshot, LedgerError> {
        Ok(self.account(id)?.snapshot())
    }

    /// Posts a signed `amount` to `id` and returns the new balance.
    ///
    /// This is the primitive the higher-level operations are built on. It
    /// still refuses postings that would leave the ledger inconsistent.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::TransferPosting`] - `kind` is a transfer side; use
    ///   [`transfer`](Self::transfer) so both sides are written together.
    /// - [`LedgerError::AccountNotFound`] - `id` is not registered.
    /// - [`LedgerError::InvalidAmount`] - `amount` is zero, or its sign does
    ///   not match `kind` (deposits positive, withdrawals negative).
    /// - [`LedgerError::InsufficientFunds`] - the balance would go negative.
    pub fn apply_transaction(
        &self,
        id: AccountId,
        kind: TransactionKind,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        if kind.is_transfer() {
            warn!(account = %id, kind = %kind, "posting rejected: transfer kind");
            return Err(LedgerError::TransferPosting);
        }
        let account = self.account(id)?;
        let mut data = account.lock();
        let balance = data.check_posting(kind, amount).inspect_err(|e| {
            warn!(account = %id, kind = %kind, amount = %amount, error = %e, "posting rejected");
        })?;

        let balance_after = data.commit(Transaction::new(self.next_sequence(), kind, amount));
        debug_assert_eq!(balance, balance_after);
        debug!(account = %id, kind = %kind, amount = %amount, balance = %balance_after, "posted");
        Ok(balance_after)
    }

    /// Credits a positive `amount` to `id`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidAmount`] if `amount` is not positive, otherwise as
    /// [`apply_transaction`](Self::apply_transaction).
    pub fn deposit(&self, id: AccountId, amount: Decimal) -> Result<Decimal, LedgerError> {
        Self::require_positive(id, amount)?;
        self.apply_transaction(id, TransactionKind::Deposit, amount)
    }

    /// Debits a positive `amount` from `id`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidAmount`] if `amount` is not positive,
    /// [`LedgerError::InsufficientFunds`] if it exceeds the balance.
    pub fn withdraw(&self, id: AccountId, amount: Decimal) -> Result<Decimal, LedgerError> {
        Self::require_positive(id, amount)?;
        self.apply_transaction(id, TransactionKind::Withdrawal, -amount)
    }

    /// Moves `amount` from `from` to `to` as one step.
    ///
    /// # Errors
    ///
    /// Checked in this order, before anything is written:
    ///
    /// - [`LedgerError::SelfTransfer`] - `from == to`.
    /// - [`LedgerError::InvalidAmount`] - `amount` is not positive.
    /// - [`LedgerError::AccountNotFound`] - either account is missing.
    /// - [`LedgerError::InsufficientFunds`] - `amount` exceeds the sender's balance.
    pub fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    ) -> Result<TransferReceipt, LedgerError> {
        if from == to {
            warn!(account = %from, "transfer rejected: same account");
            return Err(LedgerError::SelfTransfer);
        }
        Self::require_positive(from, amount)?;

        // Clone the handles so no map shard stays locked while we wait on
        // account locks.
        let sender = self.account(from)?;
        let recipient = self.account(to)?;

        // Fixed global order: lower id first.
        let (mut sender_data, mut recipient_data) = if from < to {
            let s = sender.lock();
            let r = recipient.lock();
            (s, r)
        } else {
            let r = recipient.lock();
            let s = sender.lock();
            (s, r)
        };

        let rejected = |e: LedgerError| {
            warn!(from = %from, to = %to, amount = %amount, error = %e, "transfer rejected");
            e
        };
        sender_data
            .check_posting(TransactionKind::TransferTo(to), -amount)
            .map_err(rejected)?;
        recipient_data
            .check_posting(TransactionKind::TransferFrom(from), amount)
            .map_err(rejected)?;

        let from_balance = sender_data.commit(Transaction::new(
            self.next_sequence(),
            TransactionKind::TransferTo(to),
            -amount,
        ));
        let to_balance = recipient_data.commit(Transaction::new(
            self.next_sequence(),
            TransactionKind::TransferFrom(from),
            amount,
        ));

        debug!(from = %from, to = %to, amount = %amount, "transfer completed");
        Ok(TransferReceipt {
            from,
            to,
            amount,
            from_balance,
            to_balance,
        })
    }

    /// Transactions of `id`, earliest first.
    pub fn history(&self, id: AccountId) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self.account(id)?.history())
    }

    /// Snapshots of every account, ordered by id.
    pub fn accounts(&self) -> Vec<AccountSnapshot> {
        let handles: Vec<Arc<Account>> = self
            .accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        let mut snapshots: Vec<AccountSnapshot> =
            handles.iter().map(|account| account.snapshot()).collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// Number of registered accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn account(&self, id: AccountId) -> Result<Arc<Account>, LedgerError> {
        self.accounts
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| {
                warn!(account = %id, "account not found");
                LedgerError::AccountNotFound
            })
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }

    fn require_positive(id: AccountId, amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            warn!(account = %id, amount = %amount, "amount must be positive");
            return Err(LedgerError::InvalidAmount);
        }
        Ok(())
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let ledger = Ledger::new();
        let first = ledger.next_sequence();
        let second = ledger.next_sequence();
        assert!(second > first);
    }

    #[test]
    fn demo_account_matches_constant() {
        let ledger = Ledger::with_demo_account();
        let (id, pin, balance) = Ledger::DEMO_ACCOUNT;
        assert_eq!(ledger.len(), 1);
        assert!(ledger.authenticate(id, pin));
        assert_eq!(ledger.get_account(id).unwrap().balance, balance);
        assert!(ledger.history(id).unwrap().is_empty());
    }

    #[test]
    fn transfer_locks_in_either_direction() {
        let ledger = Ledger::new();
        ledger.register(AccountId(1), Pin(1), dec!(10)).unwrap();
        ledger.register(AccountId(2), Pin(2), dec!(10)).unwrap();

        ledger.transfer(AccountId(1), AccountId(2), dec!(3)).unwrap();
        ledger.transfer(AccountId(2), AccountId(1), dec!(5)).unwrap();

        assert_eq!(ledger.get_account(AccountId(1)).unwrap().balance, dec!(12));
        assert_eq!(ledger.get_account(AccountId(2)).unwrap().balance, dec!(8));
    }
}
