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

//! Authenticated access to a single account.
//!
//! A [`Session`] can only be obtained through [`Ledger::login`], mirroring a
//! terminal where the menu appears after a successful PIN check. It carries
//! no state of its own; every call goes through the ledger and its
//! validation.

use crate::account::AccountSnapshot;
use crate::base::AccountId;
use crate::ledger::{Ledger, TransferReceipt};
use crate::transaction::Transaction;
use crate::LedgerError;
use rust_decimal::Decimal;

/// Handle to one logged-in account.
#[derive(Clone, Copy)]
pub struct Session<'a> {
    ledger: &'a Ledger,
    account_id: AccountId,
}

impl<'a> Session<'a> {
    pub(crate) fn new(ledger: &'a Ledger, account_id: AccountId) -> Self {
        Self { ledger, account_id }
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn account(&self) -> Result<AccountSnapshot, LedgerError> {
        self.ledger.get_account(self.account_id)
    }

    pub fn balance(&self) -> Result<Decimal, LedgerError> {
        Ok(self.account()?.balance)
    }

    pub fn deposit(&self, amount: Decimal) -> Result<Decimal, LedgerError> {
        self.ledger.deposit(self.account_id, amount)
    }

    pub fn withdraw(&self, amount: Decimal) -> Result<Decimal, LedgerError> {
        self.ledger.withdraw(self.account_id, amount)
    }

    pub fn transfer_to(
        &self,
        recipient: AccountId,
        amount: Decimal,
    ) -> Result<TransferReceipt, LedgerError> {
        self.ledger.transfer(self.account_id, recipient, amount)
    }

    pub fn history(&self) -> Result<Vec<Transaction>, LedgerError> {
        self.ledger.history(self.account_id)
    }
}
