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

//! Error types for ledger operations.

use thiserror::Error;

/// Ledger operation errors.
///
/// Every variant is recoverable: the ledger is left untouched and the caller
/// may retry with corrected input. A wrong PIN is not an error; see
/// [`Ledger::authenticate`](crate::Ledger::authenticate).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Registration used an id that is already taken
    #[error("account already exists")]
    AccountAlreadyExists,

    /// Operation referenced an unregistered id
    #[error("account not found")]
    AccountNotFound,

    /// Amount is zero or negative where a positive value is required,
    /// or an initial deposit is negative
    #[error("invalid amount")]
    InvalidAmount,

    /// Debit would take the balance below zero
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Transfer source and destination are the same account
    #[error("cannot transfer to the same account")]
    SelfTransfer,

    /// Transfer postings can only be written by a transfer
    #[error("transfer postings must go through transfer")]
    TransferPosting,
}

#[cfg(test)]
mod tests {
    use super::LedgerError;

    #[test]
    fn error_display_messages() {
        assert_eq!(
            LedgerError::AccountAlreadyExists.to_string(),
            "account already exists"
        );
        assert_eq!(LedgerError::AccountNotFound.to_string(), "account not found");
        assert_eq!(LedgerError::InvalidAmount.to_string(), "invalid amount");
        assert_eq!(
            LedgerError::InsufficientFunds.to_string(),
            "insufficient funds"
        );
        assert_eq!(
            LedgerError::SelfTransfer.to_string(),
            "cannot transfer to the same account"
        );
        assert_eq!(
            LedgerError::TransferPosting.to_string(),
            "transfer postings must go through transfer"
        );
    }

    #[test]
    fn errors_are_cloneable() {
        let error = LedgerError::InsufficientFunds;
        let cloned = error.clone();
        assert_eq!(error, cloned);
    }
}
