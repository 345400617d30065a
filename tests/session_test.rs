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

//! Login and session integration tests.

use atm_ledger::{AccountId, Ledger, LedgerError, Pin, TransactionKind};
use rust_decimal_macros::dec;

#[test]
fn login_with_correct_pin() {
    let ledger = Ledger::with_demo_account();
    let session = ledger.login(AccountId(1001), Pin(1234)).unwrap();

    assert_eq!(session.account_id(), AccountId(1001));
    assert_eq!(session.balance(), Ok(dec!(1000.00)));
}

#[test]
fn login_with_wrong_pin_or_unknown_id() {
    let ledger = Ledger::with_demo_account();
    assert!(ledger.login(AccountId(1001), Pin(1111)).is_none());
    assert!(ledger.login(AccountId(1002), Pin(1234)).is_none());
}

#[test]
fn session_operations_act_on_own_account() {
    let ledger = Ledger::with_demo_account();
    ledger.register(AccountId(1002), Pin(4321), dec!(0)).unwrap();
    let session = ledger.login(AccountId(1001), Pin(1234)).unwrap();

    assert_eq!(session.withdraw(dec!(200.00)), Ok(dec!(800.00)));
    assert_eq!(session.deposit(dec!(50.00)), Ok(dec!(850.00)));
    let receipt = session.transfer_to(AccountId(1002), dec!(100.00)).unwrap();
    assert_eq!(receipt.from, AccountId(1001));
    assert_eq!(receipt.to, AccountId(1002));

    let history = session.history().unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[2].kind(), TransactionKind::TransferTo(AccountId(1002)));
    assert_eq!(session.account().unwrap().transactions, 3);
}

#[test]
fn session_still_validates() {
    let ledger = Ledger::with_demo_account();
    let session = ledger.login(AccountId(1001), Pin(1234)).unwrap();

    assert_eq!(session.withdraw(dec!(1000.01)), Err(LedgerError::InsufficientFunds));
    assert_eq!(session.deposit(dec!(0)), Err(LedgerError::InvalidAmount));
    assert_eq!(
        session.transfer_to(AccountId(1001), dec!(1)),
        Err(LedgerError::SelfTransfer)
    );
    assert_eq!(
        session.transfer_to(AccountId(1003), dec!(1)),
        Err(LedgerError::AccountNotFound)
    );
    assert_eq!(session.balance(), Ok(dec!(1000.00)));
}

#[test]
fn session_sees_changes_made_elsewhere() {
    let ledger = Ledger::with_demo_account();
    let session = ledger.login(AccountId(1001), Pin(1234)).unwrap();

    ledger.deposit(AccountId(1001), dec!(5)).unwrap();
    assert_eq!(session.balance(), Ok(dec!(1005.00)));
}
