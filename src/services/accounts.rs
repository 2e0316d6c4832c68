use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::{
    account::{Account, AccountId, AccountStatus, InsufficientFunds, NewAccount},
    identity::CustomerId,
    store::{LedgerWrite, SharedLedgerStore, StorageError},
    transaction::{NewTransaction, Transaction},
};

#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("amount must be positive, got {0}")]
    AmountNotPositive(Decimal),
    #[error("account {0} not found")]
    AccountNotFound(AccountId),
    #[error(transparent)]
    InsufficientFunds(#[from] InsufficientFunds),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// One mutex per account id. Mutating operations hold the lock of every
/// account they touch, so two writers on the same balance serialize
/// instead of losing an update.
#[derive(Default)]
struct AccountLocks {
    locks: Mutex<HashMap<AccountId, Arc<Mutex<()>>>>,
}

impl AccountLocks {
    fn lock_for(&self, id: AccountId) -> Result<Arc<Mutex<()>>, StorageError> {
        let mut locks = self.locks.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(Arc::clone(locks.entry(id).or_default()))
    }
}

/// Balance management: opening accounts, moving money, the append-only
/// transaction history, and status changes.
///
/// Every mutation persists through a single [`LedgerWrite`] commit, so the
/// rewritten balances and the ledger entry land together or not at all.
pub struct AccountService {
    store: SharedLedgerStore,
    locks: AccountLocks,
}

impl AccountService {
    pub fn new(store: SharedLedgerStore) -> Self {
        Self {
            store,
            locks: AccountLocks::default(),
        }
    }

    /// Opens an account with a generated number, a zero balance and
    /// `Active` status. The customer id is not validated here; callers
    /// decide whether it must exist.
    pub fn open_account(
        &self,
        customer_id: CustomerId,
        account_type: &str,
    ) -> Result<Account, LedgerError> {
        let account = self.store.create_account(NewAccount {
            customer_id,
            number: generate_account_number(),
            account_type: account_type.to_string(),
        })?;
        info!("opened account {} for customer {customer_id}", account.number);
        Ok(account)
    }

    pub fn accounts_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Account>, LedgerError> {
        Ok(self.store.accounts_by_customer(customer_id)?)
    }

    pub fn account_by_number(&self, number: &str) -> Result<Option<Account>, LedgerError> {
        Ok(self.store.account_by_number(number)?)
    }

    /// Credits the account and appends one `Deposit` entry. Deposits are
    /// accepted regardless of account status.
    pub fn deposit(
        &self,
        account_id: AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<Account, LedgerError> {
        ensure_positive(amount)?;
        let lock = self.locks.lock_for(account_id)?;
        let _guard = lock.lock().map_err(|_| StorageError::Poisoned)?;

        let Some(mut account) = self.store.account_by_id(account_id)? else {
            return Err(LedgerError::AccountNotFound(account_id));
        };
        account.credit(amount);
        self.store.commit(LedgerWrite {
            accounts: vec![account.clone()],
            entry: NewTransaction::deposit(account_id, amount, description),
        })?;
        info!("deposit of {amount} to account {account_id}");
        Ok(account)
    }

    /// Debits the account and appends one `Withdrawal` entry. Fails with
    /// `InsufficientFunds` before anything is written when the balance is
    /// short; account status is not checked.
    pub fn withdraw(
        &self,
        account_id: AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<Account, LedgerError> {
        ensure_positive(amount)?;
        let lock = self.locks.lock_for(account_id)?;
        let _guard = lock.lock().map_err(|_| StorageError::Poisoned)?;

        let Some(mut account) = self.store.account_by_id(account_id)? else {
            return Err(LedgerError::AccountNotFound(account_id));
        };
        account.debit(amount)?;
        self.store.commit(LedgerWrite {
            accounts: vec![account.clone()],
            entry: NewTransaction::withdrawal(account_id, amount, description),
        })?;
        info!("withdrawal of {amount} from account {account_id}");
        Ok(account)
    }

    /// Moves money between two accounts: both rewrites and one `Transfer`
    /// entry commit as a unit. Transfers to the same account are not
    /// rejected here; the write set applies in order, so such a call nets
    /// a credit. Callers that consider it an error must guard.
    pub fn transfer(
        &self,
        source_id: AccountId,
        destination_id: AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<(), LedgerError> {
        ensure_positive(amount)?;
        // both locks in ascending id order so crossing transfers cannot
        // deadlock; one acquisition when the ids are equal
        let (first, second) = if source_id <= destination_id {
            (source_id, destination_id)
        } else {
            (destination_id, source_id)
        };
        let first_lock = self.locks.lock_for(first)?;
        let second_lock = if first == second {
            None
        } else {
            Some(self.locks.lock_for(second)?)
        };
        let _first_guard = first_lock.lock().map_err(|_| StorageError::Poisoned)?;
        let _second_guard = match &second_lock {
            Some(lock) => Some(lock.lock().map_err(|_| StorageError::Poisoned)?),
            None => None,
        };

        let Some(mut source) = self.store.account_by_id(source_id)? else {
            return Err(LedgerError::AccountNotFound(source_id));
        };
        let Some(mut destination) = self.store.account_by_id(destination_id)? else {
            return Err(LedgerError::AccountNotFound(destination_id));
        };
        source.debit(amount)?;
        destination.credit(amount);
        self.store.commit(LedgerWrite {
            accounts: vec![source, destination],
            entry: NewTransaction::transfer(source_id, destination_id, amount, description),
        })?;
        info!("transfer of {amount} from account {source_id} to account {destination_id}");
        Ok(())
    }

    /// Entries where the account is either leg, oldest first.
    pub fn transaction_history(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self.store.transactions_for_account(account_id)?)
    }

    /// Marks the account frozen, whatever its current status. `Ok(false)`
    /// when no such account exists.
    pub fn freeze_account(&self, account_id: AccountId) -> Result<bool, LedgerError> {
        self.set_status(account_id, AccountStatus::Frozen)
    }

    /// Marks the account closed. The balance is not required to be zero.
    pub fn close_account(&self, account_id: AccountId) -> Result<bool, LedgerError> {
        self.set_status(account_id, AccountStatus::Closed)
    }

    pub fn all_accounts(&self) -> Result<Vec<Account>, LedgerError> {
        Ok(self.store.all_accounts()?)
    }

    pub fn all_transactions(&self) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self.store.all_transactions()?)
    }

    fn set_status(
        &self,
        account_id: AccountId,
        status: AccountStatus,
    ) -> Result<bool, LedgerError> {
        let lock = self.locks.lock_for(account_id)?;
        let _guard = lock.lock().map_err(|_| StorageError::Poisoned)?;

        let Some(mut account) = self.store.account_by_id(account_id)? else {
            return Ok(false);
        };
        account.status = status;
        let updated = self.store.update_account(&account)?;
        if updated {
            info!("account {account_id} is now {status}");
        }
        Ok(updated)
    }
}

fn ensure_positive(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::AmountNotPositive(amount));
    }
    Ok(())
}

/// "ACC" plus the first 12 hex characters of a fresh v4 uuid.
fn generate_account_number() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("ACC{}", id[..12].to_uppercase())
}
