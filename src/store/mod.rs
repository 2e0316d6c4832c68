use std::sync::Arc;

use thiserror::Error;

use crate::{
    account::{Account, AccountId, NewAccount},
    identity::{Customer, CustomerId, Employee, EmployeeId, NewCustomer, NewEmployee},
    transaction::{NewTransaction, Transaction},
};

pub mod memory;

#[derive(Debug, Error, PartialEq)]
pub enum StorageError {
    #[error("store lock poisoned by a writer panic")]
    Poisoned,
    #[error("{entity} with {field} `{value}` already exists")]
    Duplicate {
        entity: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("account {0} does not exist")]
    UnknownAccount(AccountId),
}

pub trait CustomerStore {
    /// Assigns the id and creation time; usernames are unique.
    fn create_customer(&self, new: NewCustomer) -> Result<Customer, StorageError>;
    fn customer_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StorageError>;
    fn customer_by_username(&self, username: &str) -> Result<Option<Customer>, StorageError>;
    fn all_customers(&self) -> Result<Vec<Customer>, StorageError>;
    /// Full-record overwrite; `false` when the row no longer exists.
    fn update_customer(&self, customer: &Customer) -> Result<bool, StorageError>;
    /// Removes the customer record only; their accounts stay in place.
    fn delete_customer(&self, id: CustomerId) -> Result<bool, StorageError>;
}

pub trait EmployeeStore {
    /// Assigns the id and hire time; usernames are unique.
    fn create_employee(&self, new: NewEmployee) -> Result<Employee, StorageError>;
    fn employee_by_id(&self, id: EmployeeId) -> Result<Option<Employee>, StorageError>;
    fn employee_by_username(&self, username: &str) -> Result<Option<Employee>, StorageError>;
}

pub trait AccountStore {
    /// Assigns the id and opening time and materializes the record active
    /// with a zero balance; account numbers are unique.
    fn create_account(&self, new: NewAccount) -> Result<Account, StorageError>;
    fn account_by_id(&self, id: AccountId) -> Result<Option<Account>, StorageError>;
    fn account_by_number(&self, number: &str) -> Result<Option<Account>, StorageError>;
    fn accounts_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Account>, StorageError>;
    fn all_accounts(&self) -> Result<Vec<Account>, StorageError>;
    /// Full-record overwrite; `false` when the row no longer exists.
    fn update_account(&self, account: &Account) -> Result<bool, StorageError>;
}

pub trait TransactionStore {
    /// Assigns the id and timestamp and appends the entry to the ledger.
    fn append_transaction(&self, entry: NewTransaction) -> Result<Transaction, StorageError>;
    /// Entries where the account is either leg, in append order.
    fn transactions_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, StorageError>;
    /// Entries moving money between the pair, in either direction.
    fn transactions_between(
        &self,
        a: AccountId,
        b: AccountId,
    ) -> Result<Vec<Transaction>, StorageError>;
    fn all_transactions(&self) -> Result<Vec<Transaction>, StorageError>;
}

/// Write set of one balance mutation: every rewritten account row plus the
/// ledger entry describing the movement.
#[derive(Debug, Clone)]
pub struct LedgerWrite {
    pub accounts: Vec<Account>,
    pub entry: NewTransaction,
}

pub trait LedgerStore: AccountStore + TransactionStore {
    /// Applies the whole write set or none of it: fails with
    /// `UnknownAccount` before any row is touched when a rewrite targets a
    /// record that does not exist.
    fn commit(&self, write: LedgerWrite) -> Result<Transaction, StorageError>;
}

pub type SharedCustomerStore = Arc<dyn CustomerStore + Send + Sync>;
pub type SharedEmployeeStore = Arc<dyn EmployeeStore + Send + Sync>;
pub type SharedLedgerStore = Arc<dyn LedgerStore + Send + Sync>;
