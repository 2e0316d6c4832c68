use std::{
    collections::{BTreeMap, HashMap},
    sync::{Mutex, MutexGuard},
};

use chrono::Utc;
use rust_decimal::Decimal;

use crate::{
    account::{Account, AccountId, AccountStatus, NewAccount},
    identity::{Customer, CustomerId, Employee, EmployeeId, NewCustomer, NewEmployee},
    transaction::{NewTransaction, Transaction, TransactionId},
};

use super::{
    AccountStore, CustomerStore, EmployeeStore, LedgerStore, LedgerWrite, StorageError,
    TransactionStore,
};

/// Every store capability over one in-process mutex. Ids are assigned
/// per entity kind, starting at 1; transactions sit in a `BTreeMap` so
/// iteration order is append order.
#[derive(Default)]
pub struct InMemoryBank {
    state: Mutex<BankState>,
}

#[derive(Default)]
struct BankState {
    customers: HashMap<CustomerId, Customer>,
    employees: HashMap<EmployeeId, Employee>,
    accounts: HashMap<AccountId, Account>,
    transactions: BTreeMap<TransactionId, Transaction>,
    last_customer_id: CustomerId,
    last_employee_id: EmployeeId,
    last_account_id: AccountId,
    last_transaction_id: TransactionId,
}

impl BankState {
    fn append(&mut self, entry: NewTransaction) -> Transaction {
        self.last_transaction_id += 1;
        let transaction = Transaction {
            id: self.last_transaction_id,
            source_account_id: entry.source_account_id,
            destination_account_id: entry.destination_account_id,
            kind: entry.kind,
            amount: entry.amount,
            timestamp: Utc::now(),
            description: entry.description,
        };
        self.transactions
            .insert(transaction.id, transaction.clone());
        transaction
    }
}

impl InMemoryBank {
    fn state(&self) -> Result<MutexGuard<'_, BankState>, StorageError> {
        self.state.lock().map_err(|_| StorageError::Poisoned)
    }
}

impl CustomerStore for InMemoryBank {
    fn create_customer(&self, new: NewCustomer) -> Result<Customer, StorageError> {
        let mut state = self.state()?;
        if state.customers.values().any(|c| c.username == new.username) {
            return Err(StorageError::Duplicate {
                entity: "customer",
                field: "username",
                value: new.username,
            });
        }
        state.last_customer_id += 1;
        let customer = Customer {
            id: state.last_customer_id,
            first_name: new.first_name,
            last_name: new.last_name,
            username: new.username,
            password_hash: new.password_hash,
            created_at: Utc::now(),
        };
        state.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    fn customer_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StorageError> {
        Ok(self.state()?.customers.get(&id).cloned())
    }

    fn customer_by_username(&self, username: &str) -> Result<Option<Customer>, StorageError> {
        Ok(self
            .state()?
            .customers
            .values()
            .find(|c| c.username == username)
            .cloned())
    }

    fn all_customers(&self) -> Result<Vec<Customer>, StorageError> {
        let mut customers: Vec<_> = self.state()?.customers.values().cloned().collect();
        customers.sort_by_key(|c| c.id);
        Ok(customers)
    }

    fn update_customer(&self, customer: &Customer) -> Result<bool, StorageError> {
        let mut state = self.state()?;
        let taken = state
            .customers
            .values()
            .any(|c| c.id != customer.id && c.username == customer.username);
        if taken {
            return Err(StorageError::Duplicate {
                entity: "customer",
                field: "username",
                value: customer.username.clone(),
            });
        }
        match state.customers.get_mut(&customer.id) {
            Some(row) => {
                *row = customer.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_customer(&self, id: CustomerId) -> Result<bool, StorageError> {
        Ok(self.state()?.customers.remove(&id).is_some())
    }
}

impl EmployeeStore for InMemoryBank {
    fn create_employee(&self, new: NewEmployee) -> Result<Employee, StorageError> {
        let mut state = self.state()?;
        if state.employees.values().any(|e| e.username == new.username) {
            return Err(StorageError::Duplicate {
                entity: "employee",
                field: "username",
                value: new.username,
            });
        }
        state.last_employee_id += 1;
        let employee = Employee {
            id: state.last_employee_id,
            first_name: new.first_name,
            last_name: new.last_name,
            username: new.username,
            password_hash: new.password_hash,
            role: new.role,
            hired_at: Utc::now(),
        };
        state.employees.insert(employee.id, employee.clone());
        Ok(employee)
    }

    fn employee_by_id(&self, id: EmployeeId) -> Result<Option<Employee>, StorageError> {
        Ok(self.state()?.employees.get(&id).cloned())
    }

    fn employee_by_username(&self, username: &str) -> Result<Option<Employee>, StorageError> {
        Ok(self
            .state()?
            .employees
            .values()
            .find(|e| e.username == username)
            .cloned())
    }
}

impl AccountStore for InMemoryBank {
    fn create_account(&self, new: NewAccount) -> Result<Account, StorageError> {
        let mut state = self.state()?;
        if state.accounts.values().any(|a| a.number == new.number) {
            return Err(StorageError::Duplicate {
                entity: "account",
                field: "number",
                value: new.number,
            });
        }
        state.last_account_id += 1;
        let account = Account {
            id: state.last_account_id,
            customer_id: new.customer_id,
            number: new.number,
            account_type: new.account_type,
            balance: Decimal::ZERO,
            opened_at: Utc::now(),
            status: AccountStatus::Active,
        };
        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    fn account_by_id(&self, id: AccountId) -> Result<Option<Account>, StorageError> {
        Ok(self.state()?.accounts.get(&id).cloned())
    }

    fn account_by_number(&self, number: &str) -> Result<Option<Account>, StorageError> {
        Ok(self
            .state()?
            .accounts
            .values()
            .find(|a| a.number == number)
            .cloned())
    }

    fn accounts_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Account>, StorageError> {
        let mut accounts: Vec<_> = self
            .state()?
            .accounts
            .values()
            .filter(|a| a.customer_id == customer_id)
            .cloned()
            .collect();
        accounts.sort_by_key(|a| a.id);
        Ok(accounts)
    }

    fn all_accounts(&self) -> Result<Vec<Account>, StorageError> {
        let mut accounts: Vec<_> = self.state()?.accounts.values().cloned().collect();
        accounts.sort_by_key(|a| a.id);
        Ok(accounts)
    }

    fn update_account(&self, account: &Account) -> Result<bool, StorageError> {
        let mut state = self.state()?;
        match state.accounts.get_mut(&account.id) {
            Some(row) => {
                *row = account.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl TransactionStore for InMemoryBank {
    fn append_transaction(&self, entry: NewTransaction) -> Result<Transaction, StorageError> {
        Ok(self.state()?.append(entry))
    }

    fn transactions_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, StorageError> {
        Ok(self
            .state()?
            .transactions
            .values()
            .filter(|tx| tx.involves(account_id))
            .cloned()
            .collect())
    }

    fn transactions_between(
        &self,
        a: AccountId,
        b: AccountId,
    ) -> Result<Vec<Transaction>, StorageError> {
        Ok(self
            .state()?
            .transactions
            .values()
            .filter(|tx| {
                (tx.source_account_id == Some(a) && tx.destination_account_id == Some(b))
                    || (tx.source_account_id == Some(b) && tx.destination_account_id == Some(a))
            })
            .cloned()
            .collect())
    }

    fn all_transactions(&self) -> Result<Vec<Transaction>, StorageError> {
        Ok(self.state()?.transactions.values().cloned().collect())
    }
}

impl LedgerStore for InMemoryBank {
    fn commit(&self, write: LedgerWrite) -> Result<Transaction, StorageError> {
        let mut state = self.state()?;
        // every target row must exist before any is overwritten
        for account in &write.accounts {
            if !state.accounts.contains_key(&account.id) {
                return Err(StorageError::UnknownAccount(account.id));
            }
        }
        for account in write.accounts {
            state.accounts.insert(account.id, account);
        }
        Ok(state.append(write.entry))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::prelude::FromPrimitive;

    use crate::transaction::TransactionKind;

    use super::*;

    fn new_customer(username: &str) -> NewCustomer {
        NewCustomer {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            username: username.to_string(),
            password_hash: "irrelevant".to_string(),
        }
    }

    fn new_account(customer_id: CustomerId, number: &str) -> NewAccount {
        NewAccount {
            customer_id,
            number: number.to_string(),
            account_type: "Checking".to_string(),
        }
    }

    fn amount(value: u32) -> Decimal {
        Decimal::from_u32(value).unwrap()
    }

    #[test]
    fn ids_start_at_one_and_increment() {
        let bank = InMemoryBank::default();
        let first = bank.create_customer(new_customer("ada")).unwrap();
        let second = bank.create_customer(new_customer("grace")).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let bank = InMemoryBank::default();
        bank.create_customer(new_customer("ada")).unwrap();
        let err = bank.create_customer(new_customer("ada")).unwrap_err();
        assert_eq!(
            err,
            StorageError::Duplicate {
                entity: "customer",
                field: "username",
                value: "ada".to_string(),
            }
        );
    }

    #[test]
    fn update_cannot_steal_a_username() {
        let bank = InMemoryBank::default();
        bank.create_customer(new_customer("ada")).unwrap();
        let mut grace = bank.create_customer(new_customer("grace")).unwrap();
        grace.username = "ada".to_string();
        assert!(matches!(
            bank.update_customer(&grace),
            Err(StorageError::Duplicate { .. })
        ));
    }

    #[test]
    fn employees_keep_their_own_username_namespace() {
        let bank = InMemoryBank::default();
        bank.create_customer(new_customer("ada")).unwrap();
        let employed = bank
            .create_employee(NewEmployee {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                username: "ada".to_string(),
                password_hash: "irrelevant".to_string(),
                role: "Teller".to_string(),
            })
            .unwrap();

        assert_eq!(employed.id, 1);
        assert_eq!(bank.employee_by_id(employed.id).unwrap(), Some(employed.clone()));
        assert_eq!(bank.employee_by_username("ada").unwrap(), Some(employed));

        let duplicate = bank.create_employee(NewEmployee {
            first_name: "Adam".to_string(),
            last_name: "Smith".to_string(),
            username: "ada".to_string(),
            password_hash: "irrelevant".to_string(),
            role: "Manager".to_string(),
        });
        assert!(matches!(duplicate, Err(StorageError::Duplicate { .. })));
    }

    #[test]
    fn created_account_is_active_with_zero_balance() {
        let bank = InMemoryBank::default();
        let account = bank.create_account(new_account(1, "ACC123")).unwrap();
        assert_eq!(account.id, 1);
        assert_eq!(account.balance, Decimal::ZERO);
        assert_eq!(account.status, AccountStatus::Active);
        assert_eq!(bank.account_by_number("ACC123").unwrap(), Some(account));
    }

    #[test]
    fn duplicate_account_number_is_rejected() {
        let bank = InMemoryBank::default();
        bank.create_account(new_account(1, "ACC123")).unwrap();
        let err = bank.create_account(new_account(2, "ACC123")).unwrap_err();
        assert_eq!(
            err,
            StorageError::Duplicate {
                entity: "account",
                field: "number",
                value: "ACC123".to_string(),
            }
        );
    }

    #[test]
    fn update_of_missing_account_reports_false() {
        let bank = InMemoryBank::default();
        let mut account = bank.create_account(new_account(1, "ACC123")).unwrap();
        account.id = 42;
        assert_eq!(bank.update_account(&account), Ok(false));
    }

    #[test]
    fn deleting_a_customer_leaves_their_accounts() {
        let bank = InMemoryBank::default();
        let customer = bank.create_customer(new_customer("ada")).unwrap();
        bank.create_account(new_account(customer.id, "ACC123"))
            .unwrap();
        assert_eq!(bank.delete_customer(customer.id), Ok(true));
        assert_eq!(bank.delete_customer(customer.id), Ok(false));
        assert_eq!(bank.accounts_by_customer(customer.id).unwrap().len(), 1);
    }

    #[test]
    fn ledger_keeps_append_order() {
        let bank = InMemoryBank::default();
        for value in [5, 10, 15] {
            bank.append_transaction(NewTransaction::deposit(1, amount(value), ""))
                .unwrap();
        }
        let ids: Vec<_> = bank
            .all_transactions()
            .unwrap()
            .iter()
            .map(|tx| tx.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn history_matches_either_leg() {
        let bank = InMemoryBank::default();
        bank.append_transaction(NewTransaction::deposit(1, amount(10), ""))
            .unwrap();
        bank.append_transaction(NewTransaction::transfer(1, 2, amount(3), ""))
            .unwrap();
        bank.append_transaction(NewTransaction::withdrawal(3, amount(1), ""))
            .unwrap();

        let first = bank.transactions_for_account(1).unwrap();
        assert_eq!(first.len(), 2);
        let second = bank.transactions_for_account(2).unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].kind, TransactionKind::Transfer);
    }

    #[test]
    fn transactions_between_ignores_direction() {
        let bank = InMemoryBank::default();
        bank.append_transaction(NewTransaction::transfer(1, 2, amount(3), ""))
            .unwrap();
        bank.append_transaction(NewTransaction::transfer(2, 1, amount(4), ""))
            .unwrap();
        bank.append_transaction(NewTransaction::transfer(1, 3, amount(5), ""))
            .unwrap();
        assert_eq!(bank.transactions_between(1, 2).unwrap().len(), 2);
        assert_eq!(bank.transactions_between(2, 1).unwrap().len(), 2);
        assert_eq!(bank.transactions_between(2, 3).unwrap().len(), 0);
    }

    #[test]
    fn commit_applies_rewrites_and_appends_atomically() {
        let bank = InMemoryBank::default();
        let mut source = bank.create_account(new_account(1, "ACC1")).unwrap();
        let mut destination = bank.create_account(new_account(2, "ACC2")).unwrap();
        source.balance = amount(7);
        destination.balance = amount(3);

        let entry = bank
            .commit(LedgerWrite {
                accounts: vec![source.clone(), destination.clone()],
                entry: NewTransaction::transfer(source.id, destination.id, amount(3), ""),
            })
            .unwrap();

        assert_eq!(entry.id, 1);
        assert_eq!(bank.account_by_id(source.id).unwrap().unwrap().balance, amount(7));
        assert_eq!(
            bank.account_by_id(destination.id).unwrap().unwrap().balance,
            amount(3)
        );
        assert_eq!(bank.all_transactions().unwrap().len(), 1);
    }

    #[test]
    fn failed_commit_changes_nothing() {
        let bank = InMemoryBank::default();
        let mut account = bank.create_account(new_account(1, "ACC1")).unwrap();
        account.balance = amount(7);
        let mut missing = account.clone();
        missing.id = 42;

        let err = bank
            .commit(LedgerWrite {
                accounts: vec![account.clone(), missing],
                entry: NewTransaction::transfer(account.id, 42, amount(3), ""),
            })
            .unwrap_err();

        assert_eq!(err, StorageError::UnknownAccount(42));
        assert_eq!(
            bank.account_by_id(account.id).unwrap().unwrap().balance,
            Decimal::ZERO
        );
        assert!(bank.all_transactions().unwrap().is_empty());
    }

    #[test]
    fn poisoned_lock_surfaces_as_storage_error() {
        let bank = Arc::new(InMemoryBank::default());
        let writer = Arc::clone(&bank);
        let _ = std::thread::spawn(move || {
            let _guard = writer.state.lock().unwrap();
            panic!("writer dies holding the lock");
        })
        .join();
        assert_eq!(bank.all_customers(), Err(StorageError::Poisoned));
    }
}
