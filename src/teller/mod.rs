//! Batch teller: reads an operation script, drives the services over a
//! fresh in-memory bank, then prints a closing statement per account.

use std::{
    collections::{BTreeMap, HashMap},
    io::{Read, Write},
    sync::Arc,
};

use anyhow::Result;
use csv::StringRecord;
use thiserror::Error;

use crate::{
    account::{Account, AccountId},
    services::{AccountService, AuthError, AuthenticationService, CustomerService, LedgerError},
    store::{StorageError, memory::InMemoryBank},
};

use ops::{OpsReader, TellerOp};
use statement::{StatementRow, print_statements};

pub mod ops;
pub mod statement;

#[derive(Debug, Error, PartialEq)]
pub enum TellerError {
    #[error("unknown operation `{0}`")]
    UnknownOp(String),
    #[error("{op}: missing {field}")]
    MissingField {
        op: &'static str,
        field: &'static str,
    },
    #[error("invalid amount `{0}`")]
    InvalidAmount(String),
    #[error("no customer with username `{0}`")]
    UnknownCustomer(String),
    #[error("no account bound to alias `{0}`")]
    UnknownAlias(String),
    #[error("alias `{0}` is already bound")]
    DuplicateAlias(String),
    #[error("transfer source and destination are the same account")]
    SelfTransfer,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct Teller<'w, R, W: 'w> {
    pub input: R,
    pub output: &'w mut W,
    pub error_printer: Box<dyn FnMut(u64, TellerError)>,
}

impl<'w, R, W> Teller<'w, R, W>
where
    R: Read,
    W: Write + 'w,
{
    pub fn run(mut self) -> Result<()> {
        let bank = Arc::new(InMemoryBank::default());
        let auth = AuthenticationService::new(bank.clone(), bank.clone());
        let customers = CustomerService::new(bank.clone());
        let accounts = AccountService::new(bank);

        let mut session = Session {
            auth: &auth,
            customers: &customers,
            accounts: &accounts,
            aliases: BTreeMap::new(),
        };

        for (line, record) in OpsReader::new(self.input) {
            if let Err(err) = session.apply(&record) {
                (self.error_printer)(line, err);
            }
        }

        print_statements(self.output, session.statements()?.into_iter())
    }
}

/// State of one script run: the wired services plus the alias bindings
/// made so far.
struct Session<'a> {
    auth: &'a AuthenticationService,
    customers: &'a CustomerService,
    accounts: &'a AccountService,
    aliases: BTreeMap<String, AccountId>,
}

impl Session<'_> {
    fn apply(&mut self, record: &StringRecord) -> Result<(), TellerError> {
        match TellerOp::parse(record)? {
            TellerOp::Register {
                first_name,
                last_name,
                username,
                password,
            } => {
                self.auth
                    .register_customer(&first_name, &last_name, &username, &password)?;
            }
            TellerOp::Open {
                username,
                account_type,
                alias,
            } => {
                if self.aliases.contains_key(&alias) {
                    return Err(TellerError::DuplicateAlias(alias));
                }
                let Some(customer) = self.customers.customer_by_username(&username)? else {
                    return Err(TellerError::UnknownCustomer(username));
                };
                let account = self.accounts.open_account(customer.id, &account_type)?;
                self.aliases.insert(alias, account.id);
            }
            TellerOp::Deposit {
                alias,
                amount,
                description,
            } => {
                let account_id = self.resolve(&alias)?;
                self.accounts.deposit(account_id, amount, &description)?;
            }
            TellerOp::Withdraw {
                alias,
                amount,
                description,
            } => {
                let account_id = self.resolve(&alias)?;
                self.accounts.withdraw(account_id, amount, &description)?;
            }
            TellerOp::Transfer {
                from,
                to,
                amount,
                description,
            } => {
                let source = self.resolve(&from)?;
                let destination = self.resolve(&to)?;
                // the ledger itself accepts this; a scripted teller treats
                // it as a mistake
                if source == destination {
                    return Err(TellerError::SelfTransfer);
                }
                self.accounts
                    .transfer(source, destination, amount, &description)?;
            }
            TellerOp::Freeze { alias } => {
                let account_id = self.resolve(&alias)?;
                self.accounts.freeze_account(account_id)?;
            }
            TellerOp::Close { alias } => {
                let account_id = self.resolve(&alias)?;
                self.accounts.close_account(account_id)?;
            }
        }
        Ok(())
    }

    fn resolve(&self, alias: &str) -> Result<AccountId, TellerError> {
        match self.aliases.get(alias) {
            Some(id) => Ok(*id),
            None => Err(TellerError::UnknownAlias(alias.to_string())),
        }
    }

    /// One row per bound alias, in alias order.
    fn statements(&self) -> Result<Vec<StatementRow>, TellerError> {
        let accounts: HashMap<AccountId, Account> = self
            .accounts
            .all_accounts()?
            .into_iter()
            .map(|account| (account.id, account))
            .collect();

        let mut rows = Vec::new();
        for (alias, account_id) in &self.aliases {
            let Some(account) = accounts.get(account_id) else {
                continue;
            };
            let owner = match self.customers.customer_by_id(account.customer_id)? {
                Some(customer) => customer.username,
                None => String::new(),
            };
            rows.push(StatementRow {
                alias: alias.clone(),
                owner,
                account_type: account.account_type.clone(),
                balance: account.balance,
                status: account.status.as_str(),
            });
        }
        Ok(rows)
    }
}
