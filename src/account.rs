use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::identity::CustomerId;

pub type AccountId = u64;

/// Withdrawal or transfer amount exceeds the account's current balance.
/// Carries the balance so callers can show what is actually available.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("insufficient funds: available balance is {available}")]
pub struct InsufficientFunds {
    pub available: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Active,
    Frozen,
    Closed,
}

impl AccountStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Frozen => "FROZEN",
            AccountStatus::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub customer_id: CustomerId,
    /// Unique human-facing identifier, distinct from `id`.
    pub number: String,
    /// Free-form label ("Checking", "Savings", ...); carries no behavior.
    pub account_type: String,
    pub balance: Decimal,
    pub opened_at: DateTime<Utc>,
    pub status: AccountStatus,
}

/// Input for account creation. The store assigns the id and opening time
/// and materializes the record with a zero balance and `Active` status.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub customer_id: CustomerId,
    pub number: String,
    pub account_type: String,
}

impl Account {
    /// Adds `amount` to the balance. Credits never consult `status`.
    pub fn credit(&mut self, amount: Decimal) {
        self.balance += amount;
    }

    /// Subtracts `amount` from the balance, refusing to let it go negative.
    /// The account is untouched when the debit is refused.
    pub fn debit(&mut self, amount: Decimal) -> Result<(), InsufficientFunds> {
        if self.balance < amount {
            return Err(InsufficientFunds {
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }
}
