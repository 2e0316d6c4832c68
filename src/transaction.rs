use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::account::AccountId;

pub type TransactionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Transfer,
}

impl TransactionKind {
    /// Description recorded when the caller leaves it blank.
    fn default_description(self) -> &'static str {
        match self {
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Withdrawal => "Withdrawal",
            TransactionKind::Transfer => "Transfer",
        }
    }
}

/// A single money movement in the append-only ledger. Entries are never
/// mutated or deleted once written.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub source_account_id: Option<AccountId>,
    pub destination_account_id: Option<AccountId>,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

impl Transaction {
    /// Whether the account appears as source or destination of this entry.
    pub fn involves(&self, account_id: AccountId) -> bool {
        self.source_account_id == Some(account_id)
            || self.destination_account_id == Some(account_id)
    }
}

/// Ledger entry as submitted for append; the store assigns id and
/// timestamp. The constructors pin each kind to its leg shape: a deposit
/// carries a destination only, a withdrawal a source only, a transfer both.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub source_account_id: Option<AccountId>,
    pub destination_account_id: Option<AccountId>,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub description: String,
}

impl NewTransaction {
    pub fn deposit(destination: AccountId, amount: Decimal, description: &str) -> Self {
        Self {
            source_account_id: None,
            destination_account_id: Some(destination),
            kind: TransactionKind::Deposit,
            amount,
            description: described(description, TransactionKind::Deposit),
        }
    }

    pub fn withdrawal(source: AccountId, amount: Decimal, description: &str) -> Self {
        Self {
            source_account_id: Some(source),
            destination_account_id: None,
            kind: TransactionKind::Withdrawal,
            amount,
            description: described(description, TransactionKind::Withdrawal),
        }
    }

    pub fn transfer(
        source: AccountId,
        destination: AccountId,
        amount: Decimal,
        description: &str,
    ) -> Self {
        Self {
            source_account_id: Some(source),
            destination_account_id: Some(destination),
            kind: TransactionKind::Transfer,
            amount,
            description: described(description, TransactionKind::Transfer),
        }
    }
}

fn described(description: &str, kind: TransactionKind) -> String {
    if description.trim().is_empty() {
        kind.default_description().to_string()
    } else {
        description.to_string()
    }
}
