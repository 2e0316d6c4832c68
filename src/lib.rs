/// Account records and the balance arithmetic every mutation goes
/// through. Balances can never go below zero.
pub mod account;

/// The two authenticated populations: customers and employees.
pub mod identity;

/// Append-only ledger entries; the constructors pin each entry kind to
/// its account legs.
pub mod transaction;

/// Salted credential hashing, shared by registration and login.
pub mod password;

/// Storage seams and the in-memory bank behind them. Services only ever
/// see the traits, so a real database can slot in later.
pub mod store;

/// The service layer: money movement over the ledger, registration and
/// login, and the customer directory.
pub mod services;

/// Batch teller that scripts the services from CSV and prints closing
/// statements.
///
/// NOTE: This could be its own bootstrap crate, but the integration test
/// wants it too, so it lives in the library.
pub mod teller;
