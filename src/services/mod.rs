pub mod accounts;
pub mod auth;
pub mod customers;

pub use accounts::{AccountService, LedgerError};
pub use auth::{AuthError, AuthenticationService};
pub use customers::CustomerService;
