use thiserror::Error;
use tracing::info;

use crate::{
    identity::{Customer, Employee, NewCustomer, NewEmployee},
    password::{hash_password, verify_password},
    store::{SharedCustomerStore, SharedEmployeeStore, StorageError},
};

#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("username `{0}` is already taken")]
    UsernameTaken(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Registration and credential checks for both kinds of user. Customer
/// and employee usernames are separate namespaces.
pub struct AuthenticationService {
    customers: SharedCustomerStore,
    employees: SharedEmployeeStore,
}

impl AuthenticationService {
    pub fn new(customers: SharedCustomerStore, employees: SharedEmployeeStore) -> Self {
        Self {
            customers,
            employees,
        }
    }

    pub fn register_customer(
        &self,
        first_name: &str,
        last_name: &str,
        username: &str,
        password: &str,
    ) -> Result<Customer, AuthError> {
        if self.customers.customer_by_username(username)?.is_some() {
            return Err(AuthError::UsernameTaken(username.to_string()));
        }
        let customer = self.customers.create_customer(NewCustomer {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            username: username.to_string(),
            password_hash: hash_password(password),
        })?;
        info!("registered customer {username}");
        Ok(customer)
    }

    pub fn register_employee(
        &self,
        first_name: &str,
        last_name: &str,
        username: &str,
        password: &str,
        role: &str,
    ) -> Result<Employee, AuthError> {
        if self.employees.employee_by_username(username)?.is_some() {
            return Err(AuthError::UsernameTaken(username.to_string()));
        }
        let employee = self.employees.create_employee(NewEmployee {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            username: username.to_string(),
            password_hash: hash_password(password),
            role: role.to_string(),
        })?;
        info!("registered employee {username} as {role}");
        Ok(employee)
    }

    /// `Ok(None)` for an unknown username and for a wrong password alike;
    /// the caller cannot tell the two apart.
    pub fn authenticate_customer(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Customer>, AuthError> {
        let Some(customer) = self.customers.customer_by_username(username)? else {
            return Ok(None);
        };
        if verify_password(password, &customer.password_hash) {
            Ok(Some(customer))
        } else {
            Ok(None)
        }
    }

    pub fn authenticate_employee(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Employee>, AuthError> {
        let Some(employee) = self.employees.employee_by_username(username)? else {
            return Ok(None);
        };
        if verify_password(password, &employee.password_hash) {
            Ok(Some(employee))
        } else {
            Ok(None)
        }
    }
}
