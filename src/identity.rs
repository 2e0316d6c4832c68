use chrono::{DateTime, Utc};

pub type CustomerId = u64;
pub type EmployeeId = u64;

/// A bank customer. Usernames are unique among customers; the store
/// assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password_hash: String,
}

/// Bank staff. Employees authenticate separately from customers and their
/// usernames live in their own namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct Employee {
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password_hash: String,
    /// Free-form label ("Teller", "Manager", ...); not an access-control list.
    pub role: String,
    pub hired_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password_hash: String,
    pub role: String,
}
