use tracing::info;

use crate::{
    identity::{Customer, CustomerId},
    store::{SharedCustomerStore, StorageError},
};

/// Directory operations over existing customers. Creation does not live
/// here: new customers come in through registration, so credential
/// hashing happens in exactly one place.
pub struct CustomerService {
    store: SharedCustomerStore,
}

impl CustomerService {
    pub fn new(store: SharedCustomerStore) -> Self {
        Self { store }
    }

    pub fn customer_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StorageError> {
        self.store.customer_by_id(id)
    }

    pub fn customer_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Customer>, StorageError> {
        self.store.customer_by_username(username)
    }

    pub fn all_customers(&self) -> Result<Vec<Customer>, StorageError> {
        self.store.all_customers()
    }

    /// Overwrites the stored record; `false` when the customer is gone.
    pub fn update_customer(&self, customer: &Customer) -> Result<bool, StorageError> {
        let updated = self.store.update_customer(customer)?;
        if updated {
            info!("updated customer {}", customer.id);
        }
        Ok(updated)
    }

    /// Removes the customer record; any accounts they own are left in
    /// place.
    pub fn delete_customer(&self, id: CustomerId) -> Result<bool, StorageError> {
        let deleted = self.store.delete_customer(id)?;
        if deleted {
            info!("deleted customer {id}");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        account::NewAccount,
        identity::NewCustomer,
        store::{AccountStore, CustomerStore, memory::InMemoryBank},
    };

    use super::*;

    fn setup() -> (Arc<InMemoryBank>, CustomerService) {
        let bank = Arc::new(InMemoryBank::default());
        let service = CustomerService::new(bank.clone());
        (bank, service)
    }

    fn seed(bank: &InMemoryBank, username: &str) -> Customer {
        bank.create_customer(NewCustomer {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            username: username.to_string(),
            password_hash: "hash".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn lookups_cover_id_and_username() {
        let (bank, service) = setup();
        let ada = seed(&bank, "ada");
        seed(&bank, "grace");

        assert_eq!(service.customer_by_id(ada.id).unwrap(), Some(ada.clone()));
        assert_eq!(service.customer_by_username("ada").unwrap(), Some(ada));
        assert_eq!(service.customer_by_username("nobody").unwrap(), None);
        assert_eq!(service.all_customers().unwrap().len(), 2);
    }

    #[test]
    fn update_rewrites_the_record() {
        let (bank, service) = setup();
        let mut ada = seed(&bank, "ada");
        ada.last_name = "King".to_string();

        assert!(service.update_customer(&ada).unwrap());
        let stored = service.customer_by_id(ada.id).unwrap().unwrap();
        assert_eq!(stored.last_name, "King");
    }

    #[test]
    fn update_of_a_missing_customer_is_false() {
        let (bank, service) = setup();
        let mut ada = seed(&bank, "ada");
        ada.id = 42;
        assert!(!service.update_customer(&ada).unwrap());
    }

    #[test]
    fn delete_leaves_accounts_behind() {
        let (bank, service) = setup();
        let ada = seed(&bank, "ada");
        bank.create_account(NewAccount {
            customer_id: ada.id,
            number: "ACC1".to_string(),
            account_type: "Checking".to_string(),
        })
        .unwrap();

        assert!(service.delete_customer(ada.id).unwrap());
        assert!(!service.delete_customer(ada.id).unwrap());
        assert_eq!(bank.accounts_by_customer(ada.id).unwrap().len(), 1);
    }
}
