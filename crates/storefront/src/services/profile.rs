//! Customer profile service.

use tracing::instrument;

use corner_store_core::AccountId;

use super::{ServiceError, customer_for_account};
use crate::db::{CustomerRepository, Store};
use crate::forms::ProfileForm;
use crate::models::Customer;

pub struct ProfileService<'a> {
    store: &'a dyn Store,
}

impl<'a> ProfileService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Return the account's profile, creating an empty one on first access.
    ///
    /// Idempotent: the same account always gets the same customer.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    #[instrument(skip(self))]
    pub async fn get_or_create_profile(
        &self,
        account_id: AccountId,
    ) -> Result<Customer, ServiceError> {
        Ok(self.store.get_or_create_customer(account_id).await?)
    }

    /// Look up the account's profile without creating it.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound(Missing::Customer)` if there is none.
    pub async fn get_customer_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Customer, ServiceError> {
        customer_for_account(self.store, account_id).await
    }

    /// Validate and save profile edits.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a bad phone number.
    #[instrument(skip(self, form))]
    pub async fn update_profile(
        &self,
        account_id: AccountId,
        form: &ProfileForm,
    ) -> Result<Customer, ServiceError> {
        let update = form.clean()?;
        let customer = self.store.get_or_create_customer(account_id).await?;
        let updated = self.store.update_customer(customer.id, &update).await?;
        tracing::info!(customer_id = %updated.id, "profile updated");
        Ok(updated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use corner_store_core::{AccountRole, Username};

    use super::*;
    use crate::db::AccountRepository;
    use crate::db::memory::MemoryStore;
    use crate::services::Missing;

    async fn account(store: &MemoryStore) -> AccountId {
        store
            .create_account(
                &Username::parse("gale").unwrap(),
                "hash",
                AccountRole::Customer,
            )
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_get_or_create_profile_twice_returns_same_customer() {
        let store = MemoryStore::new();
        let account_id = account(&store).await;
        let profiles = ProfileService::new(&store);

        let first = profiles.get_or_create_profile(account_id).await.unwrap();
        let second = profiles.get_or_create_profile(account_id).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.address, "");
        assert!(first.phone.is_none());
    }

    #[tokio::test]
    async fn test_get_customer_for_account_missing() {
        let store = MemoryStore::new();
        let account_id = account(&store).await;
        let result = ProfileService::new(&store)
            .get_customer_for_account(account_id)
            .await;
        assert!(matches!(
            result,
            Err(ServiceError::NotFound(Missing::Customer))
        ));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let store = MemoryStore::new();
        let account_id = account(&store).await;
        let profiles = ProfileService::new(&store);

        let form = ProfileForm {
            phone: "555-0100".to_owned(),
            address: "9 Harbour Way".to_owned(),
        };
        let updated = profiles.update_profile(account_id, &form).await.unwrap();
        assert_eq!(updated.phone.as_deref(), Some("555-0100"));

        let bad = ProfileForm {
            phone: "not a phone".to_owned(),
            address: String::new(),
        };
        assert!(matches!(
            profiles.update_profile(account_id, &bad).await,
            Err(ServiceError::Validation(_))
        ));
        let stored = profiles.get_customer_for_account(account_id).await.unwrap();
        assert_eq!(stored.address, "9 Harbour Way");
    }
}
