//! Wishlist service.

use tracing::instrument;

use corner_store_core::{AccountId, ProductId};

use super::{Missing, ServiceError, customer_for_account};
use crate::db::{CatalogRepository, RepositoryError, Store, WishlistRepository};
use crate::models::{WishlistItem, WishlistLine};

/// Message shown when a product is saved twice.
pub const ALREADY_IN_WISHLIST: &str = "This product is already in your wishlist.";

pub struct WishlistService<'a> {
    store: &'a dyn Store,
}

impl<'a> WishlistService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Save a product to the account's wishlist.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the product is already saved,
    /// `NotFound(Missing::Customer)` without a profile and
    /// `NotFound(Missing::Product)` for an unknown product.
    #[instrument(skip(self))]
    pub async fn add_to_wishlist(
        &self,
        account_id: AccountId,
        product_id: ProductId,
    ) -> Result<WishlistLine, ServiceError> {
        let customer = customer_for_account(self.store, account_id).await?;
        if self.store.get_product(product_id).await?.is_none() {
            return Err(ServiceError::NotFound(Missing::Product(product_id)));
        }
        if self
            .store
            .get_wishlist_line(customer.id, product_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(ALREADY_IN_WISHLIST.to_owned()));
        }

        let line = self
            .store
            .insert_wishlist_line(customer.id, product_id)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => {
                    ServiceError::Conflict(ALREADY_IN_WISHLIST.to_owned())
                }
                RepositoryError::NotFound => ServiceError::NotFound(Missing::Product(product_id)),
                other => other.into(),
            })?;
        tracing::info!(customer_id = %customer.id, "wishlist line added");
        Ok(line)
    }

    /// # Errors
    ///
    /// Returns `NotFound(Missing::WishlistLine)` if the product is not saved.
    #[instrument(skip(self))]
    pub async fn remove_from_wishlist(
        &self,
        account_id: AccountId,
        product_id: ProductId,
    ) -> Result<(), ServiceError> {
        let customer = customer_for_account(self.store, account_id).await?;
        let line = self
            .store
            .get_wishlist_line(customer.id, product_id)
            .await?
            .ok_or(ServiceError::NotFound(Missing::WishlistLine(product_id)))?;

        match self.store.delete_wishlist_line(line.id).await {
            Ok(()) | Err(RepositoryError::NotFound) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// # Errors
    ///
    /// Returns `NotFound(Missing::Customer)` if the account has no profile.
    pub async fn list_wishlist(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<WishlistItem>, ServiceError> {
        let customer = customer_for_account(self.store, account_id).await?;
        Ok(self.store.list_wishlist(customer.id).await?)
    }
}
