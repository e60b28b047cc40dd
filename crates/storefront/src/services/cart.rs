//! Cart service.
//!
//! A cart is the set of `CartLine` rows for one customer. Adding a product
//! that is already in the cart bumps its quantity by one; removing deletes
//! the whole line.

use tracing::instrument;

use corner_store_core::{AccountId, ProductId};

use super::{Missing, ServiceError, customer_for_account};
use crate::db::{CartRepository, CatalogRepository, RepositoryError, Store};
use crate::models::{Cart, CartItem};

pub struct CartService<'a> {
    store: &'a dyn Store,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Add one unit of a product to the account's cart.
    ///
    /// The increment is a read then a write without a row lock, so two
    /// concurrent adds of the same product can lose one unit. Two concurrent
    /// first adds race on the unique (customer, product) index and the loser
    /// gets `Conflict`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound(Missing::Customer)` if the account has no profile
    /// and `NotFound(Missing::Product)` for an unknown product.
    #[instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        account_id: AccountId,
        product_id: ProductId,
    ) -> Result<CartItem, ServiceError> {
        let customer = customer_for_account(self.store, account_id).await?;
        let product = self
            .store
            .get_product(product_id)
            .await?
            .ok_or(ServiceError::NotFound(Missing::Product(product_id)))?;

        let line = match self.store.get_cart_line(customer.id, product_id).await? {
            Some(existing) => {
                self.store
                    .set_cart_quantity(existing.id, existing.quantity.saturating_add(1))
                    .await?
            }
            None => self
                .store
                .insert_cart_line(customer.id, product_id, 1)
                .await
                .map_err(|e| match e {
                    RepositoryError::Conflict(_) => ServiceError::Conflict(
                        "This product was just added to your cart.".to_owned(),
                    ),
                    RepositoryError::NotFound => {
                        ServiceError::NotFound(Missing::Product(product_id))
                    }
                    other => other.into(),
                })?,
        };

        tracing::info!(
            customer_id = %customer.id,
            quantity = line.quantity,
            "cart line updated"
        );
        Ok(CartItem { line, product })
    }

    /// Remove a product's line from the cart entirely.
    ///
    /// # Errors
    ///
    /// Returns `NotFound(Missing::CartLine)` if the product is not in the
    /// cart; the cart is left unchanged.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(
        &self,
        account_id: AccountId,
        product_id: ProductId,
    ) -> Result<(), ServiceError> {
        let customer = customer_for_account(self.store, account_id).await?;
        if self.store.get_product(product_id).await?.is_none() {
            return Err(ServiceError::NotFound(Missing::Product(product_id)));
        }
        let line = self
            .store
            .get_cart_line(customer.id, product_id)
            .await?
            .ok_or(ServiceError::NotFound(Missing::CartLine(product_id)))?;

        match self.store.delete_cart_line(line.id).await {
            Ok(()) | Err(RepositoryError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }
        tracing::info!(customer_id = %customer.id, "cart line removed");
        Ok(())
    }

    /// The account's cart in the order lines were first added.
    ///
    /// # Errors
    ///
    /// Returns `NotFound(Missing::Customer)` if the account has no profile.
    pub async fn list_cart(&self, account_id: AccountId) -> Result<Cart, ServiceError> {
        let customer = customer_for_account(self.store, account_id).await?;
        let items = self.store.list_cart(customer.id).await?;
        Ok(Cart { items })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use corner_store_core::{AccountRole, Price, Sku, Username};

    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::db::{AccountRepository, CustomerRepository};
    use crate::models::{NewCategory, NewProduct};

    struct Fixture {
        store: MemoryStore,
        account_id: AccountId,
        product_id: ProductId,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let account = store
            .create_account(
                &Username::parse("rowan").unwrap(),
                "hash",
                AccountRole::Customer,
            )
            .await
            .unwrap();
        store.get_or_create_customer(account.id).await.unwrap();
        let category = store
            .create_category(&NewCategory {
                name: "Bakery".to_owned(),
                description: None,
            })
            .await
            .unwrap();
        let product = store
            .create_product(&NewProduct {
                sku: Sku::parse("BRD-1").unwrap(),
                name: "Sourdough".to_owned(),
                description: "Loaf".to_owned(),
                price: Price::from_cents(450),
                stock: 10,
                category_id: category.id,
                image: None,
            })
            .await
            .unwrap();
        Fixture {
            store,
            account_id: account.id,
            product_id: product.id,
        }
    }

    #[tokio::test]
    async fn test_add_twice_increments_quantity() {
        let f = fixture().await;
        let carts = CartService::new(&f.store);

        carts.add_to_cart(f.account_id, f.product_id).await.unwrap();
        let item = carts.add_to_cart(f.account_id, f.product_id).await.unwrap();
        assert_eq!(item.line.quantity, 2);

        let cart = carts.list_cart(f.account_id).await.unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.item_count(), 2);
    }

    #[tokio::test]
    async fn test_add_remove_scenario() {
        let f = fixture().await;
        let carts = CartService::new(&f.store);

        assert!(carts.list_cart(f.account_id).await.unwrap().is_empty());
        carts.add_to_cart(f.account_id, f.product_id).await.unwrap();
        let cart = carts.list_cart(f.account_id).await.unwrap();
        assert_eq!(cart.items.first().unwrap().line.quantity, 1);
        carts.add_to_cart(f.account_id, f.product_id).await.unwrap();
        let cart = carts.list_cart(f.account_id).await.unwrap();
        assert_eq!(cart.items.first().unwrap().line.quantity, 2);
        carts
            .remove_from_cart(f.account_id, f.product_id)
            .await
            .unwrap();
        assert!(carts.list_cart(f.account_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_never_added_product() {
        let f = fixture().await;
        let carts = CartService::new(&f.store);
        let result = carts.remove_from_cart(f.account_id, f.product_id).await;
        assert!(matches!(
            result,
            Err(ServiceError::NotFound(Missing::CartLine(_)))
        ));
        assert!(carts.list_cart(f.account_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_unknown_product() {
        let f = fixture().await;
        let result = CartService::new(&f.store)
            .add_to_cart(f.account_id, ProductId::new(999))
            .await;
        assert!(matches!(
            result,
            Err(ServiceError::NotFound(Missing::Product(_)))
        ));
    }

    #[tokio::test]
    async fn test_add_without_profile() {
        let f = fixture().await;
        let other = f
            .store
            .create_account(
                &Username::parse("nobody").unwrap(),
                "hash",
                AccountRole::Customer,
            )
            .await
            .unwrap();
        let result = CartService::new(&f.store)
            .add_to_cart(other.id, f.product_id)
            .await;
        assert!(matches!(
            result,
            Err(ServiceError::NotFound(Missing::Customer))
        ));
    }
}
