//! Checkout and order records.
//!
//! Customers only ever read orders. Orders, payments and shipments are
//! written by staff through `cs-cli`; checkout renders the cart and writes
//! nothing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::instrument;

use corner_store_core::{AccountId, CustomerId, OrderId, Price, ProductId};

use super::{Missing, ServiceError, customer_for_account};
use crate::db::{
    CartRepository, CatalogRepository, CustomerRepository, OrderRepository, RepositoryError,
    Store,
};
use crate::forms::{FieldErrors, PaymentForm, ShipmentForm};
use crate::models::{Cart, NewOrderItem, Order, OrderDetail, Payment, Shipment};

pub struct OrderService<'a> {
    store: &'a dyn Store,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// The confirmation view: the current cart, read-only.
    ///
    /// Does not create an order, touch stock or clear the cart.
    ///
    /// # Errors
    ///
    /// Returns `NotFound(Missing::Customer)` if the account has no profile.
    #[instrument(skip(self))]
    pub async fn checkout(&self, account_id: AccountId) -> Result<Cart, ServiceError> {
        let customer = customer_for_account(self.store, account_id).await?;
        let items = self.store.list_cart(customer.id).await?;
        Ok(Cart { items })
    }

    /// Load an order with its lines, payments and shipments.
    ///
    /// Staff may view any order. Everyone else only sees their own; another
    /// customer's order is reported as not found.
    ///
    /// # Errors
    ///
    /// Returns `NotFound(Missing::Order)` if the order is absent or not
    /// visible to the account.
    #[instrument(skip(self))]
    pub async fn view_order(
        &self,
        account_id: AccountId,
        is_staff: bool,
        order_id: OrderId,
    ) -> Result<OrderDetail, ServiceError> {
        let not_found = ServiceError::NotFound(Missing::Order(order_id));
        let Some(order) = self.store.get_order(order_id).await? else {
            return Err(not_found);
        };

        if !is_staff {
            let owner = self.store.get_customer_by_account(account_id).await?;
            if owner.is_none_or(|c| c.id != order.customer_id) {
                return Err(not_found);
            }
        }

        let lines = self.store.list_order_lines(order_id).await?;
        let payments = self.store.list_payments(order_id).await?;
        let shipments = self.store.list_shipments(order_id).await?;
        Ok(OrderDetail {
            order,
            lines,
            payments,
            shipments,
        })
    }

    /// The account's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `NotFound(Missing::Customer)` if the account has no profile.
    pub async fn list_orders(&self, account_id: AccountId) -> Result<Vec<Order>, ServiceError> {
        let customer = customer_for_account(self.store, account_id).await?;
        Ok(self.store.list_orders_for_customer(customer.id).await?)
    }

    /// Create an unpaid order, snapshotting each product's current price.
    ///
    /// Repeated products are merged into one line.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for an empty item list or a zero
    /// quantity, and `NotFound` for an unknown customer or product.
    #[instrument(skip(self, items), fields(items = items.len()))]
    pub async fn create_order(
        &self,
        customer_id: CustomerId,
        items: &[(ProductId, u32)],
    ) -> Result<Order, ServiceError> {
        if items.is_empty() {
            return Err(FieldErrors::single("items", "An order needs at least one item.").into());
        }
        if items.iter().any(|&(_, quantity)| quantity == 0) {
            return Err(
                FieldErrors::single("quantity", "Ensure this value is greater than or equal to 1.")
                    .into(),
            );
        }
        if self.store.get_customer(customer_id).await?.is_none() {
            return Err(ServiceError::NotFound(Missing::CustomerId(customer_id)));
        }

        let mut merged: Vec<(ProductId, u32)> = Vec::with_capacity(items.len());
        for &(product_id, quantity) in items {
            match merged.iter_mut().find(|(id, _)| *id == product_id) {
                Some((_, total)) => *total = total.saturating_add(quantity),
                None => merged.push((product_id, quantity)),
            }
        }

        let mut lines = Vec::with_capacity(merged.len());
        let mut total = Decimal::ZERO;
        for (product_id, quantity) in merged {
            let product = self
                .store
                .get_product(product_id)
                .await?
                .ok_or(ServiceError::NotFound(Missing::Product(product_id)))?;
            total += product.price.times(quantity);
            lines.push(NewOrderItem {
                product_id,
                quantity,
                price: product.price,
            });
        }
        let total = Price::from_decimal(total)
            .map_err(|_| FieldErrors::single("items", "Order total is too large."))?;

        let order = self
            .store
            .create_order(customer_id, &lines, total)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ServiceError::NotFound(Missing::CustomerId(customer_id)),
                other => other.into(),
            })?;
        tracing::info!(order_id = %order.id, total = %order.total_price, "order created");
        Ok(order)
    }

    /// Record a payment against an order. Does not change its status.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a bad form and
    /// `NotFound(Missing::Order)` for an unknown order.
    #[instrument(skip(self, form))]
    pub async fn record_payment(
        &self,
        order_id: OrderId,
        form: &PaymentForm,
    ) -> Result<Payment, ServiceError> {
        let payment = form.clean(order_id)?;
        let created = self
            .store
            .create_payment(&payment)
            .await
            .map_err(|e| order_not_found(e, order_id))?;
        tracing::info!(payment_id = %created.id, amount = %created.amount, "payment recorded");
        Ok(created)
    }

    /// Record a shipment, optionally tied to an order.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a bad form and
    /// `NotFound(Missing::Order)` for an unknown order.
    #[instrument(skip(self, form))]
    pub async fn record_shipment(
        &self,
        order_id: Option<OrderId>,
        shipment_date: DateTime<Utc>,
        form: &ShipmentForm,
    ) -> Result<Shipment, ServiceError> {
        let shipment = form.clean(order_id, shipment_date)?;
        let created = self.store.create_shipment(&shipment).await.map_err(|e| {
            match order_id {
                Some(id) => order_not_found(e, id),
                None => e.into(),
            }
        })?;
        tracing::info!(shipment_id = %created.id, "shipment recorded");
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns `NotFound(Missing::Order)` for an unknown order.
    #[instrument(skip(self))]
    pub async fn mark_order_paid(&self, order_id: OrderId) -> Result<Order, ServiceError> {
        self.store
            .mark_order_paid(order_id)
            .await
            .map_err(|e| order_not_found(e, order_id))
    }
}

fn order_not_found(e: RepositoryError, order_id: OrderId) -> ServiceError {
    match e {
        RepositoryError::NotFound => ServiceError::NotFound(Missing::Order(order_id)),
        other => other.into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use corner_store_core::{AccountRole, PaymentStatus, Sku, Username};

    use super::*;
    use crate::db::AccountRepository;
    use crate::db::memory::MemoryStore;
    use crate::models::{Customer, NewCategory, NewProduct, Product};
    use crate::services::CartService;

    async fn customer(store: &MemoryStore, name: &str) -> (AccountId, Customer) {
        let account = store
            .create_account(&Username::parse(name).unwrap(), "hash", AccountRole::Customer)
            .await
            .unwrap();
        let customer = store.get_or_create_customer(account.id).await.unwrap();
        (account.id, customer)
    }

    async fn product(store: &MemoryStore, sku: &str, cents: u32) -> Product {
        let category = match store.list_categories().await.unwrap().into_iter().next() {
            Some(c) => c,
            None => store
                .create_category(&NewCategory {
                    name: "Pantry".to_owned(),
                    description: None,
                })
                .await
                .unwrap(),
        };
        store
            .create_product(&NewProduct {
                sku: Sku::parse(sku).unwrap(),
                name: format!("Item {sku}"),
                description: "Shelf stable".to_owned(),
                price: Price::from_cents(cents),
                stock: 5,
                category_id: category.id,
                image: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_order_totals_and_merges() {
        let store = MemoryStore::new();
        let (_, buyer) = customer(&store, "ash").await;
        let rice = product(&store, "RICE", 300).await;
        let beans = product(&store, "BEANS", 125).await;

        let orders = OrderService::new(&store);
        let order = orders
            .create_order(buyer.id, &[(rice.id, 2), (beans.id, 1), (rice.id, 1)])
            .await
            .unwrap();

        assert_eq!(order.total_price, Price::from_cents(1025));
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
        let lines = store.list_order_lines(order.id).await.unwrap();
        assert_eq!(lines.len(), 2);
    }

    #[tokio::test]
    async fn test_item_price_survives_product_price_change() {
        let store = MemoryStore::new();
        let (account_id, buyer) = customer(&store, "ash").await;
        let rice = product(&store, "RICE", 300).await;
        let orders = OrderService::new(&store);
        let order = orders.create_order(buyer.id, &[(rice.id, 1)]).await.unwrap();

        let changed = NewProduct {
            sku: rice.sku.clone(),
            name: rice.name.clone(),
            description: rice.description.clone(),
            price: Price::from_cents(999),
            stock: rice.stock,
            category_id: rice.category_id,
            image: None,
        };
        store.update_product(rice.id, &changed).await.unwrap();

        let detail = orders.view_order(account_id, false, order.id).await.unwrap();
        let line = detail.lines.first().unwrap();
        assert_eq!(line.item.price, Price::from_cents(300));
        assert_eq!(detail.order.total_price, Price::from_cents(300));
    }

    #[tokio::test]
    async fn test_view_order_hidden_from_other_customers() {
        let store = MemoryStore::new();
        let (_, buyer) = customer(&store, "ash").await;
        let (other_account, _) = customer(&store, "birch").await;
        let rice = product(&store, "RICE", 300).await;
        let orders = OrderService::new(&store);
        let order = orders.create_order(buyer.id, &[(rice.id, 1)]).await.unwrap();

        assert!(matches!(
            orders.view_order(other_account, false, order.id).await,
            Err(ServiceError::NotFound(Missing::Order(_)))
        ));
        assert!(orders.view_order(other_account, true, order.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_order_rejects_empty_and_zero() {
        let store = MemoryStore::new();
        let (_, buyer) = customer(&store, "ash").await;
        let rice = product(&store, "RICE", 300).await;
        let orders = OrderService::new(&store);

        assert!(matches!(
            orders.create_order(buyer.id, &[]).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            orders.create_order(buyer.id, &[(rice.id, 0)]).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            orders.create_order(CustomerId::new(404), &[(rice.id, 1)]).await,
            Err(ServiceError::NotFound(Missing::CustomerId(_)))
        ));
    }

    #[tokio::test]
    async fn test_checkout_writes_nothing() {
        let store = MemoryStore::new();
        let (account_id, buyer) = customer(&store, "ash").await;
        let rice = product(&store, "RICE", 300).await;
        CartService::new(&store)
            .add_to_cart(account_id, rice.id)
            .await
            .unwrap();

        let orders = OrderService::new(&store);
        let cart = orders.checkout(account_id).await.unwrap();
        assert_eq!(cart.item_count(), 1);

        assert_eq!(store.list_cart(buyer.id).await.unwrap().len(), 1);
        assert_eq!(store.get_product(rice.id).await.unwrap().unwrap().stock, 5);
        assert!(orders.list_orders(account_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_payment_shipment_and_mark_paid() {
        let store = MemoryStore::new();
        let (account_id, buyer) = customer(&store, "ash").await;
        let rice = product(&store, "RICE", 300).await;
        let orders = OrderService::new(&store);
        let order = orders.create_order(buyer.id, &[(rice.id, 1)]).await.unwrap();

        let payment = PaymentForm {
            payment_method: "card".to_owned(),
            amount: "3.00".to_owned(),
        };
        orders.record_payment(order.id, &payment).await.unwrap();
        assert!(matches!(
            orders.record_payment(OrderId::new(9999), &payment).await,
            Err(ServiceError::NotFound(Missing::Order(_)))
        ));

        let shipment = ShipmentForm {
            address: "1 Mill Lane".to_owned(),
            city: "Leeds".to_owned(),
            state: "West Yorkshire".to_owned(),
            country: "UK".to_owned(),
            zip_code: "LS1 4AP".to_owned(),
        };
        orders
            .record_shipment(Some(order.id), Utc::now(), &shipment)
            .await
            .unwrap();
        orders
            .record_shipment(None, Utc::now(), &shipment)
            .await
            .unwrap();

        let paid = orders.mark_order_paid(order.id).await.unwrap();
        assert!(paid.payment_status.is_paid());

        let detail = orders.view_order(account_id, false, order.id).await.unwrap();
        assert_eq!(detail.payments.len(), 1);
        assert_eq!(detail.shipments.len(), 1);
    }
}
