//! In-process [`Store`] used by tests and local demos.
//!
//! Tables are plain vectors so listing order is insertion order, like the
//! serial keys in `PostgreSQL`. Unique constraints and `ON DELETE CASCADE`
//! are applied by hand in the same places the schema applies them.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use corner_store_core::{
    AccountId, AccountRole, CartLineId, CategoryId, CustomerId, OrderId, OrderItemId, PaymentId,
    PaymentStatus, Price, ProductId, ShipmentId, Username, WishlistLineId,
};

use super::{
    AccountRepository, CartRepository, CatalogRepository, CustomerRepository, OrderRepository,
    RepositoryError, Store, WishlistRepository,
};
use crate::models::{
    Account, CartItem, CartLine, Category, Customer, NewCategory, NewOrderItem, NewPayment,
    NewProduct, NewShipment, Order, OrderItem, OrderLine, Payment, Product, ProfileUpdate,
    Shipment, WishlistItem, WishlistLine,
};

#[derive(Default)]
struct Tables {
    last_id: i32,
    accounts: Vec<(Account, String)>,
    categories: Vec<Category>,
    products: Vec<Product>,
    customers: Vec<Customer>,
    cart_lines: Vec<CartLine>,
    wishlist_lines: Vec<WishlistLine>,
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
    payments: Vec<Payment>,
    shipments: Vec<Shipment>,
}

impl Tables {
    /// Next surrogate key. One sequence for every table keeps ids distinct
    /// across entity kinds, which makes mixed-up ids fail loudly in tests.
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    fn remove_products(&mut self, ids: &[ProductId]) {
        self.products.retain(|p| !ids.contains(&p.id));
        self.cart_lines.retain(|l| !ids.contains(&l.product_id));
        self.wishlist_lines.retain(|l| !ids.contains(&l.product_id));
        self.order_items.retain(|i| !ids.contains(&i.product_id));
    }

    fn remove_orders(&mut self, ids: &[OrderId]) {
        self.orders.retain(|o| !ids.contains(&o.id));
        self.order_items.retain(|i| !ids.contains(&i.order_id));
        self.payments.retain(|p| !ids.contains(&p.order_id));
        self.shipments
            .retain(|s| s.order_id.is_none_or(|id| !ids.contains(&id)));
    }

    fn name_taken(&self, name: &str, except: Option<CategoryId>) -> bool {
        self.categories
            .iter()
            .any(|c| c.name == name && Some(c.id) != except)
    }

    fn check_product(
        &self,
        product: &NewProduct,
        except: Option<ProductId>,
    ) -> Result<(), RepositoryError> {
        if self
            .products
            .iter()
            .any(|p| p.sku == product.sku && Some(p.id) != except)
        {
            return Err(RepositoryError::Conflict("sku".to_owned()));
        }
        if !self.categories.iter().any(|c| c.id == product.category_id) {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn cart_item(&self, line: &CartLine) -> Result<CartItem, RepositoryError> {
        let product = self
            .product(line.product_id)
            .cloned()
            .ok_or_else(|| RepositoryError::DataCorruption("cart line without product".into()))?;
        Ok(CartItem {
            line: line.clone(),
            product,
        })
    }
}

/// Vector-backed store guarded by an async mutex.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete an account and everything hanging off its customer profile.
    pub async fn delete_account(&self, id: AccountId) -> Result<(), RepositoryError> {
        let mut t = self.tables.lock().await;
        let before = t.accounts.len();
        t.accounts.retain(|(a, _)| a.id != id);
        if t.accounts.len() == before {
            return Err(RepositoryError::NotFound);
        }

        let customers: Vec<CustomerId> = t
            .customers
            .iter()
            .filter(|c| c.account_id == id)
            .map(|c| c.id)
            .collect();
        t.customers.retain(|c| c.account_id != id);
        t.cart_lines.retain(|l| !customers.contains(&l.customer_id));
        t.wishlist_lines
            .retain(|l| !customers.contains(&l.customer_id));
        let orders: Vec<OrderId> = t
            .orders
            .iter()
            .filter(|o| customers.contains(&o.customer_id))
            .map(|o| o.id)
            .collect();
        t.remove_orders(&orders);
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn create_account(
        &self,
        username: &Username,
        password_hash: &str,
        role: AccountRole,
    ) -> Result<Account, RepositoryError> {
        let mut t = self.tables.lock().await;
        if t.accounts.iter().any(|(a, _)| &a.username == username) {
            return Err(RepositoryError::Conflict("username".to_owned()));
        }
        let account = Account {
            id: AccountId::new(t.next_id()),
            username: username.clone(),
            role,
            created_at: Utc::now(),
        };
        t.accounts.push((account.clone(), password_hash.to_owned()));
        Ok(account)
    }

    async fn get_account_with_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        let t = self.tables.lock().await;
        Ok(t.accounts.iter().find(|(a, _)| &a.username == username).cloned())
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let t = self.tables.lock().await;
        Ok(t.accounts
            .iter()
            .find(|(a, _)| a.id == id)
            .map(|(a, _)| a.clone()))
    }

    async fn set_account_role(
        &self,
        username: &Username,
        role: AccountRole,
    ) -> Result<Account, RepositoryError> {
        let mut t = self.tables.lock().await;
        let (account, _) = t
            .accounts
            .iter_mut()
            .find(|(a, _)| &a.username == username)
            .ok_or(RepositoryError::NotFound)?;
        account.role = role;
        Ok(account.clone())
    }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn create_category(&self, category: &NewCategory) -> Result<Category, RepositoryError> {
        let mut t = self.tables.lock().await;
        if t.name_taken(&category.name, None) {
            return Err(RepositoryError::Conflict("name".to_owned()));
        }
        let created = Category {
            id: CategoryId::new(t.next_id()),
            name: category.name.clone(),
            description: category.description.clone(),
        };
        t.categories.push(created.clone());
        Ok(created)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let t = self.tables.lock().await;
        let mut categories = t.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let t = self.tables.lock().await;
        Ok(t.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn update_category(
        &self,
        id: CategoryId,
        category: &NewCategory,
    ) -> Result<Category, RepositoryError> {
        let mut t = self.tables.lock().await;
        if t.name_taken(&category.name, Some(id)) {
            return Err(RepositoryError::Conflict("name".to_owned()));
        }
        let existing = t
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepositoryError::NotFound)?;
        existing.name.clone_from(&category.name);
        existing.description.clone_from(&category.description);
        Ok(existing.clone())
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let mut t = self.tables.lock().await;
        let before = t.categories.len();
        t.categories.retain(|c| c.id != id);
        if t.categories.len() == before {
            return Err(RepositoryError::NotFound);
        }
        let products: Vec<ProductId> = t
            .products
            .iter()
            .filter(|p| p.category_id == id)
            .map(|p| p.id)
            .collect();
        t.remove_products(&products);
        Ok(())
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let mut t = self.tables.lock().await;
        t.check_product(product, None)?;
        let created = Product {
            id: ProductId::new(t.next_id()),
            sku: product.sku.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            stock: product.stock,
            category_id: product.category_id,
            image: product.image.clone(),
        };
        t.products.push(created.clone());
        Ok(created)
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let t = self.tables.lock().await;
        Ok(t.products.clone())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let t = self.tables.lock().await;
        Ok(t.product(id).cloned())
    }

    async fn update_product(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let mut t = self.tables.lock().await;
        if t.product(id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        t.check_product(product, Some(id))?;
        let existing = t
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepositoryError::NotFound)?;
        *existing = Product {
            id,
            sku: product.sku.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            stock: product.stock,
            category_id: product.category_id,
            image: product.image.clone(),
        };
        Ok(existing.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let mut t = self.tables.lock().await;
        if t.product(id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        t.remove_products(&[id]);
        Ok(())
    }
}

#[async_trait]
impl CustomerRepository for MemoryStore {
    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let t = self.tables.lock().await;
        Ok(t.customers.iter().find(|c| c.id == id).cloned())
    }

    async fn get_customer_by_account(
        &self,
        account_id: AccountId,
    ) -> Result<Option<Customer>, RepositoryError> {
        let t = self.tables.lock().await;
        Ok(t.customers
            .iter()
            .find(|c| c.account_id == account_id)
            .cloned())
    }

    async fn get_or_create_customer(
        &self,
        account_id: AccountId,
    ) -> Result<Customer, RepositoryError> {
        let mut t = self.tables.lock().await;
        if let Some(existing) = t.customers.iter().find(|c| c.account_id == account_id) {
            return Ok(existing.clone());
        }
        if !t.accounts.iter().any(|(a, _)| a.id == account_id) {
            return Err(RepositoryError::NotFound);
        }
        let created = Customer {
            id: CustomerId::new(t.next_id()),
            account_id,
            phone: None,
            address: String::new(),
        };
        t.customers.push(created.clone());
        Ok(created)
    }

    async fn update_customer(
        &self,
        id: CustomerId,
        update: &ProfileUpdate,
    ) -> Result<Customer, RepositoryError> {
        let mut t = self.tables.lock().await;
        let customer = t
            .customers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepositoryError::NotFound)?;
        customer.phone.clone_from(&update.phone);
        customer.address.clone_from(&update.address);
        Ok(customer.clone())
    }
}

#[async_trait]
impl CartRepository for MemoryStore {
    async fn get_cart_line(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let t = self.tables.lock().await;
        Ok(t.cart_lines
            .iter()
            .find(|l| l.customer_id == customer_id && l.product_id == product_id)
            .cloned())
    }

    async fn insert_cart_line(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartLine, RepositoryError> {
        let mut t = self.tables.lock().await;
        if t
            .cart_lines
            .iter()
            .any(|l| l.customer_id == customer_id && l.product_id == product_id)
        {
            return Err(RepositoryError::Conflict("cart_line".to_owned()));
        }
        if t.product(product_id).is_none() || !t.customers.iter().any(|c| c.id == customer_id) {
            return Err(RepositoryError::NotFound);
        }
        let line = CartLine {
            id: CartLineId::new(t.next_id()),
            customer_id,
            product_id,
            quantity,
        };
        t.cart_lines.push(line.clone());
        Ok(line)
    }

    async fn set_cart_quantity(
        &self,
        id: CartLineId,
        quantity: u32,
    ) -> Result<CartLine, RepositoryError> {
        let mut t = self.tables.lock().await;
        let line = t
            .cart_lines
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(RepositoryError::NotFound)?;
        line.quantity = quantity;
        Ok(line.clone())
    }

    async fn delete_cart_line(&self, id: CartLineId) -> Result<(), RepositoryError> {
        let mut t = self.tables.lock().await;
        let before = t.cart_lines.len();
        t.cart_lines.retain(|l| l.id != id);
        if t.cart_lines.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_cart(&self, customer_id: CustomerId) -> Result<Vec<CartItem>, RepositoryError> {
        let t = self.tables.lock().await;
        t.cart_lines
            .iter()
            .filter(|l| l.customer_id == customer_id)
            .map(|l| t.cart_item(l))
            .collect()
    }
}

#[async_trait]
impl WishlistRepository for MemoryStore {
    async fn get_wishlist_line(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> Result<Option<WishlistLine>, RepositoryError> {
        let t = self.tables.lock().await;
        Ok(t.wishlist_lines
            .iter()
            .find(|l| l.customer_id == customer_id && l.product_id == product_id)
            .cloned())
    }

    async fn insert_wishlist_line(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> Result<WishlistLine, RepositoryError> {
        let mut t = self.tables.lock().await;
        if t
            .wishlist_lines
            .iter()
            .any(|l| l.customer_id == customer_id && l.product_id == product_id)
        {
            return Err(RepositoryError::Conflict("wishlist_line".to_owned()));
        }
        if t.product(product_id).is_none() || !t.customers.iter().any(|c| c.id == customer_id) {
            return Err(RepositoryError::NotFound);
        }
        let line = WishlistLine {
            id: WishlistLineId::new(t.next_id()),
            customer_id,
            product_id,
            added_at: Utc::now(),
        };
        t.wishlist_lines.push(line.clone());
        Ok(line)
    }

    async fn delete_wishlist_line(&self, id: WishlistLineId) -> Result<(), RepositoryError> {
        let mut t = self.tables.lock().await;
        let before = t.wishlist_lines.len();
        t.wishlist_lines.retain(|l| l.id != id);
        if t.wishlist_lines.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_wishlist(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<WishlistItem>, RepositoryError> {
        let t = self.tables.lock().await;
        t.wishlist_lines
            .iter()
            .filter(|l| l.customer_id == customer_id)
            .map(|l| {
                let product = t.product(l.product_id).cloned().ok_or_else(|| {
                    RepositoryError::DataCorruption("wishlist line without product".into())
                })?;
                Ok(WishlistItem {
                    line: l.clone(),
                    product,
                })
            })
            .collect()
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn create_order(
        &self,
        customer_id: CustomerId,
        items: &[NewOrderItem],
        total: Price,
    ) -> Result<Order, RepositoryError> {
        let mut t = self.tables.lock().await;
        if !t.customers.iter().any(|c| c.id == customer_id)
            || items.iter().any(|i| t.product(i.product_id).is_none())
        {
            return Err(RepositoryError::NotFound);
        }
        let order = Order {
            id: OrderId::new(t.next_id()),
            customer_id,
            order_date: Utc::now(),
            total_price: total,
            payment_status: PaymentStatus::Unpaid,
        };
        t.orders.push(order.clone());
        for item in items {
            let id = OrderItemId::new(t.next_id());
            t.order_items.push(OrderItem {
                id,
                order_id: order.id,
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
            });
        }
        Ok(order)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let t = self.tables.lock().await;
        Ok(t.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_orders_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let t = self.tables.lock().await;
        Ok(t.orders
            .iter()
            .rev()
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn list_order_lines(&self, order_id: OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        let t = self.tables.lock().await;
        t.order_items
            .iter()
            .filter(|i| i.order_id == order_id)
            .map(|i| {
                let product = t.product(i.product_id).ok_or_else(|| {
                    RepositoryError::DataCorruption("order item without product".into())
                })?;
                Ok(OrderLine {
                    item: i.clone(),
                    product_name: product.name.clone(),
                })
            })
            .collect()
    }

    async fn list_payments(&self, order_id: OrderId) -> Result<Vec<Payment>, RepositoryError> {
        let t = self.tables.lock().await;
        Ok(t.payments
            .iter()
            .filter(|p| p.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn list_shipments(&self, order_id: OrderId) -> Result<Vec<Shipment>, RepositoryError> {
        let t = self.tables.lock().await;
        Ok(t.shipments
            .iter()
            .filter(|s| s.order_id == Some(order_id))
            .cloned()
            .collect())
    }

    async fn create_payment(&self, payment: &NewPayment) -> Result<Payment, RepositoryError> {
        let mut t = self.tables.lock().await;
        if !t.orders.iter().any(|o| o.id == payment.order_id) {
            return Err(RepositoryError::NotFound);
        }
        let created = Payment {
            id: PaymentId::new(t.next_id()),
            order_id: payment.order_id,
            payment_date: Utc::now(),
            payment_method: payment.payment_method.clone(),
            amount: payment.amount,
        };
        t.payments.push(created.clone());
        Ok(created)
    }

    async fn create_shipment(&self, shipment: &NewShipment) -> Result<Shipment, RepositoryError> {
        let mut t = self.tables.lock().await;
        if let Some(order_id) = shipment.order_id
            && !t.orders.iter().any(|o| o.id == order_id)
        {
            return Err(RepositoryError::NotFound);
        }
        let created = Shipment {
            id: ShipmentId::new(t.next_id()),
            order_id: shipment.order_id,
            shipment_date: shipment.shipment_date,
            address: shipment.address.clone(),
            city: shipment.city.clone(),
            state: shipment.state.clone(),
            country: shipment.country.clone(),
            zip_code: shipment.zip_code.clone(),
        };
        t.shipments.push(created.clone());
        Ok(created)
    }

    async fn mark_order_paid(&self, id: OrderId) -> Result<Order, RepositoryError> {
        let mut t = self.tables.lock().await;
        let order = t
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(RepositoryError::NotFound)?;
        order.payment_status = PaymentStatus::Paid;
        Ok(order.clone())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use corner_store_core::Sku;

    use super::*;

    async fn seeded() -> (MemoryStore, CustomerId, CategoryId, ProductId) {
        let store = MemoryStore::new();
        let account = store
            .create_account(
                &Username::parse("dana").unwrap(),
                "hash",
                AccountRole::Customer,
            )
            .await
            .unwrap();
        let customer = store.get_or_create_customer(account.id).await.unwrap();
        let category = store
            .create_category(&NewCategory {
                name: "Pantry".to_owned(),
                description: None,
            })
            .await
            .unwrap();
        let product = store
            .create_product(&NewProduct {
                sku: Sku::parse("RICE-5").unwrap(),
                name: "Rice".to_owned(),
                description: "Five kilos".to_owned(),
                price: Price::from_cents(899),
                stock: 4,
                category_id: category.id,
                image: None,
            })
            .await
            .unwrap();
        (store, customer.id, category.id, product.id)
    }

    #[tokio::test]
    async fn test_duplicate_cart_line_conflicts() {
        let (store, customer, _, product) = seeded().await;
        store.insert_cart_line(customer, product, 1).await.unwrap();
        let err = store.insert_cart_line(customer, product, 1).await;
        assert!(matches!(err, Err(RepositoryError::Conflict(f)) if f == "cart_line"));
    }

    #[tokio::test]
    async fn test_delete_category_cascades() {
        let (store, customer, category, product) = seeded().await;
        store.insert_cart_line(customer, product, 2).await.unwrap();
        store.insert_wishlist_line(customer, product).await.unwrap();
        let order = store
            .create_order(
                customer,
                &[NewOrderItem {
                    product_id: product,
                    quantity: 1,
                    price: Price::from_cents(899),
                }],
                Price::from_cents(899),
            )
            .await
            .unwrap();

        store.delete_category(category).await.unwrap();

        assert!(store.list_products().await.unwrap().is_empty());
        assert!(store.list_cart(customer).await.unwrap().is_empty());
        assert!(store.list_wishlist(customer).await.unwrap().is_empty());
        assert!(store.list_order_lines(order.id).await.unwrap().is_empty());
        // The order row itself belongs to the customer and survives
        assert!(store.get_order(order.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_account_cascades_to_orders() {
        let (store, customer, _, product) = seeded().await;
        let account = store.get_customer(customer).await.unwrap().unwrap().account_id;
        let order = store
            .create_order(customer, &[], Price::ZERO)
            .await
            .unwrap();
        store.insert_cart_line(customer, product, 1).await.unwrap();

        store.delete_account(account).await.unwrap();

        assert!(store.get_customer(customer).await.unwrap().is_none());
        assert!(store.get_order(order.id).await.unwrap().is_none());
        assert!(store.list_cart(customer).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_sku_conflicts() {
        let (store, _, category, _) = seeded().await;
        let err = store
            .create_product(&NewProduct {
                sku: Sku::parse("RICE-5").unwrap(),
                name: "Other rice".to_owned(),
                description: "Also rice".to_owned(),
                price: Price::from_cents(100),
                stock: 1,
                category_id: category,
                image: None,
            })
            .await;
        assert!(matches!(err, Err(RepositoryError::Conflict(f)) if f == "sku"));
    }

    #[tokio::test]
    async fn test_get_or_create_customer_is_idempotent() {
        let (store, customer, _, _) = seeded().await;
        let account = store.get_customer(customer).await.unwrap().unwrap().account_id;
        let again = store.get_or_create_customer(account).await.unwrap();
        assert_eq!(again.id, customer);
    }
}
