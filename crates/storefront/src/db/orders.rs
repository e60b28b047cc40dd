//! Order, payment and shipment queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use corner_store_core::{
    CustomerId, OrderId, OrderItemId, PaymentId, PaymentStatus, Price, ProductId, ShipmentId,
};

use super::{OrderRepository, PgStore, RepositoryError, map_write_error, to_count, to_db_count};
use crate::models::{
    NewOrderItem, NewPayment, NewShipment, Order, OrderItem, OrderLine, Payment, Shipment,
};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    customer_id: CustomerId,
    order_date: DateTime<Utc>,
    total_price: Price,
    payment_status: bool,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            customer_id: row.customer_id,
            order_date: row.order_date,
            total_price: row.total_price,
            payment_status: PaymentStatus::from(row.payment_status),
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderLineRow {
    id: OrderItemId,
    order_id: OrderId,
    product_id: ProductId,
    quantity: i32,
    price: Price,
    product_name: String,
}

impl TryFrom<OrderLineRow> for OrderLine {
    type Error = RepositoryError;

    fn try_from(row: OrderLineRow) -> Result<Self, Self::Error> {
        Ok(Self {
            item: OrderItem {
                id: row.id,
                order_id: row.order_id,
                product_id: row.product_id,
                quantity: to_count(row.quantity, "quantity")?,
                price: row.price,
            },
            product_name: row.product_name,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: PaymentId,
    order_id: OrderId,
    payment_date: DateTime<Utc>,
    payment_method: String,
    amount: Price,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            payment_date: row.payment_date,
            payment_method: row.payment_method,
            amount: row.amount,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ShipmentRow {
    id: ShipmentId,
    order_id: Option<OrderId>,
    shipment_date: DateTime<Utc>,
    address: String,
    city: String,
    state: String,
    country: String,
    zip_code: String,
}

impl From<ShipmentRow> for Shipment {
    fn from(row: ShipmentRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            shipment_date: row.shipment_date,
            address: row.address,
            city: row.city,
            state: row.state,
            country: row.country,
            zip_code: row.zip_code,
        }
    }
}

#[async_trait]
impl OrderRepository for PgStore {
    async fn create_order(
        &self,
        customer_id: CustomerId,
        items: &[NewOrderItem],
        total: Price,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO storefront.customer_order (customer_id, total_price)
            VALUES ($1, $2)
            RETURNING id, customer_id, order_date, total_price, payment_status
            ",
        )
        .bind(customer_id)
        .bind(total)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        for item in items {
            sqlx::query(
                r"
                INSERT INTO storefront.order_item (order_id, product_id, quantity, price)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(order.id)
            .bind(item.product_id)
            .bind(to_db_count(item.quantity, "quantity")?)
            .bind(item.price)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;
        }

        tx.commit().await?;

        Ok(order.into())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, customer_id, order_date, total_price, payment_status
            FROM storefront.customer_order
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Order::from))
    }

    async fn list_orders_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, customer_id, order_date, total_price, payment_status
            FROM storefront.customer_order
            WHERE customer_id = $1
            ORDER BY order_date DESC, id DESC
            ",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn list_order_lines(&self, order_id: OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT i.id, i.order_id, i.product_id, i.quantity, i.price,
                   p.name AS product_name
            FROM storefront.order_item i
            JOIN storefront.product p ON p.id = i.product_id
            WHERE i.order_id = $1
            ORDER BY i.id
            ",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OrderLine::try_from).collect()
    }

    async fn list_payments(&self, order_id: OrderId) -> Result<Vec<Payment>, RepositoryError> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r"
            SELECT id, order_id, payment_date, payment_method, amount
            FROM storefront.payment
            WHERE order_id = $1
            ORDER BY payment_date, id
            ",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Payment::from).collect())
    }

    async fn list_shipments(&self, order_id: OrderId) -> Result<Vec<Shipment>, RepositoryError> {
        let rows = sqlx::query_as::<_, ShipmentRow>(
            r"
            SELECT id, order_id, shipment_date, address, city, state, country, zip_code
            FROM storefront.shipment
            WHERE order_id = $1
            ORDER BY shipment_date, id
            ",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Shipment::from).collect())
    }

    async fn create_payment(&self, payment: &NewPayment) -> Result<Payment, RepositoryError> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r"
            INSERT INTO storefront.payment (order_id, payment_method, amount)
            VALUES ($1, $2, $3)
            RETURNING id, order_id, payment_date, payment_method, amount
            ",
        )
        .bind(payment.order_id)
        .bind(&payment.payment_method)
        .bind(payment.amount)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(row.into())
    }

    async fn create_shipment(&self, shipment: &NewShipment) -> Result<Shipment, RepositoryError> {
        let row = sqlx::query_as::<_, ShipmentRow>(
            r"
            INSERT INTO storefront.shipment
                (order_id, shipment_date, address, city, state, country, zip_code)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, order_id, shipment_date, address, city, state, country, zip_code
            ",
        )
        .bind(shipment.order_id)
        .bind(shipment.shipment_date)
        .bind(&shipment.address)
        .bind(&shipment.city)
        .bind(&shipment.state)
        .bind(&shipment.country)
        .bind(&shipment.zip_code)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(row.into())
    }

    async fn mark_order_paid(&self, id: OrderId) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            UPDATE storefront.customer_order
            SET payment_status = TRUE
            WHERE id = $1
            RETURNING id, customer_id, order_date, total_price, payment_status
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Order::from).ok_or(RepositoryError::NotFound)
    }
}
