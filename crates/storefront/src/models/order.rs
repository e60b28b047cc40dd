//! Orders and their fulfillment records.
//!
//! Orders are only created administratively; the storefront renders them.
//! Payments and shipments are passive records with no gateway behind them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use corner_store_core::{
    CustomerId, OrderId, OrderItemId, PaymentId, PaymentStatus, Price, ProductId, ShipmentId,
};

/// A placed order.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub order_date: DateTime<Utc>,
    pub total_price: Price,
    pub payment_status: PaymentStatus,
}

/// A product line of an order, priced at purchase time.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Price,
}

/// An order item with the product name for display.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    pub item: OrderItem,
    pub product_name: String,
}

impl OrderLine {
    #[must_use]
    pub fn line_total(&self) -> rust_decimal::Decimal {
        self.item.price.times(self.item.quantity)
    }
}

/// A payment recorded against an order.
#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub payment_date: DateTime<Utc>,
    pub payment_method: String,
    pub amount: Price,
}

/// A shipment, optionally tied to an order.
#[derive(Debug, Clone, Serialize)]
pub struct Shipment {
    pub id: ShipmentId,
    pub order_id: Option<OrderId>,
    pub shipment_date: DateTime<Utc>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
}

/// Everything the order page shows.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub lines: Vec<OrderLine>,
    pub payments: Vec<Payment>,
    pub shipments: Vec<Shipment>,
}

/// Item to insert when creating an order; `price` is the snapshot.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Price,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub order_id: OrderId,
    pub payment_method: String,
    pub amount: Price,
}

#[derive(Debug, Clone)]
pub struct NewShipment {
    pub order_id: Option<OrderId>,
    pub shipment_date: DateTime<Utc>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
}
