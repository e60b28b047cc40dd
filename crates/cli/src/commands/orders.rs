//! Administrative order, payment and shipment commands.
//!
//! Orders are never created by the web checkout; staff record them here.
//!
//! # Usage
//!
//! ```bash
//! cs-cli order create -c 3 -i 12:2 -i 7:1
//! cs-cli order mark-paid 41
//! cs-cli payment record -o 41 -m card -a 23.50
//! cs-cli shipment record -o 41 --address "1 Main St" --city Springfield \
//!     --state IL --country US --zip 62701
//! ```

use chrono::{DateTime, Utc};

use corner_store_core::{CustomerId, OrderId, ProductId};
use corner_store_storefront::forms::{PaymentForm, ShipmentForm};
use corner_store_storefront::services::OrderService;

use super::{CommandError, store};

/// Parse a `<productId>:<quantity>` pair.
///
/// # Errors
///
/// Returns a message suitable for clap when either half is malformed.
pub fn parse_item(s: &str) -> Result<(ProductId, u32), String> {
    let (product, quantity) = s
        .split_once(':')
        .ok_or_else(|| format!("expected <productId>:<quantity>, got `{s}`"))?;
    let product: ProductId = product
        .parse()
        .map_err(|_| format!("invalid product id `{product}`"))?;
    let quantity: u32 = quantity
        .trim()
        .parse()
        .map_err(|_| format!("invalid quantity `{quantity}`"))?;
    Ok((product, quantity))
}

/// Parse an RFC 3339 timestamp for `--date`.
///
/// # Errors
///
/// Returns a message suitable for clap when the timestamp is malformed.
pub fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 date `{s}`: {e}"))
}

/// Create an unpaid order, snapshotting current product prices.
///
/// # Errors
///
/// Returns an error for an unknown customer or product, or a zero quantity.
pub async fn create(
    customer_id: CustomerId,
    items: &[(ProductId, u32)],
) -> Result<i32, CommandError> {
    let store = store().await?;
    let order = OrderService::new(&store)
        .create_order(customer_id, items)
        .await?;

    tracing::info!("Order created successfully!");
    tracing::info!("  ID: {}", order.id);
    tracing::info!("  Customer: {}", order.customer_id);
    tracing::info!("  Total: {}", order.total_price);

    Ok(order.id.as_i32())
}

/// Flag an order as paid.
///
/// # Errors
///
/// Returns an error if the order does not exist.
pub async fn mark_paid(order_id: OrderId) -> Result<(), CommandError> {
    let store = store().await?;
    let order = OrderService::new(&store).mark_order_paid(order_id).await?;

    tracing::info!(order_id = %order.id, status = %order.payment_status, "Order updated");
    Ok(())
}

/// Record a payment against an order.
///
/// # Errors
///
/// Returns an error for a bad method or amount, or an unknown order.
pub async fn record_payment(
    order_id: OrderId,
    method: &str,
    amount: &str,
) -> Result<i32, CommandError> {
    let form = PaymentForm {
        payment_method: method.to_owned(),
        amount: amount.to_owned(),
    };

    let store = store().await?;
    let payment = OrderService::new(&store)
        .record_payment(order_id, &form)
        .await?;

    tracing::info!(
        "Payment recorded! ID: {}, Order: {}, Amount: {}",
        payment.id,
        payment.order_id,
        payment.amount
    );
    tracing::info!("Run `cs-cli order mark-paid {order_id}` once the order is settled.");

    Ok(payment.id.as_i32())
}

/// Record a shipment. Defaults the date to now.
///
/// # Errors
///
/// Returns an error for blank or over-long address parts, or an unknown order.
pub async fn record_shipment(
    order_id: Option<OrderId>,
    date: Option<DateTime<Utc>>,
    form: &ShipmentForm,
) -> Result<i32, CommandError> {
    let store = store().await?;
    let shipment = OrderService::new(&store)
        .record_shipment(order_id, date.unwrap_or_else(Utc::now), form)
        .await?;

    match shipment.order_id {
        Some(order_id) => tracing::info!("Shipment {} recorded for order {order_id}", shipment.id),
        None => tracing::info!("Shipment {} recorded (no order)", shipment.id),
    }

    Ok(shipment.id.as_i32())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item() {
        assert_eq!(parse_item("12:3").unwrap(), (ProductId::new(12), 3));
        assert_eq!(parse_item(" 4 : 1").unwrap(), (ProductId::new(4), 1));
    }

    #[test]
    fn test_parse_item_rejects_malformed() {
        assert!(parse_item("12").is_err());
        assert!(parse_item("x:1").is_err());
        assert!(parse_item("1:-2").is_err());
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("2026-03-01T10:30:00+02:00").unwrap();
        assert_eq!(date.to_rfc3339(), "2026-03-01T08:30:00+00:00");
        assert!(parse_date("yesterday").is_err());
    }
}
