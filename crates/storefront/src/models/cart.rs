//! Shopping cart lines.

use rust_decimal::Decimal;
use serde::Serialize;

use corner_store_core::{CartLineId, CustomerId, ProductId};

use super::Product;

/// One row of a customer's cart. At most one per (customer, product).
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A cart line joined with its product, for display.
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    pub line: CartLine,
    pub product: Product,
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price.times(self.line.quantity)
    }
}

/// A customer's whole cart in insertion order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.line.quantity).sum()
    }

    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use corner_store_core::{CategoryId, Price, Sku};

    use super::*;

    fn item(id: i32, cents: u32, quantity: u32) -> CartItem {
        CartItem {
            line: CartLine {
                id: CartLineId::new(id),
                customer_id: CustomerId::new(1),
                product_id: ProductId::new(id),
                quantity,
            },
            product: Product {
                id: ProductId::new(id),
                sku: Sku::parse(&format!("SKU-{id}")).unwrap(),
                name: format!("Product {id}"),
                description: String::new(),
                price: Price::from_cents(cents),
                stock: 10,
                category_id: CategoryId::new(1),
                image: None,
            },
        }
    }

    #[test]
    fn test_subtotal_and_count() {
        let cart = Cart {
            items: vec![item(1, 250, 2), item(2, 1000, 1)],
        };
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal(), Decimal::new(1500, 2));
    }

    #[test]
    fn test_empty_cart() {
        let cart = Cart::default();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Decimal::ZERO);
    }
}
