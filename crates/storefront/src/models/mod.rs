//! Domain models for the storefront.
//!
//! These are the shapes handlers, services and templates work with. The
//! persistence layer converts its rows into them; see [`crate::db`].

pub mod account;
pub mod cart;
pub mod catalog;
pub mod customer;
pub mod order;
pub mod session;
pub mod wishlist;

pub use account::Account;
pub use cart::{Cart, CartItem, CartLine};
pub use catalog::{Category, NewCategory, NewProduct, Product};
pub use customer::{Customer, ProfileUpdate};
pub use order::{
    NewOrderItem, NewPayment, NewShipment, Order, OrderDetail, OrderItem, OrderLine, Payment,
    Shipment,
};
pub use session::{CurrentAccount, keys as session_keys};
pub use wishlist::{WishlistItem, WishlistLine};
