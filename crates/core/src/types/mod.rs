//! Core types for Corner Store.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod sku;
pub mod status;
pub mod username;

pub use id::*;
pub use price::{Price, PriceError};
pub use sku::{Sku, SkuError};
pub use status::*;
pub use username::{Username, UsernameError};
