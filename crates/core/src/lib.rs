//! Corner Store Core - Shared domain types.
//!
//! This crate provides the value types used across all Corner Store components:
//! - `storefront` - Customer-facing shop and staff catalog pages
//! - `cli` - Migrations and administrative record creation
//!
//! # Architecture
//!
//! The core crate contains only types and parsing rules - no I/O, no database
//! access, no HTTP. With the `postgres` feature enabled the types also encode
//! and decode through sqlx.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, SKUs, prices, usernames and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
