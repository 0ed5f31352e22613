//! Sugarplum Core - Shared cart types library.
//!
//! This crate provides the types and pure functions shared by every
//! Sugarplum component:
//! - `cart` - The line-item collection and its invariants
//! - `catalog` - Product records as shipped in the storefront catalog
//! - `totals` - Aggregation over a cart (item count, subtotal)
//! - `checkout` - Derived order figures (shipping, tax, total)
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! storage access, no async. This keeps it lightweight and lets the cart
//! engine and its tests run headlessly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod totals;

pub use cart::{Cart, LineItem};
pub use catalog::{Product, ProductImage};
pub use checkout::{OrderSummary, PricingPolicy};
pub use totals::{total_items, total_price};
