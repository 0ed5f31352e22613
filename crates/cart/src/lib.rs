//! Sugarplum Cart - Cart engine with pluggable persistence.
//!
//! The in-memory cart is the source of truth for a session. Every mutation
//! updates it synchronously and publishes a snapshot to a background save
//! task that keeps the persistence backend caught up (write-behind). Two
//! backends ship behind one interface: a flat JSON document and a
//! transactional `SQLite` record store.
//!
//! # Modules
//!
//! - [`service`] - The cart engine, [`CartService`]
//! - [`store`] - Persistence backends behind the [`store::CartStore`] trait
//! - [`write_behind`] - The background save queue
//! - [`catalog`] - Product listing with bundled dessert data
//! - [`config`] - Environment-driven configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod service;
pub mod store;
pub mod write_behind;

pub use catalog::{Catalog, CatalogError};
pub use config::{CartConfig, ConfigError};
pub use service::CartService;
pub use store::{CartStore, JsonFileStore, SqliteStore, StoreError};

// Core types callers use alongside the service.
pub use sugarplum_core::{Cart, LineItem, OrderSummary, PricingPolicy, Product, ProductImage};
