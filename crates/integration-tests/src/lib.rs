//! Integration tests for Sugarplum.
//!
//! The tests drive the public `sugarplum-cart` API end to end against real
//! backends, with every JSON document and `SQLite` database created in a
//! per-test temporary directory. No external services are required.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sugarplum-integration-tests
//!
//! # With task logging visible
//! RUST_LOG=debug cargo test -p sugarplum-integration-tests -- --nocapture
//! ```
//!
//! # Test Categories
//!
//! - `cart_sessions` - Full shopping sessions through `CartService`,
//!   including restarts and checkout
//! - `store_contract` - Behavior shared by every `CartStore` backend
//! - `write_behind` - Save coalescing and flush semantics under rapid
//!   mutation

#![cfg_attr(not(test), forbid(unsafe_code))]

use rust_decimal::Decimal;
use sugarplum_core::{LineItem, Product, ProductImage};

/// Install a `RUST_LOG`-aware subscriber so a failing test can be rerun
/// with the save task's logging visible. Safe to call from every test;
/// only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Build a catalog-style product priced in whole cents, without an id.
/// Such products are keyed by name, like the bundled dessert catalog.
#[must_use]
pub fn dessert(name: &str, cents: i64) -> Product {
    Product {
        id: None,
        name: name.to_string(),
        category: "Dessert".to_string(),
        price: Decimal::new(cents, 2),
        image: ProductImage::default(),
    }
}

/// Build a stored cart record with an explicit quantity, for seeding
/// backends directly.
#[must_use]
pub fn stored_line(id: &str, cents: i64, quantity: u32) -> LineItem {
    LineItem {
        quantity,
        ..LineItem::new(id, id, "Dessert", Decimal::new(cents, 2), "")
    }
}
