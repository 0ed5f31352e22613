//! Persistence backends for cart state.
//!
//! Two stores implement the same contract:
//!
//! - [`JsonFileStore`] - the whole cart as one JSON document in a single
//!   file, replaced wholesale on every save.
//! - [`SqliteStore`] - one row per line item in a `cart_items` table,
//!   replaced transactionally on every save.
//!
//! Both are driven through the write-behind pump (see
//! [`crate::write_behind`]), which serializes saves so an older snapshot can
//! never overwrite a newer one.

pub mod json_file;
pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use sugarplum_core::LineItem;

pub use json_file::JsonFileStore;
pub use sqlite::SqliteStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be opened or reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem error from the flat-file store.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Data could not be serialized for storage or parsed back out of it.
    #[error("decode failure: {0}")]
    Decode(String),
}

/// A durable home for the cart between sessions.
///
/// All methods take `&self` so implementations can be shared behind an
/// `Arc` between the owning service and the background save task.
#[async_trait]
pub trait CartStore: Send + Sync + 'static {
    /// Prepare the backing store (create directories, open the database).
    ///
    /// Idempotent and safe to call concurrently: overlapping calls share
    /// one in-flight setup and all observe the same ready state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store cannot be opened.
    async fn initialize(&self) -> Result<(), StoreError>;

    /// Read the full persisted collection, in insertion order.
    ///
    /// Nothing stored means an empty collection, not an error. Stored data
    /// that cannot be parsed also loads as empty (fail open, logged at
    /// WARN) so a corrupt store never takes the cart down with it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] or a backend error if the store
    /// cannot be reached at all.
    async fn load(&self) -> Result<Vec<LineItem>, StoreError>;

    /// Replace the persisted collection with this one.
    ///
    /// After a successful save, `load` reflects exactly the saved set;
    /// a concurrent `load` never observes a mix of old and new records.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the replacement could not be completed.
    async fn save(&self, items: &[LineItem]) -> Result<(), StoreError>;

    /// Remove all persisted records. Removing an already-empty store is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the removal fails.
    async fn clear(&self) -> Result<(), StoreError>;
}
