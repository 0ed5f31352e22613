//! Transactional persistence: one `cart_items` row per line item.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tokio::sync::OnceCell;
use tracing::{instrument, warn};

use sugarplum_core::LineItem;

use super::{CartStore, StoreError};

/// Default database file name under the configured data directory.
pub const CART_DB_NAME: &str = "cart.db";

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS cart_items (
    key      TEXT PRIMARY KEY,
    name     TEXT NOT NULL,
    category TEXT NOT NULL,
    price    TEXT NOT NULL,
    quantity INTEGER NOT NULL,
    image    TEXT NOT NULL,
    position INTEGER NOT NULL
)";

/// Stores the cart in a `SQLite` database, one row per line item.
///
/// The database is opened lazily, exactly once per store instance:
/// concurrent first operations share one in-flight open, and a failed open
/// leaves the store unopened so the next operation retries it. Every save
/// replaces the full record set inside a single transaction, so a
/// concurrent load never observes a mix of old and new rows.
///
/// Prices are stored as text and parsed back through [`Decimal`]; `SQLite`
/// has no native decimal type. Share the store behind an `Arc` rather than
/// cloning it, so the open-once guarantee covers all users.
#[derive(Debug)]
pub struct SqliteStore {
    path: PathBuf,
    pool: OnceCell<SqlitePool>,
}

impl SqliteStore {
    /// Create a store backed by this database file. The file is not opened
    /// until `initialize` or the first operation.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pool: OnceCell::new(),
        }
    }

    /// The database file the cart is persisted in.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn pool(&self) -> Result<&SqlitePool, StoreError> {
        self.pool.get_or_try_init(|| Self::open(&self.path)).await
    }

    async fn open(path: &Path) -> Result<SqlitePool, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        // One connection is enough; SQLite serializes writers regardless.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(pool)
    }
}

#[async_trait]
impl CartStore for SqliteStore {
    #[instrument(skip(self))]
    async fn initialize(&self) -> Result<(), StoreError> {
        self.pool().await.map(|_| ())
    }

    #[instrument(skip(self))]
    async fn load(&self) -> Result<Vec<LineItem>, StoreError> {
        let pool = self.pool().await?;
        let rows = sqlx::query(
            "SELECT key, name, category, price, quantity, image FROM cart_items ORDER BY position",
        )
        .fetch_all(pool)
        .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let price_text: String = row.try_get("price")?;
            let Ok(price) = price_text.parse::<Decimal>() else {
                warn!(price = %price_text, "Stored cart rows are unreadable, starting empty");
                return Ok(Vec::new());
            };
            let quantity: i64 = row.try_get("quantity")?;
            let Ok(quantity) = u32::try_from(quantity) else {
                warn!(quantity, "Stored cart rows are unreadable, starting empty");
                return Ok(Vec::new());
            };
            items.push(LineItem {
                id: row.try_get("key")?,
                name: row.try_get("name")?,
                category: row.try_get("category")?,
                price,
                quantity,
                image: row.try_get("image")?,
            });
        }
        Ok(items)
    }

    #[instrument(skip_all, fields(items = items.len()))]
    async fn save(&self, items: &[LineItem]) -> Result<(), StoreError> {
        let pool = self.pool().await?;
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM cart_items")
            .execute(&mut *tx)
            .await?;

        for (position, item) in items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO cart_items (key, name, category, price, quantity, image, position) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(&item.id)
            .bind(&item.name)
            .bind(&item.category)
            .bind(item.price.to_string())
            .bind(i64::from(item.quantity))
            .bind(&item.image)
            .bind(i64::try_from(position).unwrap_or(i64::MAX))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<(), StoreError> {
        let pool = self.pool().await?;
        sqlx::query("DELETE FROM cart_items").execute(pool).await?;
        Ok(())
    }
}
