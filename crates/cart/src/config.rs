//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `SUGARPLUM_DATA_DIR` - Directory for the persisted cart (default: `./data`)
//! - `SUGARPLUM_FREE_SHIPPING_THRESHOLD` - Subtotal from which shipping is
//!   free (default: 50.00)
//! - `SUGARPLUM_SHIPPING_FEE` - Flat shipping fee below the threshold
//!   (default: 5.00)
//! - `SUGARPLUM_TAX_RATE` - Tax as a fraction of the subtotal (default: 0.07)

use std::path::PathBuf;

use rust_decimal::Decimal;
use thiserror::Error;

use sugarplum_core::PricingPolicy;

use crate::store::json_file::CART_FILE_NAME;
use crate::store::sqlite::CART_DB_NAME;

const DEFAULT_DATA_DIR: &str = "./data";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Directory holding the persisted cart files
    pub data_dir: PathBuf,
    /// Checkout pricing rules
    pub pricing: PricingPolicy,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            pricing: PricingPolicy::default(),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present. Every
    /// variable is optional; unset ones fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable is set but does
    /// not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let data_dir = PathBuf::from(get_env_or_default("SUGARPLUM_DATA_DIR", DEFAULT_DATA_DIR));
        let defaults = PricingPolicy::default();
        let pricing = PricingPolicy {
            free_shipping_threshold: get_decimal_env(
                "SUGARPLUM_FREE_SHIPPING_THRESHOLD",
                defaults.free_shipping_threshold,
            )?,
            shipping_fee: get_decimal_env("SUGARPLUM_SHIPPING_FEE", defaults.shipping_fee)?,
            tax_rate: get_decimal_env("SUGARPLUM_TAX_RATE", defaults.tax_rate)?,
        };

        Ok(Self { data_dir, pricing })
    }

    /// Path of the flat-file store's document under the data directory.
    #[must_use]
    pub fn json_store_path(&self) -> PathBuf {
        self.data_dir.join(CART_FILE_NAME)
    }

    /// Path of the `SQLite` store's database under the data directory.
    #[must_use]
    pub fn sqlite_store_path(&self) -> PathBuf {
        self.data_dir.join(CART_DB_NAME)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a decimal environment variable with a default value.
fn get_decimal_env(key: &str, default: Decimal) -> Result<Decimal, ConfigError> {
    match std::env::var(key) {
        Ok(value) => parse_decimal(key, &value),
        Err(_) => Ok(default),
    }
}

/// Parse a decimal setting, naming the offending variable on failure.
fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    value
        .parse::<Decimal>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
