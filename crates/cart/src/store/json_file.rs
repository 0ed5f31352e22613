//! Flat-file persistence: the whole cart as one JSON document.

use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::{instrument, warn};

use sugarplum_core::LineItem;

use super::{CartStore, StoreError};

/// Default file name under the configured data directory.
pub const CART_FILE_NAME: &str = "cart.json";

/// Stores the cart as one JSON array in a single file.
///
/// Saves are synchronous filesystem writes: the document goes to a temp
/// file in the same directory first and is moved into place with a rename,
/// so a torn write cannot leave a half-written document behind. A missing
/// or unparsable document loads as the empty cart.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store backed by this file path. The filesystem is not
    /// touched until `initialize` or the first operation.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file the cart is persisted in.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_document(&self, json: &str) -> Result<(), StoreError> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

#[async_trait]
impl CartStore for JsonFileStore {
    #[instrument(skip(self))]
    async fn initialize(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn load(&self) -> Result<Vec<LineItem>, StoreError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };
        match serde_json::from_str(&json) {
            Ok(items) => Ok(items),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "Stored cart document is unreadable, starting empty");
                Ok(Vec::new())
            }
        }
    }

    #[instrument(skip_all, fields(items = items.len()))]
    async fn save(&self, items: &[LineItem]) -> Result<(), StoreError> {
        let json =
            serde_json::to_string_pretty(items).map_err(|e| StoreError::Decode(e.to_string()))?;
        self.write_document(&json)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}
