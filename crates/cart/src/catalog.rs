//! The dessert catalog.
//!
//! Products are loaded once at startup and never re-read; the cart
//! captures what it needs from a product at add-time. The crate ships a
//! catalog document (nine desserts with four image sizes each) so callers
//! without their own data can start immediately.

use std::path::Path;
use std::sync::LazyLock;

use thiserror::Error;

use sugarplum_core::Product;

const BUNDLED_DATA: &str = include_str!("../data/desserts.json");

static BUNDLED: LazyLock<Catalog> =
    LazyLock::new(|| Catalog::parse(BUNDLED_DATA).expect("Invalid bundled catalog"));

/// Errors that can occur while loading a catalog document.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// An immutable product listing.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// The catalog shipped with the crate.
    ///
    /// Parsed once on first use; the shipped document is covered by tests,
    /// so a parse failure here is a packaging defect and panics.
    #[must_use]
    pub fn bundled() -> &'static Self {
        &BUNDLED
    }

    /// Load a catalog from an external JSON document holding an array of
    /// products.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read and
    /// [`CatalogError::Parse`] if it is not a valid product array.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|e| CatalogError::Io(e.to_string()))?;
        Self::parse(&json)
    }

    fn parse(json: &str) -> Result<Self, CatalogError> {
        let products =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Ok(Self { products })
    }

    /// Look up a product by its cart key (the id, or the name for id-less
    /// data sets).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Product> {
        self.products.iter().find(|product| product.key() == key)
    }

    /// Number of products in the listing.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Iterate products in listing order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    #[test]
    fn test_bundled_catalog_parses_and_is_complete() {
        let catalog = Catalog::bundled();
        assert_eq!(catalog.len(), 9);
        for product in catalog {
            assert!(!product.name.is_empty());
            assert!(!product.category.is_empty());
            assert!(product.price > Decimal::ZERO);
            assert!(!product.image.thumbnail.is_empty());
            assert!(!product.image.desktop.is_empty());
        }
    }

    #[test]
    fn test_bundled_products_are_keyed_by_name() {
        let catalog = Catalog::bundled();
        let waffle = catalog.get("Waffle with Berries").unwrap();
        assert_eq!(waffle.key(), "Waffle with Berries");
        assert_eq!(waffle.price, Decimal::new(65, 1));
        assert!(catalog.get("No Such Dessert").is_none());
    }

    #[test]
    fn test_bundled_listing_order_is_preserved() {
        let names: Vec<&str> = Catalog::bundled()
            .iter()
            .map(|product| product.name.as_str())
            .collect();
        assert_eq!(names.first(), Some(&"Waffle with Berries"));
        assert_eq!(names.last(), Some(&"Vanilla Panna Cotta"));
    }

    #[test]
    fn test_from_path_reads_external_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"[{"id": "fudge", "name": "Fudge", "category": "Fudge", "price": "3.25"}]"#,
        )
        .unwrap();

        let catalog = Catalog::from_path(&path).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("fudge").unwrap().price, Decimal::new(325, 2));
    }

    #[test]
    fn test_from_path_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = Catalog::from_path(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }

    #[test]
    fn test_from_path_rejects_malformed_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{not an array").unwrap();
        let err = Catalog::from_path(&path).unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }
}
