//! Catalog product types.
//!
//! A [`Product`] is what the dessert listing shows and what a cart line
//! item is captured from. The shapes here mirror the catalog data file
//! (`name`, `category`, `price`, responsive `image` set) with an optional
//! `id`; data sets without explicit ids key products by name instead.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Responsive image set for a catalog product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub thumbnail: String,
    pub mobile: String,
    pub tablet: String,
    pub desktop: String,
}

/// One product in the dessert catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Stable identifier; `None` when the data set omits it. Use
    /// [`Product::key`] rather than reading this directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: ProductImage,
}

impl Product {
    /// The key cart entries for this product are stored under: the id when
    /// set, otherwise the name.
    #[must_use]
    pub fn key(&self) -> &str {
        match &self.id {
            Some(id) if !id.is_empty() => id,
            _ => &self.name,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_catalog_record_with_numeric_price() {
        let json = r#"{
            "image": {
                "thumbnail": "./assets/images/image-waffle-thumbnail.jpg",
                "mobile": "./assets/images/image-waffle-mobile.jpg",
                "tablet": "./assets/images/image-waffle-tablet.jpg",
                "desktop": "./assets/images/image-waffle-desktop.jpg"
            },
            "name": "Waffle with Berries",
            "category": "Waffle",
            "price": 6.5
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert!(product.id.is_none());
        assert_eq!(product.name, "Waffle with Berries");
        assert_eq!(product.price, Decimal::new(65, 1));
        assert_eq!(
            product.image.thumbnail,
            "./assets/images/image-waffle-thumbnail.jpg"
        );
    }

    #[test]
    fn test_key_falls_back_to_name() {
        let product = Product {
            id: None,
            name: "Classic Tiramisu".to_string(),
            category: "Tiramisu".to_string(),
            price: Decimal::new(550, 2),
            image: ProductImage::default(),
        };
        assert_eq!(product.key(), "Classic Tiramisu");
    }

    #[test]
    fn test_key_prefers_id() {
        let product = Product {
            id: Some("tiramisu".to_string()),
            name: "Classic Tiramisu".to_string(),
            category: "Tiramisu".to_string(),
            price: Decimal::new(550, 2),
            image: ProductImage::default(),
        };
        assert_eq!(product.key(), "tiramisu");
    }
}
