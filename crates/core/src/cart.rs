//! The cart collection and its line items.
//!
//! A [`Cart`] is an ordered collection of [`LineItem`]s keyed by the item's
//! id, with insertion order preserved and at most one entry per key.
//! Repeat adds merge into the existing entry instead of duplicating it, and
//! an entry whose quantity would drop to zero is removed rather than stored.
//!
//! Everything here is pure in-memory state; persistence lives in the cart
//! engine crate.

use indexmap::IndexMap;
use indexmap::map::Entry;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;

/// One product entry in the cart.
///
/// Display fields and the unit price are captured at add-time and never
/// re-synced from the catalog. Stored records from older cart layouts may
/// lack some fields; the serde defaults fill those in (`price` 0,
/// `quantity` 1, empty `image`) so a partial record still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Stable key of the underlying catalog item. Older persisted layouts
    /// keyed records by name only; those load with an empty id and are
    /// re-keyed by name during [`Cart::hydrate`].
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub category: String,
    /// Unit price captured at add-time. Non-negative.
    #[serde(default)]
    pub price: Decimal,
    /// Always >= 1 while the item is stored in a cart.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Display image reference captured at add-time.
    #[serde(default)]
    pub image: String,
}

const fn default_quantity() -> u32 {
    1
}

impl LineItem {
    /// Create a line item for a first add, with quantity 1.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        price: Decimal,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            price,
            quantity: 1,
            image: image.into(),
        }
    }

    /// Line total for this entry (`price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

impl From<&Product> for LineItem {
    /// Capture a catalog product as a cart entry, keyed by
    /// [`Product::key`] and carrying the thumbnail as display image.
    fn from(product: &Product) -> Self {
        Self::new(
            product.key(),
            &product.name,
            &product.category,
            product.price,
            &product.image.thumbnail,
        )
    }
}

/// The ordered, key-unique collection of line items for one session.
///
/// Invariants upheld by every mutation:
/// - at most one [`LineItem`] per key;
/// - every stored quantity is >= 1;
/// - insertion order is preserved across removals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: IndexMap<String, LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from persisted records.
    ///
    /// Records are sanitized on the way in: an empty id is replaced by the
    /// record's name (older layouts keyed by name only), a record whose
    /// quantity is 0 is dropped, and a duplicate key keeps its first
    /// position with the later record's fields.
    #[must_use]
    pub fn hydrate(records: impl IntoIterator<Item = LineItem>) -> Self {
        let mut items = IndexMap::new();
        for mut record in records {
            if record.quantity == 0 {
                continue;
            }
            if record.id.is_empty() {
                record.id = record.name.clone();
            }
            items.insert(record.id.clone(), record);
        }
        Self { items }
    }

    /// Merge a line item into the cart.
    ///
    /// If an entry with the same id exists, its quantity is incremented by
    /// one and the incoming fields are discarded (first-add price, name,
    /// category, and image win). Otherwise the item is inserted at the end
    /// with quantity 1, regardless of the quantity on the passed value.
    pub fn add(&mut self, item: LineItem) {
        match self.items.entry(item.id.clone()) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                existing.quantity = existing.quantity.saturating_add(1);
            }
            Entry::Vacant(entry) => {
                entry.insert(LineItem {
                    quantity: 1,
                    ..item
                });
            }
        }
    }

    /// Remove the entry with this key, returning it if it was present.
    ///
    /// Removing an absent key is a no-op, not an error. Remaining entries
    /// keep their relative order.
    pub fn remove(&mut self, key: &str) -> Option<LineItem> {
        self.items.shift_remove(key)
    }

    /// Apply a quantity delta to the entry with this key.
    ///
    /// If the resulting quantity is <= 0 the entry is removed entirely.
    /// An absent key is a no-op.
    pub fn update_quantity(&mut self, key: &str, delta: i64) {
        let Some(item) = self.items.get_mut(key) else {
            return;
        };
        let updated = i64::from(item.quantity).saturating_add(delta);
        if updated <= 0 {
            self.items.shift_remove(key);
        } else {
            item.quantity = u32::try_from(updated).unwrap_or(u32::MAX);
        }
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Look up an entry by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&LineItem> {
        self.items.get(key)
    }

    /// Whether an entry with this key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    /// Number of distinct entries (not the summed quantity; see
    /// [`crate::totals::total_items`] for that).
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.values()
    }

    /// Clone the entries out in insertion order, for a persistence write.
    #[must_use]
    pub fn snapshot(&self) -> Vec<LineItem> {
        self.items.values().cloned().collect()
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = indexmap::map::Values<'a, String, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.values()
    }
}
