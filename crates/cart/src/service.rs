//! The cart engine: in-memory state plus write-behind persistence.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{instrument, warn};

use sugarplum_core::{Cart, LineItem, OrderSummary, PricingPolicy, Product, totals};

use crate::store::{CartStore, StoreError};
use crate::write_behind::WriteBehind;

/// Authoritative cart state for one session.
///
/// Mutations are synchronous: they update the in-memory cart and publish a
/// snapshot to the background save task, then return immediately so the
/// caller can re-render. Reads always reflect the latest mutation
/// regardless of whether the store has caught up. A crash between a
/// mutation and its write can lose that one change on reload; nothing in
/// this domain needs stronger durability.
///
/// Save failures never surface from mutations. They are logged by the save
/// task and reported by the next [`CartService::flush`] or
/// [`CartService::close`].
#[derive(Debug)]
pub struct CartService<S: CartStore> {
    cart: Cart,
    store: Arc<S>,
    pump: WriteBehind,
}

impl<S: CartStore> CartService<S> {
    /// Create a service over this store with an empty cart.
    ///
    /// Spawns the background save task, so this must be called within a
    /// tokio runtime. The store is not touched until `load` or the first
    /// mutation; use [`CartService::open`] to also hydrate in one step.
    #[must_use]
    pub fn new(store: S) -> Self {
        let store = Arc::new(store);
        let pump = WriteBehind::spawn(Arc::clone(&store));
        Self {
            cart: Cart::new(),
            store,
            pump,
        }
    }

    /// Create a service, prepare the store, and hydrate the cart from it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store cannot be opened,
    /// or another [`StoreError`] if reading it fails outright. Callers that
    /// prefer degraded in-memory-only operation can fall back to
    /// [`CartService::new`].
    pub async fn open(store: S) -> Result<Self, StoreError> {
        let mut service = Self::new(store);
        service.store.initialize().await?;
        service.load().await?;
        Ok(service)
    }

    // ===== Mutations =====

    /// Merge a catalog product into the cart: a repeat add increments the
    /// existing entry's quantity, a first add inserts it with quantity 1
    /// and captures the product's fields as they are now.
    pub fn add_item(&mut self, product: &Product) -> &Cart {
        self.cart.add(LineItem::from(product));
        self.persist();
        &self.cart
    }

    /// Raw form of [`CartService::add_item`] for callers holding the five
    /// fields rather than a catalog product. Same merge semantics.
    pub fn add_line(
        &mut self,
        key: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        price: Decimal,
        image: impl Into<String>,
    ) -> &Cart {
        self.cart.add(LineItem::new(key, name, category, price, image));
        self.persist();
        &self.cart
    }

    /// Remove the entry with this key. An absent key is a no-op.
    pub fn remove_item(&mut self, key: &str) -> &Cart {
        self.cart.remove(key);
        self.persist();
        &self.cart
    }

    /// Apply a quantity delta; the entry is removed when the result would
    /// be zero or less. An absent key is a no-op.
    pub fn update_quantity(&mut self, key: &str, delta: i64) -> &Cart {
        self.cart.update_quantity(key, delta);
        self.persist();
        &self.cart
    }

    /// Empty the cart.
    pub fn clear(&mut self) -> &Cart {
        self.cart.clear();
        self.persist();
        &self.cart
    }

    /// Compute the order summary for the current contents, then start a
    /// new order by emptying the cart. Returns the pre-clear summary for
    /// the confirmation panel.
    pub fn checkout(&mut self, policy: &PricingPolicy) -> OrderSummary {
        let summary = OrderSummary::compute(&self.cart, policy);
        self.cart.clear();
        self.persist();
        summary
    }

    // ===== Reads =====

    /// The current cart contents.
    #[must_use]
    pub fn items(&self) -> &Cart {
        &self.cart
    }

    /// Sum of quantities across the cart.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        totals::total_items(&self.cart)
    }

    /// Sum of `price * quantity` across the cart.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        totals::total_price(&self.cart)
    }

    // ===== Persistence =====

    /// Replace the in-memory cart with whatever the store holds.
    ///
    /// Pending writes are drained first so a just-made mutation cannot be
    /// read back stale; a failure there is logged and the reload proceeds.
    /// Invalid stored records are dropped during hydration (logged at
    /// WARN). Nothing stored means an empty cart, not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store cannot be read at all.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<&Cart, StoreError> {
        if let Err(e) = self.pump.flush().await {
            warn!(error = %e, "Pending cart writes failed before reload");
        }
        let records = self.store.load().await?;
        let stored = records.len();
        self.cart = Cart::hydrate(records);
        if self.cart.len() < stored {
            warn!(
                dropped = stored - self.cart.len(),
                "Dropped invalid stored cart records"
            );
        }
        Ok(&self.cart)
    }

    /// Wait for every mutation made so far to reach the store.
    ///
    /// # Errors
    ///
    /// Returns the most recent write failure, once; the in-memory cart is
    /// unaffected either way.
    pub async fn flush(&mut self) -> Result<(), StoreError> {
        self.pump.flush().await
    }

    /// Drain pending writes and stop the background save task.
    ///
    /// # Errors
    ///
    /// Returns the most recent write failure, as [`CartService::flush`]
    /// does.
    pub async fn close(self) -> Result<(), StoreError> {
        self.pump.close().await
    }

    fn persist(&mut self) {
        self.pump.enqueue(self.cart.snapshot());
    }
}
