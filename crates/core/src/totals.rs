//! Aggregation over cart line items.
//!
//! The order summary badge and the checkout panel both derive from these
//! two numbers. Arithmetic is exact decimal, so totals do not drift with
//! item count or ordering.

use rust_decimal::Decimal;

use crate::cart::LineItem;

/// Total unit count across the cart: the sum of entry quantities, not the
/// number of distinct entries.
#[must_use]
pub fn total_items<'a>(items: impl IntoIterator<Item = &'a LineItem>) -> u64 {
    items
        .into_iter()
        .map(|item| u64::from(item.quantity))
        .sum()
}

/// Monetary sum of `price * quantity` across the cart.
#[must_use]
pub fn total_price<'a>(items: impl IntoIterator<Item = &'a LineItem>) -> Decimal {
    items.into_iter().map(LineItem::line_total).sum()
}
