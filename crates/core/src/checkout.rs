//! Checkout figures.
//!
//! The order confirmation panel derives four numbers from the cart:
//! subtotal, shipping, tax, and their sum. They are recomputed from the
//! cart contents on every call and never persisted, so a stored cart can
//! never disagree with the policy in effect when it is shown.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::cart::Cart;
use crate::totals::total_price;

/// Flat-rate pricing rules applied at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingPolicy {
    /// Orders at or above this subtotal ship free.
    pub free_shipping_threshold: Decimal,
    /// Charged whenever the subtotal is below the threshold.
    pub shipping_fee: Decimal,
    /// Fraction of the subtotal, e.g. 0.07 for 7%.
    pub tax_rate: Decimal,
}

impl Default for PricingPolicy {
    /// The stock dessert-shop rates: free shipping from 50.00, a 5.00 fee
    /// below that, 7% tax.
    fn default() -> Self {
        Self {
            free_shipping_threshold: Decimal::new(5000, 2),
            shipping_fee: Decimal::new(500, 2),
            tax_rate: Decimal::new(7, 2),
        }
    }
}

/// The figures shown on the order confirmation panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    /// Tax on the subtotal, rounded half-up to cents.
    pub tax: Decimal,
    pub total: Decimal,
}

impl OrderSummary {
    /// Compute the summary for the current cart contents.
    ///
    /// An empty cart yields an all-zero summary; no shipping fee is
    /// charged on nothing.
    #[must_use]
    pub fn compute(cart: &Cart, policy: &PricingPolicy) -> Self {
        if cart.is_empty() {
            return Self::default();
        }
        let subtotal = total_price(cart);
        let shipping = if subtotal >= policy.free_shipping_threshold {
            Decimal::ZERO
        } else {
            policy.shipping_fee
        };
        let tax = (subtotal * policy.tax_rate)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        Self {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }
}
