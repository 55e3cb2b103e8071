//! Checkout pricing policy and order-total arithmetic.
//!
//! The tax rate, free-shipping threshold, and flat shipping fee are business
//! policy. The defaults reproduce the storefront's established behaviour
//! (16% tax, free shipping from 1000, otherwise a flat 99), but every value
//! is configurable at startup.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Pricing policy applied when an order is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutPolicy {
    /// Fraction of the subtotal charged as tax.
    pub tax_rate: Decimal,
    /// Subtotals at or above this ship for free.
    pub free_shipping_threshold: Decimal,
    /// Flat fee charged below the threshold.
    pub flat_shipping_fee: Decimal,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        Self {
            tax_rate: dec!(0.16),
            free_shipping_threshold: dec!(1000),
            flat_shipping_fee: dec!(99),
        }
    }
}

/// Computed money breakdown for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    /// Sum of line totals.
    pub subtotal: Decimal,
    /// `subtotal * tax_rate`.
    pub tax: Decimal,
    /// Zero at or above the free-shipping threshold, else the flat fee.
    pub shipping: Decimal,
    /// `subtotal + tax + shipping`.
    pub total: Decimal,
}

impl CheckoutPolicy {
    /// Compute the full money breakdown for a subtotal.
    pub fn totals(&self, subtotal: Decimal) -> OrderTotals {
        let tax = subtotal * self.tax_rate;
        let shipping = if subtotal >= self.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.flat_shipping_fee
        };
        OrderTotals {
            subtotal,
            tax,
            shipping,
            total: subtotal + tax + shipping,
        }
    }
}
