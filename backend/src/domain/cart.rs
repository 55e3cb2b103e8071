//! Cart lines: ephemeral (user, product) pairs cleared on checkout.

use rust_decimal::Decimal;

use super::product::Product;
use super::user::UserId;

/// One cart line holding a live reference to its product.
///
/// Unlike an order line this is not a snapshot: displayed price and stock
/// track the current product state until checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    /// Owning account.
    pub user_id: UserId,
    /// The referenced product in its current state.
    pub product: Product,
    /// Requested quantity, at least 1.
    pub quantity: i32,
}

impl CartLine {
    /// The line subtotal at the product's current price.
    pub fn line_subtotal(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// A user's cart as shown to the storefront.
#[derive(Debug, Clone, PartialEq)]
pub struct CartView {
    /// The lines, in insertion order.
    pub lines: Vec<CartLine>,
}

impl CartView {
    /// Sum of line subtotals at current prices.
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_subtotal).sum()
    }
}
