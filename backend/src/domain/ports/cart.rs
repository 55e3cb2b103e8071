//! Driving ports for cart operations.
//!
//! Every mutation returns the refreshed cart so clients can re-render
//! without a second round trip.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::cart::{CartLine, CartView};
use crate::domain::product::ProductId;
use crate::domain::user::Caller;
use crate::domain::Error;

use super::catalogue::ProductPayload;

/// One cart line as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLinePayload {
    /// The referenced product in its current state.
    pub product: ProductPayload,
    /// Requested quantity.
    pub quantity: i32,
    /// Quantity times the product's current price.
    #[schema(value_type = String, example = "998.00")]
    pub line_subtotal: Decimal,
}

impl From<CartLine> for CartLinePayload {
    fn from(line: CartLine) -> Self {
        let line_subtotal = line.line_subtotal();
        Self {
            product: line.product.into(),
            quantity: line.quantity,
            line_subtotal,
        }
    }
}

/// The caller's cart as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartPayload {
    pub items: Vec<CartLinePayload>,
    /// Sum of line subtotals at current prices.
    #[schema(value_type = String, example = "1047.50")]
    pub subtotal: Decimal,
}

impl From<CartView> for CartPayload {
    fn from(view: CartView) -> Self {
        let subtotal = view.subtotal();
        Self {
            items: view.lines.into_iter().map(CartLinePayload::from).collect(),
            subtotal,
        }
    }
}

impl CartPayload {
    /// An empty cart.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: Decimal::ZERO,
        }
    }
}

/// Request body for adding a product to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    /// The product to add.
    pub product_id: ProductId,
    /// Quantity to add on top of any existing line; defaults to 1.
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

const fn default_quantity() -> i32 {
    1
}

/// Request body for replacing a line's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemRequest {
    /// The new quantity, at least 1.
    pub quantity: i32,
}

/// Driving port for cart reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartQuery: Send + Sync {
    /// The caller's cart; lines whose product went inactive are dropped.
    async fn get_cart(&self, caller: Caller) -> Result<CartPayload, Error>;
}

/// Driving port for cart mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartCommand: Send + Sync {
    /// Add quantity to the caller's line for a product, creating it when
    /// absent.
    ///
    /// # Errors
    ///
    /// Rejects non-positive quantities as invalid, unknown or inactive
    /// products as not found, and requests beyond current stock as
    /// [`crate::domain::ErrorCode::InsufficientStock`]. Stock is only
    /// reserved at checkout.
    async fn add_item(
        &self,
        caller: Caller,
        request: AddCartItemRequest,
    ) -> Result<CartPayload, Error>;

    /// Replace the quantity of an existing line.
    async fn set_item_quantity(
        &self,
        caller: Caller,
        product_id: ProductId,
        request: UpdateCartItemRequest,
    ) -> Result<CartPayload, Error>;

    /// Remove one line.
    async fn remove_item(
        &self,
        caller: Caller,
        product_id: ProductId,
    ) -> Result<CartPayload, Error>;

    /// Remove every line.
    async fn clear_cart(&self, caller: Caller) -> Result<CartPayload, Error>;
}

/// Fixture query for handler tests that do not exercise the cart.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCartQuery;

#[async_trait]
impl CartQuery for FixtureCartQuery {
    async fn get_cart(&self, _caller: Caller) -> Result<CartPayload, Error> {
        Ok(CartPayload::empty())
    }
}

/// Fixture command for handler tests that do not exercise cart writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCartCommand;

#[async_trait]
impl CartCommand for FixtureCartCommand {
    async fn add_item(
        &self,
        _caller: Caller,
        request: AddCartItemRequest,
    ) -> Result<CartPayload, Error> {
        Err(Error::not_found(format!(
            "product {} not found",
            request.product_id
        )))
    }

    async fn set_item_quantity(
        &self,
        _caller: Caller,
        product_id: ProductId,
        _request: UpdateCartItemRequest,
    ) -> Result<CartPayload, Error> {
        Err(Error::not_found(format!("product {product_id} not found")))
    }

    async fn remove_item(
        &self,
        _caller: Caller,
        product_id: ProductId,
    ) -> Result<CartPayload, Error> {
        Err(Error::not_found(format!("product {product_id} not found")))
    }

    async fn clear_cart(&self, _caller: Caller) -> Result<CartPayload, Error> {
        Ok(CartPayload::empty())
    }
}
