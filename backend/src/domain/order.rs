//! Order aggregate: line-item snapshots, status lifecycle, and history.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::product::ProductId;
use super::user::UserId;

/// Stable order identifier stored as a UUID.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Order lifecycle status.
///
/// `pending` is the initial state; `delivered` and `cancelled` are terminal.
/// Customers may only move `pending`/`processing` orders to `cancelled`;
/// admin transitions are deliberately unrestricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Stable string form used in storage and on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the owning customer may still cancel the order.
    pub const fn customer_may_cancel(self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct OrderStatusParseError(pub String);

impl FromStr for OrderStatus {
    type Err = OrderStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(OrderStatusParseError(other.to_owned())),
        }
    }
}

/// Accepted payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Card,
    Paypal,
    Transfer,
    Cash,
}

impl PaymentMethod {
    /// Stable string form used in storage and on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Paypal => "paypal",
            Self::Transfer => "transfer",
            Self::Cash => "cash",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown payment method string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown payment method: {0}")]
pub struct PaymentMethodParseError(pub String);

impl FromStr for PaymentMethod {
    type Err = PaymentMethodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(Self::Card),
            "paypal" => Ok(Self::Paypal),
            "transfer" => Ok(Self::Transfer),
            "cash" => Ok(Self::Cash),
            other => Err(PaymentMethodParseError(other.to_owned())),
        }
    }
}

/// Structured shipping address captured at placement time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    /// Recipient full name.
    pub full_name: String,
    /// Street and number.
    pub street: String,
    /// City or municipality.
    pub city: String,
    /// State or region.
    pub region: String,
    /// Postal code.
    pub postal_code: String,
    /// Contact phone for delivery.
    pub phone: String,
    /// Destination country.
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "México".to_owned()
}

/// Validation failure naming the first missing address field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("shipping address field `{field}` must not be empty")]
pub struct ShippingAddressValidationError {
    /// The camelCase wire name of the offending field.
    pub field: &'static str,
}

impl ShippingAddress {
    /// Require all mandatory fields to be non-blank.
    ///
    /// `country` is optional on the wire and defaults during deserialisation,
    /// so it is not checked here.
    pub fn validate(&self) -> Result<(), ShippingAddressValidationError> {
        let required: [(&'static str, &str); 6] = [
            ("fullName", &self.full_name),
            ("street", &self.street),
            ("city", &self.city),
            ("region", &self.region),
            ("postalCode", &self.postal_code),
            ("phone", &self.phone),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ShippingAddressValidationError { field });
            }
        }
        Ok(())
    }
}

/// Denormalised snapshot of one ordered product, immune to later edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Product identifier at placement time.
    pub product_id: ProductId,
    /// Product name at placement time.
    pub name: String,
    /// Ordered quantity.
    pub quantity: i32,
    /// Unit price at placement time.
    #[schema(value_type = String, example = "499.00")]
    pub unit_price: Decimal,
    /// Image URL at placement time.
    pub image: String,
}

impl OrderItem {
    /// The line total: unit price times quantity.
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// One entry in the order's status-change history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
    /// The status entered.
    pub status: OrderStatus,
    /// When the change happened.
    pub at: DateTime<Utc>,
    /// Operator or system comment.
    pub comment: String,
}

/// A placed order.
///
/// ## Invariants
/// - `subtotal == sum(item.line_total())` and
///   `total == subtotal + tax + shipping`.
/// - `status_history` is append-only and starts with the creation entry.
/// - Orders are never hard-deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    /// Stable identifier.
    pub id: OrderId,
    /// Owning account.
    pub user_id: UserId,
    /// Line-item snapshots taken at placement time.
    pub items: Vec<OrderItem>,
    /// Sum of line totals.
    pub subtotal: Decimal,
    /// Tax charged on the subtotal.
    pub tax: Decimal,
    /// Shipping fee charged.
    pub shipping: Decimal,
    /// Grand total.
    pub total: Decimal,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Destination address.
    pub shipping_address: ShippingAddress,
    /// Payment method selected at checkout.
    pub payment_method: PaymentMethod,
    /// Free-text note left by the customer.
    pub customer_note: String,
    /// Append-only status history, oldest first.
    pub status_history: Vec<StatusHistoryEntry>,
    /// Placement timestamp.
    pub created_at: DateTime<Utc>,
}
