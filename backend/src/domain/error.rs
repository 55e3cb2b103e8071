//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses or any other protocol-specific envelope.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Authentication failed or is missing.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// A product has fewer sellable units than the order requests.
    InsufficientStock,
    /// The order's current status does not permit the requested transition.
    InvalidTransition,
    /// The request conflicts with existing state (e.g. duplicate email).
    Conflict,
    /// A backing service (database pool) is unavailable.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` must be non-empty once trimmed of whitespace.
///
/// # Examples
/// ```
/// use storefront_backend::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("missing");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    #[schema(example = "invalid_request")]
    code: ErrorCode,
    #[schema(example = "Something went wrong")]
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Create a new error with the given code and message.
    ///
    /// Empty messages are replaced with the code's default wording rather
    /// than rejected, so error construction never fails mid-request.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "unspecified error".to_owned()
        } else {
            message
        };
        Self {
            code,
            message,
            details: None,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary error details for adapters.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Build an [`ErrorCode::InsufficientStock`] error carrying the product
    /// name and the quantity still available.
    pub fn insufficient_stock(product_name: impl Into<String>, available: i32) -> Self {
        let product_name = product_name.into();
        Self::new(
            ErrorCode::InsufficientStock,
            format!("Insufficient stock for {product_name}. Available: {available}"),
        )
        .with_details(json!({
            "productName": product_name,
            "available": available,
        }))
    }

    /// Build an [`ErrorCode::InvalidTransition`] error naming the current
    /// status that blocked the transition.
    pub fn invalid_transition(message: impl Into<String>, current_status: &str) -> Self {
        Self::new(ErrorCode::InvalidTransition, message).with_details(json!({
            "currentStatus": current_status,
        }))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_carries_name_and_available() {
        let err = Error::insufficient_stock("Laptop Pro", 2);
        assert_eq!(err.code(), ErrorCode::InsufficientStock);
        assert!(err.message().contains("Laptop Pro"));
        assert!(err.message().contains('2'));
        let details = err.details().cloned().unwrap_or_default();
        assert_eq!(details["available"], 2);
        assert_eq!(details["productName"], "Laptop Pro");
    }

    #[test]
    fn empty_messages_are_replaced() {
        let err = Error::internal("   ");
        assert_eq!(err.message(), "unspecified error");
    }

    #[test]
    fn codes_serialise_snake_case() {
        let value = serde_json::to_value(Error::invalid_transition(
            "cannot cancel a shipped order",
            "shipped",
        ))
        .unwrap_or_default();
        assert_eq!(value["code"], "invalid_transition");
        assert_eq!(value["details"]["currentStatus"], "shipped");
    }
}
