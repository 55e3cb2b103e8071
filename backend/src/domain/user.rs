//! Account identity and roles.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Stable user identifier stored as a UUID.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
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

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Caller role resolved by the auth gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular shopper: owns a cart and their own orders.
    Customer,
    /// Administrator: full catalogue and order management.
    Admin,
}

impl Role {
    /// Stable string form used in storage and on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }

    /// Whether this role grants administrative access.
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct RoleParseError(pub String);

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            other => Err(RoleParseError(other.to_owned())),
        }
    }
}

/// A storefront account.
///
/// The password digest never leaves the persistence and accounts layers;
/// profile payloads are built from the remaining fields.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// Full name shown on the account.
    pub name: String,
    /// Unique login email.
    pub email: String,
    /// Contact phone number; may be empty.
    pub phone: String,
    /// Hex digest of the account password.
    pub password_digest: String,
    /// Caller role.
    pub role: Role,
    /// Inactive accounts cannot authenticate.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Caller identity resolved from a bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    /// The authenticated account.
    pub user_id: UserId,
    /// The account's role.
    pub role: Role,
}

impl Caller {
    /// Whether the caller may act on resources owned by `owner`.
    pub fn may_access(&self, owner: UserId) -> bool {
        self.user_id == owner || self.role.is_admin()
    }
}
