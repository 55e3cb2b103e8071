//! Driving-side authentication seam.
//!
//! HTTP extractors hand the raw bearer token to this port and receive the
//! resolved [`Caller`]. Handlers never see credentials, only identities.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::user::{Caller, Role, UserId};
use crate::domain::Error;

/// Resolves bearer credentials to caller identities.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGate: Send + Sync {
    /// Resolve a raw bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ErrorCode::Unauthorized`] when the token is
    /// unknown, revoked, or belongs to an inactive account.
    async fn resolve_caller(&self, token: &str) -> Result<Caller, Error>;
}

/// In-memory gate for handler tests: a fixed token-to-caller table.
#[derive(Debug, Default, Clone)]
pub struct FixtureAuthGate {
    callers: HashMap<String, Caller>,
}

impl FixtureAuthGate {
    /// Gate that accepts no tokens at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register a token resolving to the given caller.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, caller: Caller) -> Self {
        self.callers.insert(token.into(), caller);
        self
    }

    /// Register a customer token, returning the gate and the caller it
    /// resolves to.
    pub fn customer(token: impl Into<String>) -> (Self, Caller) {
        let caller = Caller {
            user_id: UserId::random(),
            role: Role::Customer,
        };
        (Self::default().with_token(token, caller), caller)
    }

    /// Register an admin token, returning the gate and the caller it
    /// resolves to.
    pub fn admin(token: impl Into<String>) -> (Self, Caller) {
        let caller = Caller {
            user_id: UserId::random(),
            role: Role::Admin,
        };
        (Self::default().with_token(token, caller), caller)
    }
}

#[async_trait]
impl AuthGate for FixtureAuthGate {
    async fn resolve_caller(&self, token: &str) -> Result<Caller, Error> {
        self.callers
            .get(token)
            .copied()
            .ok_or_else(|| Error::unauthorized("invalid or expired token"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn known_token_resolves() {
        let (gate, caller) = FixtureAuthGate::customer("tok-1");

        let resolved = gate.resolve_caller("tok-1").await.expect("token known");

        assert_eq!(resolved, caller);
    }

    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let gate = FixtureAuthGate::empty();

        let error = gate.resolve_caller("nope").await.expect_err("unknown");

        assert_eq!(error.code(), crate::domain::ErrorCode::Unauthorized);
    }
}
