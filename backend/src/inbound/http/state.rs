//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    Accounts, AuthGate, CartCommand, CartQuery, CatalogueCommand, CatalogueQuery, FixtureAccounts,
    FixtureAuthGate, FixtureCartCommand, FixtureCartQuery, FixtureCatalogueCommand,
    FixtureCatalogueQuery, FixtureOrderCommand, FixtureOrderQuery, FixtureUserAdmin, OrderCommand,
    OrderQuery, UserAdmin,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Resolves bearer credentials to callers.
    pub auth: Arc<dyn AuthGate>,
    /// Registration, login, and profile management.
    pub accounts: Arc<dyn Accounts>,
    /// Public catalogue reads.
    pub catalogue: Arc<dyn CatalogueQuery>,
    /// Admin catalogue mutations.
    pub catalogue_admin: Arc<dyn CatalogueCommand>,
    /// Cart reads.
    pub cart: Arc<dyn CartQuery>,
    /// Cart mutations.
    pub cart_commands: Arc<dyn CartCommand>,
    /// Order reads.
    pub orders: Arc<dyn OrderQuery>,
    /// Order placement, cancellation, and admin status updates.
    pub order_commands: Arc<dyn OrderCommand>,
    /// Admin account administration.
    pub users_admin: Arc<dyn UserAdmin>,
}

impl HttpState {
    /// State backed entirely by fixture ports. Tests override the fields
    /// they exercise.
    pub fn fixtures() -> Self {
        Self {
            auth: Arc::new(FixtureAuthGate::empty()),
            accounts: Arc::new(FixtureAccounts),
            catalogue: Arc::new(FixtureCatalogueQuery),
            catalogue_admin: Arc::new(FixtureCatalogueCommand),
            cart: Arc::new(FixtureCartQuery),
            cart_commands: Arc::new(FixtureCartCommand),
            orders: Arc::new(FixtureOrderQuery),
            order_commands: Arc::new(FixtureOrderCommand),
            users_admin: Arc::new(FixtureUserAdmin),
        }
    }

    /// Replace the auth gate, keeping the remaining ports.
    #[must_use]
    pub fn with_auth(mut self, auth: Arc<dyn AuthGate>) -> Self {
        self.auth = auth;
        self
    }
}
