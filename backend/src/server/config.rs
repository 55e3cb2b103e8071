//! Environment-driven application configuration.
//!
//! Read once at startup and passed explicitly to the server builder; no
//! global connection or policy state.

use std::net::SocketAddr;

use rust_decimal::Decimal;

use crate::domain::CheckoutPolicy;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_SIZE: u32 = 10;

/// Failures while assembling the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing required environment variable {name}")]
    Missing { name: &'static str },
    /// A variable is set but does not parse.
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Application configuration assembled from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Maximum connections held by the pool.
    pub pool_max_size: u32,
    /// Checkout pricing policy; defaults reproduce the established
    /// 16% / 1000 / 99 behaviour.
    pub policy: CheckoutPolicy,
}

fn parse_var<T, F>(
    name: &'static str,
    raw: Option<String>,
    default: T,
    parse: F,
) -> Result<T, ConfigError>
where
    F: FnOnce(&str) -> Option<T>,
{
    match raw {
        None => Ok(default),
        Some(value) => parse(value.trim()).ok_or(ConfigError::Invalid {
            name,
            value,
        }),
    }
}

impl AppConfig {
    /// Assemble the configuration from process environment variables.
    ///
    /// `DATABASE_URL` is required; everything else falls back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `DATABASE_URL` is absent or any set
    /// variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Assemble the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing {
            name: "DATABASE_URL",
        })?;

        let bind_addr = parse_var(
            "STOREFRONT_BIND_ADDR",
            lookup("STOREFRONT_BIND_ADDR"),
            DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 8080))),
            |raw| raw.parse().ok(),
        )?;

        let pool_max_size = parse_var(
            "STOREFRONT_DB_POOL_SIZE",
            lookup("STOREFRONT_DB_POOL_SIZE"),
            DEFAULT_POOL_SIZE,
            |raw| raw.parse().ok().filter(|size| *size > 0),
        )?;

        let defaults = CheckoutPolicy::default();
        let policy = CheckoutPolicy {
            tax_rate: parse_var(
                "STOREFRONT_TAX_RATE",
                lookup("STOREFRONT_TAX_RATE"),
                defaults.tax_rate,
                parse_non_negative_decimal,
            )?,
            free_shipping_threshold: parse_var(
                "STOREFRONT_FREE_SHIPPING_THRESHOLD",
                lookup("STOREFRONT_FREE_SHIPPING_THRESHOLD"),
                defaults.free_shipping_threshold,
                parse_non_negative_decimal,
            )?,
            flat_shipping_fee: parse_var(
                "STOREFRONT_FLAT_SHIPPING_FEE",
                lookup("STOREFRONT_FLAT_SHIPPING_FEE"),
                defaults.flat_shipping_fee,
                parse_non_negative_decimal,
            )?,
        };

        Ok(Self {
            bind_addr,
            database_url,
            pool_max_size,
            policy,
        })
    }
}

fn parse_non_negative_decimal(raw: &str) -> Option<Decimal> {
    raw.parse::<Decimal>().ok().filter(|d| !d.is_sign_negative())
}
