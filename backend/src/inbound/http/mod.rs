//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod cart;
pub mod error;
pub mod health;
pub mod orders;
pub mod products;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;
