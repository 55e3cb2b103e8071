//! PostgreSQL persistence adapters for the driven ports.

mod diesel_cart_repository;
mod diesel_error_mapping;
mod diesel_order_repository;
mod diesel_product_repository;
mod diesel_token_repository;
mod diesel_user_repository;
mod models;
mod pool;
pub mod schema;

pub use diesel_cart_repository::DieselCartRepository;
pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_product_repository::DieselProductRepository;
pub use diesel_token_repository::DieselTokenRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
