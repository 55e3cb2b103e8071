//! Domain entities, ports, and services.
//!
//! Entities carry the invariants (stock never negative, totals add up,
//! history append-only); ports define the hexagonal boundary; services
//! implement the driving ports over the driven ones.

pub mod accounts_service;
pub mod cart;
pub mod cart_service;
pub mod catalogue_service;
pub mod checkout;
pub mod error;
pub mod order;
pub mod order_service;
pub mod ports;
pub mod product;
pub mod user;

pub use self::accounts_service::{AccountsService, TokenAuthGate};
pub use self::cart::{CartLine, CartView};
pub use self::cart_service::CartService;
pub use self::catalogue_service::CatalogueService;
pub use self::checkout::{CheckoutPolicy, OrderTotals};
pub use self::error::{Error, ErrorCode};
pub use self::order::{
    Order, OrderId, OrderItem, OrderStatus, PaymentMethod, ShippingAddress, StatusHistoryEntry,
};
pub use self::order_service::OrderService;
pub use self::product::{Category, Product, ProductId, ProductSort};
pub use self::user::{Caller, Role, User, UserId};
