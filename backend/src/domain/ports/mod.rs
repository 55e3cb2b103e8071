//! Domain ports and supporting types for the hexagonal boundary.

mod accounts;
mod auth_gate;
mod cart;
mod cart_repository;
mod catalogue;
mod order_repository;
mod orders;
mod paging;
mod product_repository;
mod token_repository;
mod user_repository;
mod users_admin;

#[cfg(test)]
pub use accounts::MockAccounts;
pub use accounts::{
    Accounts, AuthResponse, ChangePasswordRequest, FixtureAccounts, LoginRequest, ProfilePayload,
    RegisterRequest, UpdateProfileRequest,
};
#[cfg(test)]
pub use auth_gate::MockAuthGate;
pub use auth_gate::{AuthGate, FixtureAuthGate};
#[cfg(test)]
pub use cart::{MockCartCommand, MockCartQuery};
pub use cart::{
    AddCartItemRequest, CartCommand, CartLinePayload, CartPayload, CartQuery, FixtureCartCommand,
    FixtureCartQuery, UpdateCartItemRequest,
};
#[cfg(test)]
pub use cart_repository::MockCartRepository;
pub use cart_repository::{CartRepository, CartRepositoryError};
#[cfg(test)]
pub use catalogue::{MockCatalogueCommand, MockCatalogueQuery};
pub use catalogue::{
    CatalogueCommand, CatalogueQuery, CreateProductRequest, FixtureCatalogueCommand,
    FixtureCatalogueQuery, ListProductsRequest, ListProductsResponse, ProductPayload,
    UpdateProductRequest,
};
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{
    CancelOrderError, ItemRequest, OrderDraft, OrderFilter, OrderRepository, OrderRepositoryError,
    OrderStatistics, PlaceOrderError, SetStatusError,
};
#[cfg(test)]
pub use orders::{MockOrderCommand, MockOrderQuery};
pub use orders::{
    FixtureOrderCommand, FixtureOrderQuery, ListOrdersRequest, ListOrdersResponse, OrderCommand,
    OrderPayload, OrderQuery, OrderStatisticsPayload, PlaceOrderItem, PlaceOrderRequest,
    SetOrderStatusRequest,
};
pub use paging::{Page, PageRequest, MAX_PER_PAGE};
#[cfg(test)]
pub use product_repository::MockProductRepository;
pub use product_repository::{
    FixtureProductRepository, ProductChanges, ProductFilter, ProductRepository,
    ProductRepositoryError,
};
#[cfg(test)]
pub use token_repository::MockTokenRepository;
pub use token_repository::{TokenRepository, TokenRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{
    AccountChanges, ProfileChanges, UserFilter, UserRepository, UserRepositoryError,
};
#[cfg(test)]
pub use users_admin::MockUserAdmin;
pub use users_admin::{
    FixtureUserAdmin, ListUsersRequest, ListUsersResponse, UpdateUserRequest, UserAdmin,
};
