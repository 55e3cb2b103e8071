//! Cart domain service implementing the driving ports.
//!
//! The cart never reserves stock; it only refuses quantities the shopper
//! could not check out right now. Reservation happens atomically at
//! placement.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::cart::CartView;
use crate::domain::ports::{
    AddCartItemRequest, CartCommand, CartPayload, CartQuery, CartRepository, CartRepositoryError,
    ProductRepository, ProductRepositoryError, UpdateCartItemRequest,
};
use crate::domain::product::{Product, ProductId};
use crate::domain::user::Caller;
use crate::domain::Error;

/// Cart service implementing [`CartQuery`] and [`CartCommand`].
#[derive(Clone)]
pub struct CartService<C, P> {
    cart: Arc<C>,
    products: Arc<P>,
}

impl<C, P> CartService<C, P> {
    /// Create a new service over the given repositories.
    pub fn new(cart: Arc<C>, products: Arc<P>) -> Self {
        Self { cart, products }
    }
}

impl<C, P> CartService<C, P>
where
    C: CartRepository,
    P: ProductRepository,
{
    fn map_cart_error(error: CartRepositoryError) -> Error {
        match error {
            CartRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("cart repository unavailable: {message}"))
            }
            CartRepositoryError::Query { message } => {
                Error::internal(format!("cart repository error: {message}"))
            }
        }
    }

    fn map_product_error(error: ProductRepositoryError) -> Error {
        match error {
            ProductRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("product repository unavailable: {message}"))
            }
            ProductRepositoryError::Query { message } => {
                Error::internal(format!("product repository error: {message}"))
            }
        }
    }

    fn require_positive_quantity(quantity: i32) -> Result<(), Error> {
        if quantity < 1 {
            return Err(Error::invalid_request("quantity must be at least 1"));
        }
        Ok(())
    }

    async fn require_sellable(
        &self,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<Product, Error> {
        let product = self
            .products
            .find_active_by_id(product_id)
            .await
            .map_err(Self::map_product_error)?
            .ok_or_else(|| Error::not_found(format!("product {product_id} not found")))?;
        if product.stock < quantity {
            return Err(Error::insufficient_stock(product.name, product.stock));
        }
        Ok(product)
    }

    async fn refreshed_cart(&self, caller: Caller) -> Result<CartPayload, Error> {
        let lines = self
            .cart
            .lines_for_user(caller.user_id)
            .await
            .map_err(Self::map_cart_error)?;
        Ok(CartView { lines }.into())
    }
}

#[async_trait]
impl<C, P> CartQuery for CartService<C, P>
where
    C: CartRepository,
    P: ProductRepository,
{
    async fn get_cart(&self, caller: Caller) -> Result<CartPayload, Error> {
        self.refreshed_cart(caller).await
    }
}

#[async_trait]
impl<C, P> CartCommand for CartService<C, P>
where
    C: CartRepository,
    P: ProductRepository,
{
    async fn add_item(
        &self,
        caller: Caller,
        request: AddCartItemRequest,
    ) -> Result<CartPayload, Error> {
        Self::require_positive_quantity(request.quantity)?;
        self.require_sellable(request.product_id, request.quantity)
            .await?;

        self.cart
            .add_quantity(caller.user_id, request.product_id, request.quantity)
            .await
            .map_err(Self::map_cart_error)?;
        self.refreshed_cart(caller).await
    }

    async fn set_item_quantity(
        &self,
        caller: Caller,
        product_id: ProductId,
        request: UpdateCartItemRequest,
    ) -> Result<CartPayload, Error> {
        Self::require_positive_quantity(request.quantity)?;
        self.require_sellable(product_id, request.quantity).await?;

        let updated = self
            .cart
            .set_quantity(caller.user_id, product_id, request.quantity)
            .await
            .map_err(Self::map_cart_error)?;
        if !updated {
            return Err(Error::not_found(format!(
                "product {product_id} is not in the cart"
            )));
        }
        self.refreshed_cart(caller).await
    }

    async fn remove_item(
        &self,
        caller: Caller,
        product_id: ProductId,
    ) -> Result<CartPayload, Error> {
        let removed = self
            .cart
            .remove_line(caller.user_id, product_id)
            .await
            .map_err(Self::map_cart_error)?;
        if !removed {
            return Err(Error::not_found(format!(
                "product {product_id} is not in the cart"
            )));
        }
        self.refreshed_cart(caller).await
    }

    async fn clear_cart(&self, caller: Caller) -> Result<CartPayload, Error> {
        self.cart
            .clear(caller.user_id)
            .await
            .map_err(Self::map_cart_error)?;
        Ok(CartPayload::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cart::CartLine;
    use crate::domain::ports::{MockCartRepository, MockProductRepository};
    use crate::domain::product::Category;
    use crate::domain::user::{Role, UserId};
    use crate::domain::ErrorCode;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn customer() -> Caller {
        Caller {
            user_id: UserId::random(),
            role: Role::Customer,
        }
    }

    fn sample_product(stock: i32) -> Product {
        Product {
            id: ProductId::random(),
            name: "Phone".to_owned(),
            description: String::new(),
            price: dec!(499.00),
            category: Category::Smartphones,
            image: String::new(),
            featured: false,
            stock,
            active: true,
            brand: String::new(),
            model: String::new(),
            created_at: Utc::now(),
        }
    }

    fn make_service(
        cart: MockCartRepository,
        products: MockProductRepository,
    ) -> CartService<MockCartRepository, MockProductRepository> {
        CartService::new(Arc::new(cart), Arc::new(products))
    }

    #[tokio::test]
    async fn adding_rejects_non_positive_quantities() {
        let mut cart = MockCartRepository::new();
        cart.expect_add_quantity().times(0);
        let service = make_service(cart, MockProductRepository::new());

        let error = service
            .add_item(
                customer(),
                AddCartItemRequest {
                    product_id: ProductId::random(),
                    quantity: 0,
                },
            )
            .await
            .expect_err("zero quantity");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn adding_an_unknown_product_is_not_found() {
        let mut cart = MockCartRepository::new();
        cart.expect_add_quantity().times(0);
        let mut products = MockProductRepository::new();
        products
            .expect_find_active_by_id()
            .times(1)
            .return_once(|_| Ok(None));
        let service = make_service(cart, products);

        let error = service
            .add_item(
                customer(),
                AddCartItemRequest {
                    product_id: ProductId::random(),
                    quantity: 1,
                },
            )
            .await
            .expect_err("unknown product");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn adding_beyond_stock_is_insufficient() {
        let mut cart = MockCartRepository::new();
        cart.expect_add_quantity().times(0);
        let mut products = MockProductRepository::new();
        products
            .expect_find_active_by_id()
            .times(1)
            .return_once(|_| Ok(Some(sample_product(2))));
        let service = make_service(cart, products);

        let error = service
            .add_item(
                customer(),
                AddCartItemRequest {
                    product_id: ProductId::random(),
                    quantity: 3,
                },
            )
            .await
            .expect_err("oversell");

        assert_eq!(error.code(), ErrorCode::InsufficientStock);
    }

    #[tokio::test]
    async fn adding_returns_the_refreshed_cart() {
        let caller = customer();
        let user_id = caller.user_id;
        let product = sample_product(10);
        let product_id = product.id;
        let line = CartLine {
            user_id,
            product: product.clone(),
            quantity: 2,
        };

        let mut cart = MockCartRepository::new();
        cart.expect_add_quantity()
            .withf(move |uid, pid, qty| *uid == user_id && *pid == product_id && *qty == 2)
            .times(1)
            .return_once(|_, _, _| Ok(()));
        cart.expect_lines_for_user()
            .times(1)
            .return_once(move |_| Ok(vec![line]));

        let mut products = MockProductRepository::new();
        products
            .expect_find_active_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(product)));

        let service = make_service(cart, products);
        let payload = service
            .add_item(
                caller,
                AddCartItemRequest {
                    product_id,
                    quantity: 2,
                },
            )
            .await
            .expect("add succeeds");

        assert_eq!(payload.items.len(), 1);
        assert_eq!(payload.subtotal, dec!(998.00));
    }

    #[tokio::test]
    async fn updating_a_line_not_in_the_cart_is_not_found() {
        let mut cart = MockCartRepository::new();
        cart.expect_set_quantity()
            .times(1)
            .return_once(|_, _, _| Ok(false));
        let mut products = MockProductRepository::new();
        products
            .expect_find_active_by_id()
            .times(1)
            .return_once(|_| Ok(Some(sample_product(10))));

        let service = make_service(cart, products);
        let error = service
            .set_item_quantity(
                customer(),
                ProductId::random(),
                UpdateCartItemRequest { quantity: 1 },
            )
            .await
            .expect_err("missing line");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn clearing_returns_an_empty_cart() {
        let mut cart = MockCartRepository::new();
        cart.expect_clear().times(1).return_once(|_| Ok(()));

        let service = make_service(cart, MockProductRepository::new());
        let payload = service.clear_cart(customer()).await.expect("clear");

        assert!(payload.items.is_empty());
    }
}
