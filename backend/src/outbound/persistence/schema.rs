//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//! When migrations change the schema, regenerate with `diesel print-schema`
//! or update by hand.

diesel::table! {
    /// Registered storefront accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Full name shown on the account.
        #[max_length = 100]
        name -> Varchar,
        /// Unique login email.
        #[max_length = 255]
        email -> Varchar,
        /// Contact phone number; may be empty.
        #[max_length = 20]
        phone -> Varchar,
        /// Hex digest of the account password.
        password_digest -> Text,
        /// Caller role: `customer` or `admin`.
        #[max_length = 16]
        role -> Varchar,
        /// Soft-deactivation flag; inactive accounts cannot authenticate.
        active -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Sellable catalogue entries.
    products (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 100]
        name -> Varchar,
        /// Long-form description.
        description -> Text,
        /// Unit price, non-negative NUMERIC(10,2).
        price -> Numeric,
        /// Catalogue category slug.
        #[max_length = 32]
        category -> Varchar,
        /// Image URL.
        image -> Text,
        /// Whether the product is highlighted on the storefront.
        featured -> Bool,
        /// Sellable units on hand; never negative.
        stock -> Int4,
        /// Soft-deletion flag; inactive products are invisible to shoppers.
        active -> Bool,
        /// Manufacturer brand; may be empty.
        #[max_length = 50]
        brand -> Varchar,
        /// Manufacturer model; may be empty.
        #[max_length = 50]
        model -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Placed orders with denormalised line-item snapshots.
    orders (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning account.
        user_id -> Uuid,
        /// JSONB array of line-item snapshots.
        items -> Jsonb,
        /// Sum of line totals.
        subtotal -> Numeric,
        /// Tax charged on the subtotal.
        tax -> Numeric,
        /// Shipping fee charged.
        shipping -> Numeric,
        /// Grand total: subtotal + tax + shipping.
        total -> Numeric,
        /// Current lifecycle status.
        #[max_length = 16]
        status -> Varchar,
        /// JSONB structured shipping address.
        shipping_address -> Jsonb,
        /// Payment method slug.
        #[max_length = 16]
        payment_method -> Varchar,
        /// Free-text note left by the customer.
        customer_note -> Text,
        /// JSONB array of status-change history entries.
        status_history -> Jsonb,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-user cart lines; one row per (user, product) pair.
    cart_items (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning account.
        user_id -> Uuid,
        /// Referenced live product.
        product_id -> Uuid,
        /// Requested quantity, at least 1.
        quantity -> Int4,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Issued bearer-token digests for the auth gate.
    auth_tokens (token_digest) {
        /// Primary key: hex SHA-256 digest of the issued token.
        #[max_length = 64]
        token_digest -> Bpchar,
        /// Account the token authenticates.
        user_id -> Uuid,
        /// Issue timestamp.
        issued_at -> Timestamptz,
    }
}

diesel::joinable!(orders -> users (user_id));
diesel::joinable!(cart_items -> users (user_id));
diesel::joinable!(cart_items -> products (product_id));
diesel::joinable!(auth_tokens -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, products, orders, cart_items, auth_tokens);
