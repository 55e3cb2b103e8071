//! Diesel row structs shared by the persistence adapters.
//!
//! Read rows mirror full table rows; insert and changeset structs borrow
//! where Diesel allows it. Conversions to domain types live with the
//! adapters that own them.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::schema::{auth_tokens, cart_items, orders, products, users};

/// Queryable row for accounts.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_digest: String,
    pub role: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable row for new accounts; timestamps come from column defaults.
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub password_digest: &'a str,
    pub role: &'a str,
    pub active: bool,
}

/// Changeset for partial profile updates.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserProfileChangeset<'a> {
    pub name: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset for partial admin account updates.
///
/// `updated_at` is always set, so the changeset is never empty even when the
/// request changes nothing.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserAccountChangeset<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub role: Option<&'a str>,
    pub active: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

/// Queryable row for catalogue products.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub image: String,
    pub featured: bool,
    pub stock: i32,
    pub active: bool,
    pub brand: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable row for new products.
#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub(crate) struct NewProductRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub description: &'a str,
    pub price: Decimal,
    pub category: &'a str,
    pub image: &'a str,
    pub featured: bool,
    pub stock: i32,
    pub active: bool,
    pub brand: &'a str,
    pub model: &'a str,
}

/// Changeset for partial product updates.
///
/// `updated_at` is always set, so the changeset is never empty even when the
/// request changes nothing.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = products)]
pub(crate) struct ProductChangeset<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub price: Option<Decimal>,
    pub category: Option<&'a str>,
    pub image: Option<&'a str>,
    pub featured: Option<bool>,
    pub stock: Option<i32>,
    pub active: Option<bool>,
    pub brand: Option<&'a str>,
    pub model: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

/// Queryable row for orders; JSONB columns stay raw until conversion.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: serde_json::Value,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub status: String,
    pub shipping_address: serde_json::Value,
    pub payment_method: String,
    pub customer_note: String,
    pub status_history: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable row for new orders.
#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub(crate) struct NewOrderRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: &'a serde_json::Value,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub status: &'a str,
    pub shipping_address: &'a serde_json::Value,
    pub payment_method: &'a str,
    pub customer_note: &'a str,
    pub status_history: &'a serde_json::Value,
}

/// Queryable row for cart lines.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cart_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CartItemRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable row for new cart lines.
#[derive(Debug, Insertable)]
#[diesel(table_name = cart_items)]
pub(crate) struct NewCartItemRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Insertable row for issued token digests.
#[derive(Debug, Insertable)]
#[diesel(table_name = auth_tokens)]
pub(crate) struct NewAuthTokenRow<'a> {
    pub token_digest: &'a str,
    pub user_id: Uuid,
}
