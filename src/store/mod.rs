//! Persistence seam. Handlers only see these traits; `PgStore` backs them in
//! production and `MemoryStore` in tests.
//!
//! Uniqueness of email, phone and active product titles is enforced by the
//! store itself (unique indexes). The `*_exists` probes let handlers fail
//! early with a clear message but are not the guarantee.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::cart_model::Cart;
use crate::models::product_model::{NewProduct, Product, Size};
use crate::models::user_model::{NewUser, User};
use crate::utils::partial_update::UpdateDocument;

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub const EMAIL_TAKEN: &str = "Email address already exist";
pub const PHONE_TAKEN: &str = "phone number already exist";
pub const TITLE_TAKEN: &str = "Product title already exist";

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("{0}")]
    Conflict(String),

    /// An update document named a path this store does not know.
    #[error("unknown field path: {0}")]
    UnknownPath(String),

    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSort {
    Ascending,
    Descending,
}

/// Catalog query. Soft-deleted products are always excluded.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Matches products offering any of these sizes.
    pub sizes: Option<Vec<Size>>,
    /// Case-insensitive literal substring of the title.
    pub name: Option<String>,
    /// Exclusive lower bound.
    pub price_gt: Option<Decimal>,
    /// Exclusive upper bound.
    pub price_lt: Option<Decimal>,
    /// Creation order when unset.
    pub price_sort: Option<PriceSort>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn email_exists(&self, email: &str) -> Result<bool, StoreError>;

    async fn phone_exists(&self, phone: &str) -> Result<bool, StoreError>;

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Applies `update` and returns the resulting record. An empty document
    /// leaves the record untouched.
    async fn update_user(
        &self,
        id: Uuid,
        update: &UpdateDocument,
    ) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Only non-deleted products count.
    async fn title_exists(&self, title: &str) -> Result<bool, StoreError>;

    async fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError>;

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, StoreError>;

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError>;

    async fn update_product(
        &self,
        id: Uuid,
        update: &UpdateDocument,
    ) -> Result<Option<Product>, StoreError>;

    /// Returns `false` when there was no active product to delete.
    async fn soft_delete_product(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
    /// Returns the user's cart, atomically creating an empty one if absent.
    async fn find_or_create_cart(&self, user_id: Uuid) -> Result<Cart, StoreError>;
}
