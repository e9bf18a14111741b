//! Storage ports used by the services.
//!
//! Two adapters implement every trait here: [`SeaOrmStore`] for PostgreSQL and
//! [`InMemoryStore`] for tests and database-less runs.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CartEntry, Category, Product, Role, Subcategory, User};

pub mod memory;
pub mod sea_orm_store;

pub use memory::InMemoryStore;
pub use sea_orm_store::SeaOrmStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness rule rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A referenced record does not exist.
    #[error("missing reference: {0}")]
    MissingReference(String),

    #[error("database error")]
    Database(#[from] sea_orm::DbErr),
}

/// A page of records plus the total number of matching records.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub title: String,
    pub slug: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSubcategory {
    pub title: String,
    pub slug: String,
    pub image: Option<String>,
    pub category_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub price: Decimal,
    pub category_id: Uuid,
    pub subcategory_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// An active cart entry joined with the product it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineRecord {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_price: Decimal,
    pub amount: i32,
}

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_categories(&self, page: PageRequest) -> Result<Page<Category>, StoreError>;
    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, StoreError>;
    async fn create_category(&self, category: NewCategory) -> Result<Category, StoreError>;

    async fn list_subcategories(&self, page: PageRequest)
    -> Result<Page<Subcategory>, StoreError>;
    async fn find_subcategory(&self, id: Uuid) -> Result<Option<Subcategory>, StoreError>;
    async fn create_subcategory(
        &self,
        subcategory: NewSubcategory,
    ) -> Result<Subcategory, StoreError>;

    async fn list_products(&self, page: PageRequest) -> Result<Page<Product>, StoreError>;
    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, StoreError>;
    async fn create_product(&self, product: NewProduct) -> Result<Product, StoreError>;
}

/// Cart rows keyed by `(user_id, product_id)`.
///
/// Every method is atomic: it either applies completely or leaves the row
/// untouched.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Inserts the pair or reactivates an inactive row with `amount`.
    /// Fails with [`StoreError::Conflict`] when the pair is already active.
    async fn activate(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        amount: i32,
    ) -> Result<CartEntry, StoreError>;

    /// Replaces the amount of an active row. `None` when no active row exists.
    async fn set_amount(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        amount: i32,
    ) -> Result<Option<CartEntry>, StoreError>;

    /// Marks the row inactive and zeroes its amount. `None` when no row exists.
    async fn deactivate(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<CartEntry>, StoreError>;

    /// Deactivates every active row of the user in one statement and returns
    /// the number of rows touched.
    async fn deactivate_all(&self, user_id: Uuid) -> Result<u64, StoreError>;

    async fn active_lines(&self, user_id: Uuid) -> Result<Vec<CartLineRecord>, StoreError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
}

/// Everything the HTTP layer needs from storage.
pub trait ShopStore: CatalogRepository + CartRepository + UserRepository {}

impl<T> ShopStore for T where T: CatalogRepository + CartRepository + UserRepository {}
