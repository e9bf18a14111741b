#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::DbErr;
use shop_api::{
    config::AuthConfig,
    models::{CartEntry, Category, Product, Role, Subcategory, User},
    repository::{
        CartLineRecord, CartRepository, CatalogRepository, InMemoryStore, NewCategory,
        NewProduct, NewSubcategory, NewUser, Page, PageRequest, StoreError, UserRepository,
    },
    services::auth_service::{hash_password, issue_token},
    state::AppState,
};
use uuid::Uuid;

pub fn dec(value: &str) -> Decimal {
    value.parse().expect("valid decimal literal")
}

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "integration-test-secret".into(),
        token_ttl_hours: 1,
    }
}

pub struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub category_id: Uuid,
    pub subcategory_id: Uuid,
    pub phone: Product,
    pub mug: Product,
}

impl Fixture {
    pub fn state(&self) -> AppState {
        AppState::new(self.store.clone(), auth_config())
    }

    /// A fresh user with a unique email, for cart tests that need no token.
    pub async fn shopper(&self) -> Uuid {
        let email = format!("shopper-{}@example.com", Uuid::new_v4());
        self.user_with_token(&email, Role::User).await.0
    }

    /// Registers a user directly in the store and returns `(id, bearer header)`.
    pub async fn user_with_token(&self, email: &str, role: Role) -> (Uuid, String) {
        let user = self
            .store
            .create_user(NewUser {
                email: email.to_string(),
                password_hash: hash_password("password").expect("hash"),
                role,
            })
            .await
            .expect("create user");
        let token = issue_token(&user, &auth_config()).expect("token");
        (user.id, format!("Bearer {token}"))
    }
}

pub async fn fixture() -> Fixture {
    let store = Arc::new(InMemoryStore::new());

    let category = store
        .create_category(NewCategory {
            title: "Electronics".into(),
            slug: "electronics".into(),
            image: None,
        })
        .await
        .expect("category");
    let subcategory = store
        .create_subcategory(NewSubcategory {
            title: "Phones".into(),
            slug: "phones".into(),
            image: None,
            category_id: category.id,
        })
        .await
        .expect("subcategory");

    let phone = store
        .create_product(NewProduct {
            name: "iPhone 13".into(),
            slug: "iphone-13".into(),
            image: None,
            price: dec("799.99"),
            category_id: category.id,
            subcategory_id: subcategory.id,
        })
        .await
        .expect("phone");
    let mug = store
        .create_product(NewProduct {
            name: "Ferris Mug".into(),
            slug: "ferris-mug".into(),
            image: None,
            price: dec("12.50"),
            category_id: category.id,
            subcategory_id: subcategory.id,
        })
        .await
        .expect("mug");

    Fixture {
        store,
        category_id: category.id,
        subcategory_id: subcategory.id,
        phone,
        mug,
    }
}

/// Catalog and users from an in-memory store; every cart call fails as if the
/// database connection dropped.
pub struct BrokenCartStore {
    pub inner: Arc<InMemoryStore>,
}

fn connection_lost() -> StoreError {
    StoreError::Database(DbErr::Custom("connection lost".into()))
}

#[async_trait]
impl CatalogRepository for BrokenCartStore {
    async fn list_categories(&self, page: PageRequest) -> Result<Page<Category>, StoreError> {
        self.inner.list_categories(page).await
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, StoreError> {
        self.inner.find_category(id).await
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category, StoreError> {
        self.inner.create_category(category).await
    }

    async fn list_subcategories(
        &self,
        page: PageRequest,
    ) -> Result<Page<Subcategory>, StoreError> {
        self.inner.list_subcategories(page).await
    }

    async fn find_subcategory(&self, id: Uuid) -> Result<Option<Subcategory>, StoreError> {
        self.inner.find_subcategory(id).await
    }

    async fn create_subcategory(
        &self,
        subcategory: NewSubcategory,
    ) -> Result<Subcategory, StoreError> {
        self.inner.create_subcategory(subcategory).await
    }

    async fn list_products(&self, page: PageRequest) -> Result<Page<Product>, StoreError> {
        self.inner.list_products(page).await
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        self.inner.find_product(id).await
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product, StoreError> {
        self.inner.create_product(product).await
    }
}

#[async_trait]
impl CartRepository for BrokenCartStore {
    async fn activate(&self, _: Uuid, _: Uuid, _: i32) -> Result<CartEntry, StoreError> {
        Err(connection_lost())
    }

    async fn set_amount(&self, _: Uuid, _: Uuid, _: i32) -> Result<Option<CartEntry>, StoreError> {
        Err(connection_lost())
    }

    async fn deactivate(&self, _: Uuid, _: Uuid) -> Result<Option<CartEntry>, StoreError> {
        Err(connection_lost())
    }

    async fn deactivate_all(&self, _: Uuid) -> Result<u64, StoreError> {
        Err(connection_lost())
    }

    async fn active_lines(&self, _: Uuid) -> Result<Vec<CartLineRecord>, StoreError> {
        Err(connection_lost())
    }
}

#[async_trait]
impl UserRepository for BrokenCartStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.inner.find_user_by_email(email).await
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        self.inner.create_user(user).await
    }
}

impl Fixture {
    /// App state whose cart storage always fails.
    pub fn broken_cart_state(&self) -> AppState {
        let store = BrokenCartStore {
            inner: self.store.clone(),
        };
        AppState::new(Arc::new(store), auth_config())
    }
}
