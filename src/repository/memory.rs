//! In-process storage with the same uniqueness and reference rules as the
//! PostgreSQL schema. Backs the test suite and `APP_STORE=memory` runs.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    CartLineRecord, CartRepository, CatalogRepository, NewCategory, NewProduct, NewSubcategory,
    NewUser, Page, PageRequest, StoreError, UserRepository,
};
use crate::models::{CartEntry, Category, Product, Subcategory, User};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    categories: Vec<Category>,
    subcategories: Vec<Subcategory>,
    products: Vec<Product>,
    users: Vec<User>,
    cart: Vec<CartEntry>,
}

impl MemoryState {
    fn with_subcategory_titles(&self, category: &Category) -> Category {
        let mut category = category.clone();
        category.subcategories = self
            .subcategories
            .iter()
            .filter(|sub| sub.category_id == category.id)
            .map(|sub| sub.title.clone())
            .collect();
        category
    }

    fn cart_entry_mut(&mut self, user_id: Uuid, product_id: Uuid) -> Option<&mut CartEntry> {
        self.cart
            .iter_mut()
            .find(|entry| entry.user_id == user_id && entry.product_id == product_id)
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cart rows for the user, active or not.
    pub async fn cart_row_count(&self, user_id: Uuid) -> usize {
        let state = self.state.lock().await;
        state
            .cart
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .count()
    }

    pub async fn cart_entry(&self, user_id: Uuid, product_id: Uuid) -> Option<CartEntry> {
        let state = self.state.lock().await;
        state
            .cart
            .iter()
            .find(|entry| entry.user_id == user_id && entry.product_id == product_id)
            .cloned()
    }
}

fn paginate<T: Clone>(items: &[T], page: PageRequest) -> Page<T> {
    let offset = usize::try_from(page.offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
    Page {
        items: items.iter().skip(offset).take(limit).cloned().collect(),
        total: items.len() as u64,
    }
}

fn slug_conflict(slug: &str) -> StoreError {
    StoreError::Conflict(format!("slug {slug} is already taken"))
}

#[async_trait]
impl CatalogRepository for InMemoryStore {
    async fn list_categories(&self, page: PageRequest) -> Result<Page<Category>, StoreError> {
        let state = self.state.lock().await;
        let mut result = paginate(&state.categories, page);
        result.items = result
            .items
            .iter()
            .map(|category| state.with_subcategory_titles(category))
            .collect();
        Ok(result)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| state.with_subcategory_titles(c)))
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category, StoreError> {
        let mut state = self.state.lock().await;
        if state.categories.iter().any(|c| c.slug == category.slug) {
            return Err(slug_conflict(&category.slug));
        }
        let category = Category {
            id: Uuid::new_v4(),
            title: category.title,
            slug: category.slug,
            image: category.image,
            created_at: Utc::now(),
            subcategories: Vec::new(),
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn list_subcategories(
        &self,
        page: PageRequest,
    ) -> Result<Page<Subcategory>, StoreError> {
        let state = self.state.lock().await;
        Ok(paginate(&state.subcategories, page))
    }

    async fn find_subcategory(&self, id: Uuid) -> Result<Option<Subcategory>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.subcategories.iter().find(|s| s.id == id).cloned())
    }

    async fn create_subcategory(
        &self,
        subcategory: NewSubcategory,
    ) -> Result<Subcategory, StoreError> {
        let mut state = self.state.lock().await;
        if state.subcategories.iter().any(|s| s.slug == subcategory.slug) {
            return Err(slug_conflict(&subcategory.slug));
        }
        if !state
            .categories
            .iter()
            .any(|c| c.id == subcategory.category_id)
        {
            return Err(StoreError::MissingReference(format!(
                "category {}",
                subcategory.category_id
            )));
        }
        let subcategory = Subcategory {
            id: Uuid::new_v4(),
            title: subcategory.title,
            slug: subcategory.slug,
            image: subcategory.image,
            category_id: subcategory.category_id,
            created_at: Utc::now(),
        };
        state.subcategories.push(subcategory.clone());
        Ok(subcategory)
    }

    async fn list_products(&self, page: PageRequest) -> Result<Page<Product>, StoreError> {
        let state = self.state.lock().await;
        Ok(paginate(&state.products, page))
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.products.iter().find(|p| p.id == id).cloned())
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product, StoreError> {
        let mut state = self.state.lock().await;
        if state.products.iter().any(|p| p.slug == product.slug) {
            return Err(slug_conflict(&product.slug));
        }
        if !state.categories.iter().any(|c| c.id == product.category_id) {
            return Err(StoreError::MissingReference(format!(
                "category {}",
                product.category_id
            )));
        }
        if !state
            .subcategories
            .iter()
            .any(|s| s.id == product.subcategory_id)
        {
            return Err(StoreError::MissingReference(format!(
                "subcategory {}",
                product.subcategory_id
            )));
        }
        let product = Product {
            id: Uuid::new_v4(),
            name: product.name,
            slug: product.slug,
            image: product.image,
            price: product.price,
            category_id: product.category_id,
            subcategory_id: product.subcategory_id,
            created_at: Utc::now(),
        };
        state.products.push(product.clone());
        Ok(product)
    }
}

#[async_trait]
impl CartRepository for InMemoryStore {
    async fn activate(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        amount: i32,
    ) -> Result<CartEntry, StoreError> {
        let mut state = self.state.lock().await;
        if !state.products.iter().any(|p| p.id == product_id) {
            return Err(StoreError::MissingReference(format!("product {product_id}")));
        }
        if !state.users.iter().any(|u| u.id == user_id) {
            return Err(StoreError::MissingReference(format!("user {user_id}")));
        }

        if let Some(entry) = state.cart_entry_mut(user_id, product_id) {
            if entry.is_in_shopping_cart {
                return Err(StoreError::Conflict(
                    "product is already in the shopping cart".into(),
                ));
            }
            entry.is_in_shopping_cart = true;
            entry.amount = amount;
            entry.updated_at = Utc::now();
            return Ok(entry.clone());
        }

        let now = Utc::now();
        let entry = CartEntry {
            id: Uuid::new_v4(),
            user_id,
            product_id,
            amount,
            is_in_shopping_cart: true,
            created_at: now,
            updated_at: now,
        };
        state.cart.push(entry.clone());
        Ok(entry)
    }

    async fn set_amount(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        amount: i32,
    ) -> Result<Option<CartEntry>, StoreError> {
        let mut state = self.state.lock().await;
        Ok(state
            .cart_entry_mut(user_id, product_id)
            .filter(|entry| entry.is_in_shopping_cart)
            .map(|entry| {
                entry.amount = amount;
                entry.updated_at = Utc::now();
                entry.clone()
            }))
    }

    async fn deactivate(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<CartEntry>, StoreError> {
        let mut state = self.state.lock().await;
        Ok(state.cart_entry_mut(user_id, product_id).map(|entry| {
            entry.is_in_shopping_cart = false;
            entry.amount = 0;
            entry.updated_at = Utc::now();
            entry.clone()
        }))
    }

    async fn deactivate_all(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let mut touched = 0;
        for entry in state
            .cart
            .iter_mut()
            .filter(|entry| entry.user_id == user_id && entry.is_in_shopping_cart)
        {
            entry.is_in_shopping_cart = false;
            entry.amount = 0;
            entry.updated_at = now;
            touched += 1;
        }
        Ok(touched)
    }

    async fn active_lines(&self, user_id: Uuid) -> Result<Vec<CartLineRecord>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .cart
            .iter()
            .filter(|entry| entry.user_id == user_id && entry.is_in_shopping_cart)
            .filter_map(|entry| {
                state
                    .products
                    .iter()
                    .find(|p| p.id == entry.product_id)
                    .map(|product| CartLineRecord {
                        product_id: product.id,
                        product_name: product.name.clone(),
                        unit_price: product.price,
                        amount: entry.amount,
                    })
            })
            .collect())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut state = self.state.lock().await;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "email {} is already taken",
                user.email
            )));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        state.users.push(user.clone());
        Ok(user)
    }
}
