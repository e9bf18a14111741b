//! PostgreSQL-backed storage using SeaORM.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, SqlErr,
    TransactionTrait,
};
use uuid::Uuid;

use super::{
    CartLineRecord, CartRepository, CatalogRepository, NewCategory, NewProduct, NewSubcategory,
    NewUser, Page, PageRequest, StoreError, UserRepository,
};
use crate::{
    entity::{
        categories::{
            ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories,
            Model as CategoryModel,
        },
        products::{
            ActiveModel as ProductActive, Column as ProdCol, Entity as Products,
            Model as ProductModel,
        },
        shopping_cart::{
            self, ActiveModel as CartActive, Column as CartCol, Entity as ShoppingCart,
            Model as CartModel,
        },
        subcategories::{
            ActiveModel as SubcategoryActive, Column as SubcategoryCol, Entity as Subcategories,
            Model as SubcategoryModel,
        },
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    },
    models::{CartEntry, Category, Product, Role, Subcategory, User},
};

#[derive(Debug, Clone)]
pub struct SeaOrmStore {
    orm: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(orm: DatabaseConnection) -> Self {
        Self { orm }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.orm
    }

    async fn subcategory_titles(
        &self,
        category_ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, Vec<String>>, StoreError> {
        let mut titles: HashMap<Uuid, Vec<String>> = HashMap::new();
        if category_ids.is_empty() {
            return Ok(titles);
        }

        let rows = Subcategories::find()
            .filter(SubcategoryCol::CategoryId.is_in(category_ids))
            .order_by_asc(SubcategoryCol::CreatedAt)
            .all(&self.orm)
            .await?;
        for row in rows {
            titles.entry(row.category_id).or_default().push(row.title);
        }
        Ok(titles)
    }
}

/// Constraint violations become domain errors; everything else stays a
/// database error.
fn map_db_error(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => StoreError::Conflict(message),
        Some(SqlErr::ForeignKeyConstraintViolation(message)) => {
            StoreError::MissingReference(message)
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl CatalogRepository for SeaOrmStore {
    async fn list_categories(&self, page: PageRequest) -> Result<Page<Category>, StoreError> {
        let finder = Categories::find().order_by_asc(CategoryCol::CreatedAt);
        let total = finder.clone().count(&self.orm).await?;
        let rows = finder
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.orm)
            .await?;

        let mut titles = self
            .subcategory_titles(rows.iter().map(|row| row.id).collect())
            .await?;
        let items = rows
            .into_iter()
            .map(|row| {
                let subcategories = titles.remove(&row.id).unwrap_or_default();
                category_from_entity(row, subcategories)
            })
            .collect();

        Ok(Page { items, total })
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, StoreError> {
        let Some(row) = Categories::find_by_id(id).one(&self.orm).await? else {
            return Ok(None);
        };
        let subcategories = self
            .subcategory_titles(vec![row.id])
            .await?
            .remove(&row.id)
            .unwrap_or_default();
        Ok(Some(category_from_entity(row, subcategories)))
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category, StoreError> {
        let row = CategoryActive {
            id: Set(Uuid::new_v4()),
            title: Set(category.title),
            slug: Set(category.slug),
            image: Set(category.image),
            created_at: NotSet,
        }
        .insert(&self.orm)
        .await
        .map_err(map_db_error)?;
        Ok(category_from_entity(row, Vec::new()))
    }

    async fn list_subcategories(
        &self,
        page: PageRequest,
    ) -> Result<Page<Subcategory>, StoreError> {
        let finder = Subcategories::find().order_by_asc(SubcategoryCol::CreatedAt);
        let total = finder.clone().count(&self.orm).await?;
        let items = finder
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(subcategory_from_entity)
            .collect();
        Ok(Page { items, total })
    }

    async fn find_subcategory(&self, id: Uuid) -> Result<Option<Subcategory>, StoreError> {
        Ok(Subcategories::find_by_id(id)
            .one(&self.orm)
            .await?
            .map(subcategory_from_entity))
    }

    async fn create_subcategory(
        &self,
        subcategory: NewSubcategory,
    ) -> Result<Subcategory, StoreError> {
        let row = SubcategoryActive {
            id: Set(Uuid::new_v4()),
            title: Set(subcategory.title),
            slug: Set(subcategory.slug),
            image: Set(subcategory.image),
            category_id: Set(subcategory.category_id),
            created_at: NotSet,
        }
        .insert(&self.orm)
        .await
        .map_err(map_db_error)?;
        Ok(subcategory_from_entity(row))
    }

    async fn list_products(&self, page: PageRequest) -> Result<Page<Product>, StoreError> {
        let finder = Products::find().order_by_asc(ProdCol::CreatedAt);
        let total = finder.clone().count(&self.orm).await?;
        let items = finder
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(product_from_entity)
            .collect();
        Ok(Page { items, total })
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        Ok(Products::find_by_id(id)
            .one(&self.orm)
            .await?
            .map(product_from_entity))
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product, StoreError> {
        let row = ProductActive {
            id: Set(Uuid::new_v4()),
            name: Set(product.name),
            slug: Set(product.slug),
            image: Set(product.image),
            price: Set(product.price),
            category_id: Set(product.category_id),
            subcategory_id: Set(product.subcategory_id),
            created_at: NotSet,
        }
        .insert(&self.orm)
        .await
        .map_err(map_db_error)?;
        Ok(product_from_entity(row))
    }
}

#[derive(Debug, FromQueryResult)]
struct CartLineRow {
    product_id: Uuid,
    amount: i32,
    product_name: String,
    unit_price: Decimal,
}

#[async_trait]
impl CartRepository for SeaOrmStore {
    async fn activate(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        amount: i32,
    ) -> Result<CartEntry, StoreError> {
        let txn = self.orm.begin().await?;

        let existing = ShoppingCart::find()
            .filter(CartCol::UserId.eq(user_id))
            .filter(CartCol::ProductId.eq(product_id))
            .lock(LockType::Update)
            .one(&txn)
            .await?;

        let row = match existing {
            Some(row) if row.is_in_shopping_cart => {
                return Err(StoreError::Conflict(
                    "product is already in the shopping cart".into(),
                ));
            }
            Some(row) => {
                let mut active: CartActive = row.into();
                active.amount = Set(amount);
                active.is_in_shopping_cart = Set(true);
                active.updated_at = Set(Utc::now().into());
                active.update(&txn).await?
            }
            // Two concurrent first adds both land here; the `user_product`
            // constraint lets exactly one insert through.
            None => CartActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                product_id: Set(product_id),
                amount: Set(amount),
                is_in_shopping_cart: Set(true),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(&txn)
            .await
            .map_err(map_db_error)?,
        };

        txn.commit().await?;
        Ok(entry_from_entity(row))
    }

    async fn set_amount(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        amount: i32,
    ) -> Result<Option<CartEntry>, StoreError> {
        let txn = self.orm.begin().await?;

        let existing = ShoppingCart::find()
            .filter(CartCol::UserId.eq(user_id))
            .filter(CartCol::ProductId.eq(product_id))
            .filter(CartCol::IsInShoppingCart.eq(true))
            .lock(LockType::Update)
            .one(&txn)
            .await?;
        let Some(row) = existing else {
            return Ok(None);
        };

        let mut active: CartActive = row.into();
        active.amount = Set(amount);
        active.updated_at = Set(Utc::now().into());
        let row = active.update(&txn).await?;

        txn.commit().await?;
        Ok(Some(entry_from_entity(row)))
    }

    async fn deactivate(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<CartEntry>, StoreError> {
        let txn = self.orm.begin().await?;

        let existing = ShoppingCart::find()
            .filter(CartCol::UserId.eq(user_id))
            .filter(CartCol::ProductId.eq(product_id))
            .lock(LockType::Update)
            .one(&txn)
            .await?;
        let Some(row) = existing else {
            return Ok(None);
        };

        let mut active: CartActive = row.into();
        active.is_in_shopping_cart = Set(false);
        active.amount = Set(0);
        active.updated_at = Set(Utc::now().into());
        let row = active.update(&txn).await?;

        txn.commit().await?;
        Ok(Some(entry_from_entity(row)))
    }

    async fn deactivate_all(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let result = ShoppingCart::update_many()
            .col_expr(CartCol::IsInShoppingCart, Expr::value(false))
            .col_expr(CartCol::Amount, Expr::value(0))
            .col_expr(CartCol::UpdatedAt, Expr::value(Utc::now()))
            .filter(CartCol::UserId.eq(user_id))
            .filter(CartCol::IsInShoppingCart.eq(true))
            .exec(&self.orm)
            .await?;
        Ok(result.rows_affected)
    }

    async fn active_lines(&self, user_id: Uuid) -> Result<Vec<CartLineRecord>, StoreError> {
        let rows = ShoppingCart::find()
            .select_only()
            .column(CartCol::ProductId)
            .column(CartCol::Amount)
            .column_as(ProdCol::Name, "product_name")
            .column_as(ProdCol::Price, "unit_price")
            .join(JoinType::InnerJoin, shopping_cart::Relation::Products.def())
            .filter(CartCol::UserId.eq(user_id))
            .filter(CartCol::IsInShoppingCart.eq(true))
            .order_by_asc(CartCol::CreatedAt)
            .into_model::<CartLineRow>()
            .all(&self.orm)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| CartLineRecord {
                product_id: row.product_id,
                product_name: row.product_name,
                unit_price: row.unit_price,
                amount: row.amount,
            })
            .collect())
    }
}

#[async_trait]
impl UserRepository for SeaOrmStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(Users::find()
            .filter(UserCol::Email.eq(email))
            .one(&self.orm)
            .await?
            .map(user_from_entity))
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let row = UserActive {
            id: Set(Uuid::new_v4()),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            role: Set(user.role.as_str().to_string()),
            created_at: NotSet,
        }
        .insert(&self.orm)
        .await
        .map_err(map_db_error)?;
        Ok(user_from_entity(row))
    }
}

fn category_from_entity(model: CategoryModel, subcategories: Vec<String>) -> Category {
    Category {
        id: model.id,
        title: model.title,
        slug: model.slug,
        image: model.image,
        created_at: model.created_at.with_timezone(&Utc),
        subcategories,
    }
}

fn subcategory_from_entity(model: SubcategoryModel) -> Subcategory {
    Subcategory {
        id: model.id,
        title: model.title,
        slug: model.slug,
        image: model.image,
        category_id: model.category_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        slug: model.slug,
        image: model.image,
        price: model.price,
        category_id: model.category_id,
        subcategory_id: model.subcategory_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn entry_from_entity(model: CartModel) -> CartEntry {
    CartEntry {
        id: model.id,
        user_id: model.user_id,
        product_id: model.product_id,
        amount: model.amount,
        is_in_shopping_cart: model.is_in_shopping_cart,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        email: model.email,
        password_hash: model.password_hash,
        role: Role::parse(&model.role),
        created_at: model.created_at.with_timezone(&Utc),
    }
}
