use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    dto::catalog::{
        CategoryList, CreateCategoryRequest, CreateProductRequest, CreateSubcategoryRequest,
        ProductList, SubcategoryList,
    },
    error::{AppError, AppResult},
    models::{Category, Product, Subcategory},
    repository::{CatalogRepository, NewCategory, NewProduct, NewSubcategory, PageRequest},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
};

const MAX_TITLE_LEN: usize = 64;
const MAX_SLUG_LEN: usize = 64;

fn page_request(pagination: Pagination) -> PageRequest {
    let (limit, offset) = pagination.normalize();
    PageRequest { limit, offset }
}

fn validate_title(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{field} must not be blank")));
    }
    if value.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::BadRequest(format!(
            "{field} must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

/// Letters, digits, hyphens and underscores only.
fn validate_slug(slug: &str) -> AppResult<()> {
    let valid = !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(AppError::BadRequest(format!(
            "slug must be 1-{MAX_SLUG_LEN} letters, digits, hyphens or underscores"
        )));
    }
    Ok(())
}

fn validate_price(price: Decimal) -> AppResult<()> {
    if price < Decimal::ONE {
        return Err(AppError::BadRequest(
            "price must be greater than or equal to 1".to_string(),
        ));
    }
    if price.scale() > 2 {
        return Err(AppError::BadRequest(
            "price must have at most 2 decimal places".to_string(),
        ));
    }
    Ok(())
}

pub async fn list_categories<S>(
    store: &S,
    pagination: Pagination,
) -> AppResult<ApiResponse<CategoryList>>
where
    S: CatalogRepository + ?Sized,
{
    let page = page_request(pagination);
    let result = store.list_categories(page).await?;
    let meta = Meta::new(page.limit, page.offset, result.total);
    Ok(ApiResponse::success(
        "Categories",
        CategoryList {
            items: result.items,
        },
        Some(meta),
    ))
}

pub async fn get_category<S>(store: &S, id: Uuid) -> AppResult<ApiResponse<Category>>
where
    S: CatalogRepository + ?Sized,
{
    let category = match store.find_category(id).await? {
        Some(c) => c,
        None => return Err(AppError::NotFound(format!("category {id}"))),
    };
    Ok(ApiResponse::success("Category", category, None))
}

pub async fn create_category<S>(
    store: &S,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>>
where
    S: CatalogRepository + ?Sized,
{
    validate_title("title", &payload.title)?;
    validate_slug(&payload.slug)?;

    let category = store
        .create_category(NewCategory {
            title: payload.title,
            slug: payload.slug,
            image: payload.image,
        })
        .await?;

    tracing::info!(category_id = %category.id, slug = %category.slug, "category created");
    Ok(ApiResponse::success(
        "Category created",
        category,
        Some(Meta::empty()),
    ))
}

pub async fn list_subcategories<S>(
    store: &S,
    pagination: Pagination,
) -> AppResult<ApiResponse<SubcategoryList>>
where
    S: CatalogRepository + ?Sized,
{
    let page = page_request(pagination);
    let result = store.list_subcategories(page).await?;
    let meta = Meta::new(page.limit, page.offset, result.total);
    Ok(ApiResponse::success(
        "Subcategories",
        SubcategoryList {
            items: result.items,
        },
        Some(meta),
    ))
}

pub async fn get_subcategory<S>(store: &S, id: Uuid) -> AppResult<ApiResponse<Subcategory>>
where
    S: CatalogRepository + ?Sized,
{
    let subcategory = match store.find_subcategory(id).await? {
        Some(s) => s,
        None => return Err(AppError::NotFound(format!("subcategory {id}"))),
    };
    Ok(ApiResponse::success("Subcategory", subcategory, None))
}

pub async fn create_subcategory<S>(
    store: &S,
    payload: CreateSubcategoryRequest,
) -> AppResult<ApiResponse<Subcategory>>
where
    S: CatalogRepository + ?Sized,
{
    validate_title("title", &payload.title)?;
    validate_slug(&payload.slug)?;
    if store.find_category(payload.category_id).await?.is_none() {
        return Err(AppError::BadRequest("category not found".to_string()));
    }

    let subcategory = store
        .create_subcategory(NewSubcategory {
            title: payload.title,
            slug: payload.slug,
            image: payload.image,
            category_id: payload.category_id,
        })
        .await?;

    tracing::info!(
        subcategory_id = %subcategory.id,
        category_id = %subcategory.category_id,
        "subcategory created"
    );
    Ok(ApiResponse::success(
        "Subcategory created",
        subcategory,
        Some(Meta::empty()),
    ))
}

pub async fn list_products<S>(
    store: &S,
    pagination: Pagination,
) -> AppResult<ApiResponse<ProductList>>
where
    S: CatalogRepository + ?Sized,
{
    let page = page_request(pagination);
    let result = store.list_products(page).await?;
    let meta = Meta::new(page.limit, page.offset, result.total);
    Ok(ApiResponse::success(
        "Products",
        ProductList {
            items: result.items,
        },
        Some(meta),
    ))
}

pub async fn get_product<S>(store: &S, id: Uuid) -> AppResult<ApiResponse<Product>>
where
    S: CatalogRepository + ?Sized,
{
    let product = match store.find_product(id).await? {
        Some(p) => p,
        None => return Err(AppError::NotFound(format!("product {id}"))),
    };
    Ok(ApiResponse::success("Product", product, None))
}

pub async fn create_product<S>(
    store: &S,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>>
where
    S: CatalogRepository + ?Sized,
{
    validate_title("name", &payload.name)?;
    validate_slug(&payload.slug)?;
    validate_price(payload.price)?;

    let subcategory = match store.find_subcategory(payload.subcategory_id).await? {
        Some(s) => s,
        None => return Err(AppError::BadRequest("subcategory not found".to_string())),
    };
    if subcategory.category_id != payload.category_id {
        return Err(AppError::BadRequest(
            "subcategory does not belong to the given category".to_string(),
        ));
    }

    let product = store
        .create_product(NewProduct {
            name: payload.name,
            slug: payload.slug,
            image: payload.image,
            price: payload.price,
            category_id: payload.category_id,
            subcategory_id: payload.subcategory_id,
        })
        .await?;

    tracing::info!(product_id = %product.id, price = %product.price, "product created");
    Ok(ApiResponse::success(
        "Product created",
        product,
        Some(Meta::empty()),
    ))
}
