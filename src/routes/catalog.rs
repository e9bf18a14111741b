use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::catalog::{
        CategoryList, CreateCategoryRequest, CreateProductRequest, CreateSubcategoryRequest,
        ProductList, SubcategoryList,
    },
    error::AppResult,
    models::{Category, Product, Subcategory},
    response::ApiResponse,
    routes::params::Pagination,
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{id}", get(get_category))
        .route(
            "/subcategories",
            get(list_subcategories).post(create_subcategory),
        )
        .route("/subcategories/{id}", get(get_subcategory))
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", get(get_product))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    params(Pagination),
    responses(
        (status = 200, description = "List categories with their subcategory titles", body = ApiResponse<CategoryList>)
    ),
    tag = "Catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = catalog_service::list_categories(state.store.as_ref(), pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Get category", body = ApiResponse<Category>),
        (status = 404, description = "Category not found"),
    ),
    tag = "Catalog"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = catalog_service::get_category(state.store.as_ref(), id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Create category", body = ApiResponse<Category>),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Admins only"),
        (status = 409, description = "Slug already taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let resp = catalog_service::create_category(state.store.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/subcategories",
    params(Pagination),
    responses(
        (status = 200, description = "List subcategories", body = ApiResponse<SubcategoryList>)
    ),
    tag = "Catalog"
)]
pub async fn list_subcategories(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<SubcategoryList>>> {
    let resp = catalog_service::list_subcategories(state.store.as_ref(), pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/subcategories/{id}",
    params(
        ("id" = Uuid, Path, description = "Subcategory ID")
    ),
    responses(
        (status = 200, description = "Get subcategory", body = ApiResponse<Subcategory>),
        (status = 404, description = "Subcategory not found"),
    ),
    tag = "Catalog"
)]
pub async fn get_subcategory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Subcategory>>> {
    let resp = catalog_service::get_subcategory(state.store.as_ref(), id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/subcategories",
    request_body = CreateSubcategoryRequest,
    responses(
        (status = 201, description = "Create subcategory", body = ApiResponse<Subcategory>),
        (status = 400, description = "Invalid payload or unknown category"),
        (status = 403, description = "Admins only"),
        (status = 409, description = "Slug already taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_subcategory(
    State(state): State<AppState>,
    Json(payload): Json<CreateSubcategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Subcategory>>)> {
    let resp = catalog_service::create_subcategory(state.store.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(Pagination),
    responses(
        (status = 200, description = "List products", body = ApiResponse<ProductList>)
    ),
    tag = "Catalog"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = catalog_service::list_products(state.store.as_ref(), pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Catalog"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = catalog_service::get_product(state.store.as_ref(), id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Create product", body = ApiResponse<Product>),
        (status = 400, description = "Invalid payload or unknown category/subcategory"),
        (status = 403, description = "Admins only"),
        (status = 409, description = "Slug already taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let resp = catalog_service::create_product(state.store.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
