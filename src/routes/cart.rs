use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::cart::{CartAmountRequest, CartSummary, ClearedCart},
    error::AppResult,
    middleware::auth::AuthUser,
    models::CartEntry,
    response::{ApiResponse, Meta},
    services::cart_service::{self, CartStatus},
    state::AppState,
};

/// HTTP status for a cart state transition.
fn status_code(status: CartStatus) -> StatusCode {
    match status {
        CartStatus::Created => StatusCode::CREATED,
        CartStatus::Updated | CartStatus::Removed | CartStatus::Cleared => StatusCode::OK,
        CartStatus::Conflict => StatusCode::CONFLICT,
        CartStatus::NotFound => StatusCode::NOT_FOUND,
        CartStatus::InvalidInput => StatusCode::BAD_REQUEST,
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cart_summary).delete(clear_cart))
        .route(
            "/{product_id}",
            axum::routing::post(add_to_cart)
                .put(update_cart_item)
                .delete(remove_from_cart),
        )
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Active cart contents with totals", body = ApiResponse<CartSummary>),
        (status = 401, description = "Not authenticated"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn cart_summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartSummary>>> {
    let summary = cart_service::summarize_cart(state.store.as_ref(), user.user_id).await?;
    Ok(Json(ApiResponse::success(
        "Shopping cart",
        summary,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    responses(
        (status = 200, description = "Deactivate every entry in the cart", body = ApiResponse<ClearedCart>),
        (status = 401, description = "Not authenticated"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<(StatusCode, Json<ApiResponse<ClearedCart>>)> {
    let outcome = cart_service::clear_cart(state.store.as_ref(), user.user_id).await?;
    Ok((
        status_code(outcome.status),
        Json(ApiResponse::success(
            "Cart cleared",
            ClearedCart {
                cleared: outcome.data,
            },
            Some(Meta::empty()),
        )),
    ))
}

#[utoipa::path(
    post,
    path = "/api/cart/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    request_body = CartAmountRequest,
    responses(
        (status = 201, description = "Product added to the cart", body = ApiResponse<CartEntry>),
        (status = 400, description = "Amount below 1"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Product already in the cart, use PUT to change the amount"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<CartAmountRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CartEntry>>)> {
    let outcome = cart_service::add_to_cart(
        state.store.as_ref(),
        user.user_id,
        product_id,
        payload.amount,
    )
    .await?;
    Ok((
        status_code(outcome.status),
        Json(ApiResponse::success("Added to cart", outcome.data, None)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/cart/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    request_body = CartAmountRequest,
    responses(
        (status = 200, description = "Amount changed", body = ApiResponse<CartEntry>),
        (status = 400, description = "Amount below 1"),
        (status = 404, description = "Product not found or not in the cart"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<CartAmountRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CartEntry>>)> {
    let outcome = cart_service::update_quantity(
        state.store.as_ref(),
        user.user_id,
        product_id,
        payload.amount,
    )
    .await?;
    Ok((
        status_code(outcome.status),
        Json(ApiResponse::success("Cart updated", outcome.data, None)),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/cart/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Entry deactivated", body = ApiResponse<CartEntry>),
        (status = 404, description = "Product not found or never added"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<ApiResponse<CartEntry>>)> {
    let outcome =
        cart_service::remove_from_cart(state.store.as_ref(), user.user_id, product_id).await?;
    Ok((
        status_code(outcome.status),
        Json(ApiResponse::success(
            "Removed from cart",
            outcome.data,
            Some(Meta::empty()),
        )),
    ))
}
