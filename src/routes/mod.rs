use std::time::Duration;

use axum::{
    Router,
    http::{HeaderName, Request, Response, Uri},
    middleware::from_fn_with_state,
    routing::get,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::{error::AppError, middleware::permissions, state::AppState};

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod doc;
pub mod health;
pub mod params;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// The `/api` tree. Policies are attached with `route_layer` so unknown paths
/// still fall through to the 404 handler.
pub fn create_api_router(state: &AppState) -> Router<AppState> {
    let catalog = catalog::router().route_layer(from_fn_with_state(
        state.clone(),
        permissions::read_or_admin,
    ));
    let cart = cart::router().route_layer(from_fn_with_state(
        state.clone(),
        permissions::authenticated,
    ));

    Router::new()
        .nest("/auth", auth::router())
        .nest("/cart", cart)
        .merge(catalog)
}

fn request_id(headers: &axum::http::HeaderMap) -> &str {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
}

/// Full application: health, API, docs and the middleware stack.
pub fn build_app(state: AppState) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id(request.headers())
            )
        })
        .on_request(|request: &Request<_>, _span: &tracing::Span| {
            tracing::info!(
                request_id = %request_id(request.headers()),
                method = %request.method(),
                uri = %request.uri(),
                "request started"
            );
        })
        .on_response(
            |response: &Response<_>, latency: Duration, _span: &tracing::Span| {
                tracing::info!(
                    status = %response.status(),
                    ms = %latency.as_millis(),
                    "request finished"
                );
            },
        );

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", create_api_router(&state))
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .layer(trace_layer)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .layer(ConcurrencyLimitLayer::new(100))
        .with_state(state)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {}", uri.path()))
}
