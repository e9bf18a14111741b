mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use common::fixture;
use serde_json::{Value, json};
use shop_api::{models::Role, routes::build_app};
use tower::ServiceExt;

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> anyhow::Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, json))
}

#[tokio::test]
async fn register_login_and_fill_cart() -> anyhow::Result<()> {
    let fx = fixture().await;
    let app = build_app(fx.state());

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "email": "Shopper@Example.com", "password": "hunter2" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["email"], "shopper@example.com");
    assert!(body["data"].get("password_hash").is_none());

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "shopper@example.com", "password": "hunter2" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().expect("token").to_string();
    assert!(token.starts_with("Bearer "));

    let phone = format!("/api/cart/{}", fx.phone.id);
    let (status, body) = send(&app, "POST", &phone, Some(&token), Some(json!({ "amount": 2 }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["amount"], 2);

    let (status, _) = send(&app, "POST", &phone, Some(&token), Some(json!({ "amount": 1 }))).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "GET", "/api/cart", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_items"], 2);
    assert_eq!(body["data"]["total_price"], "1599.98");
    assert_eq!(body["data"]["cart_contents"][0]["product_price"], "799.99");
    assert_eq!(body["data"]["cart_contents"][0]["product_name"], "iPhone 13");

    let (status, _) = send(&app, "PUT", &phone, Some(&token), Some(json!({ "amount": 3 }))).await?;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, "GET", "/api/cart", Some(&token), None).await?;
    assert_eq!(body["data"]["total_price"], "2399.97");

    let (status, body) = send(&app, "DELETE", &phone, Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_in_shopping_cart"], false);
    assert_eq!(body["data"]["amount"], 0);

    let (_, body) = send(&app, "GET", "/api/cart", Some(&token), None).await?;
    assert_eq!(body["data"]["total_items"], 0);
    assert_eq!(body["data"]["total_price"], "0");
    assert_eq!(body["data"]["cart_contents"], json!([]));
    Ok(())
}

#[tokio::test]
async fn cart_errors_map_to_statuses() -> anyhow::Result<()> {
    let fx = fixture().await;
    let (_, token) = fx.user_with_token("buyer@example.com", Role::User).await;
    let app = build_app(fx.state());
    let mug = format!("/api/cart/{}", fx.mug.id);

    let (status, _) = send(&app, "POST", &mug, Some(&token), Some(json!({ "amount": 0 }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "PUT", &mug, Some(&token), Some(json!({ "amount": 2 }))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &mug, Some(&token), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let unknown = format!("/api/cart/{}", uuid::Uuid::new_v4());
    let (status, _) = send(&app, "POST", &unknown, Some(&token), Some(json!({ "amount": 1 }))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(&app, "POST", &mug, Some(&token), Some(json!({ "amount": 2 }))).await?;
    let (status, body) = send(&app, "DELETE", "/api/cart", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cleared"], 1);
    let (_, body) = send(&app, "DELETE", "/api/cart", Some(&token), None).await?;
    assert_eq!(body["data"]["cleared"], 0);
    Ok(())
}

#[tokio::test]
async fn storage_failures_answer_500() -> anyhow::Result<()> {
    let fx = fixture().await;
    let (_, token) = fx.user_with_token("unlucky@example.com", Role::User).await;
    let app = build_app(fx.broken_cart_state());

    let uri = format!("/api/cart/{}", fx.phone.id);
    let (status, body) = send(&app, "POST", &uri, Some(&token), Some(json!({ "amount": 1 }))).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "ORM error");
    assert_eq!(body["data"]["error"], "ORM error");
    assert!(body["meta"].is_object());

    let (status, _) = send(&app, "DELETE", "/api/cart", Some(&token), None).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = send(&app, "GET", "/api/products", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn cart_requires_authentication() -> anyhow::Result<()> {
    let fx = fixture().await;
    let app = build_app(fx.state());

    let (status, _) = send(&app, "GET", "/api/cart", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/cart", Some("Bearer not-a-jwt"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let uri = format!("/api/cart/{}", fx.phone.id);
    let (status, _) = send(&app, "POST", &uri, None, Some(json!({ "amount": 1 }))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn catalog_is_public_to_read_and_admin_to_write() -> anyhow::Result<()> {
    let fx = fixture().await;
    let (_, user_token) = fx.user_with_token("user@example.com", Role::User).await;
    let (_, admin_token) = fx.user_with_token("admin@example.com", Role::Admin).await;
    let app = build_app(fx.state());

    let (status, body) = send(&app, "GET", "/api/categories", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["slug"], "electronics");
    assert_eq!(body["data"][0]["subcategories"], json!(["Phones"]));
    assert_eq!(body["meta"]["total"], 1);

    let (status, body) = send(&app, "GET", "/api/products?limit=1&offset=1", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"][0]["name"], "Ferris Mug");
    assert_eq!(body["data"][0]["price"], "12.50");
    assert_eq!(body["meta"]["total"], 2);

    let uri = format!("/api/products/{}", fx.phone.id);
    let (status, body) = send(&app, "GET", &uri, None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price"], "799.99");

    let uri = format!("/api/categories/{}", uuid::Uuid::new_v4());
    let (status, _) = send(&app, "GET", &uri, None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let new_category = json!({ "title": "Books", "slug": "books" });
    let (status, _) = send(&app, "POST", "/api/categories", None, Some(new_category.clone())).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(
        &app,
        "POST",
        "/api/categories",
        Some(&user_token),
        Some(new_category.clone()),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = send(
        &app,
        "POST",
        "/api/categories",
        Some(&admin_token),
        Some(new_category.clone()),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["slug"], "books");

    let (status, _) = send(
        &app,
        "POST",
        "/api/categories",
        Some(&admin_token),
        Some(new_category),
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let cheap = json!({
        "name": "Sticker",
        "slug": "sticker",
        "price": "0.50",
        "category_id": fx.category_id,
        "subcategory_id": fx.subcategory_id,
    });
    let (status, _) = send(&app, "POST", "/api/products", Some(&admin_token), Some(cheap)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn unknown_route_and_health() -> anyhow::Result<()> {
    let fx = fixture().await;
    let app = build_app(fx.state());

    let (status, body) = send(&app, "GET", "/api/nope", None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not Found: no route for /api/nope");
    assert_eq!(body["data"]["error"], body["message"]);
    assert!(body["meta"].is_object());

    let (status, body) = send(&app, "GET", "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}
