//! Route-level access policies.

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, middleware::auth::authenticate, models::Role, state::AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Anyone may read; only admins may write.
    ReadOrAdmin,
    /// Any signed-in user, any method.
    Authenticated,
}

pub fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// `role` is `None` for anonymous callers.
pub fn is_allowed(policy: AccessPolicy, role: Option<Role>, method: &Method) -> bool {
    match policy {
        AccessPolicy::ReadOrAdmin => is_safe_method(method) || role == Some(Role::Admin),
        AccessPolicy::Authenticated => role.is_some(),
    }
}

async fn enforce(
    policy: AccessPolicy,
    state: &AppState,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if is_allowed(policy, None, request.method()) {
        return Ok(next.run(request).await);
    }

    let Some(user) = authenticate(request.headers(), &state.auth)? else {
        return Err(AppError::Unauthorized("Authentication required".into()));
    };
    if !is_allowed(policy, Some(user.role), request.method()) {
        tracing::warn!(user_id = %user.user_id, method = %request.method(), "access denied");
        return Err(AppError::Forbidden);
    }

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub async fn read_or_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(AccessPolicy::ReadOrAdmin, &state, request, next).await
}

pub async fn authenticated(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(AccessPolicy::Authenticated, &state, request, next).await
}
