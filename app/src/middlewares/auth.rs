use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::{
    core::state::AppState,
    repos::users::UsersRepo,
    utils::{jwt::verify_jwt, response::ApiError},
};

/// Verifies the bearer token and injects the principal's user row as a
/// request extension. Everything behind this middleware can assume an
/// authenticated principal.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(tok) if tok.starts_with("Bearer ") => &tok[7..],
        _ => {
            error!("Auth failed, missing or invalid authorization header");
            return ApiError::Unauthorized("Authentication required".to_string()).into_response();
        }
    };

    let claims = match verify_jwt(token, &state.config.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            error!("Auth failed, invalid token: {}", e);
            return ApiError::Unauthorized("Invalid token".to_string()).into_response();
        }
    };

    let users_repo = UsersRepo::new(state.database.clone());
    let user = match users_repo.get_by_email(&claims.sub).await {
        Ok(u) => u,
        Err(e) => {
            error!("Principal not found: {}", e);
            return ApiError::Unauthorized("Unknown principal".to_string()).into_response();
        }
    };

    request.extensions_mut().insert(user);
    next.run(request).await
}
