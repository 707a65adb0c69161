use axum::{
    Json,
    extract::{Request, State, rejection::JsonRejection},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::types::LoginRequest;
use super::{ApiError, ApiResponse, AppState};
use crate::services::LoginResult;

// ============================================================================
// Middleware
// ============================================================================

/// Resolves `Authorization: Bearer <token>` and stores the [`CurrentUser`](crate::services::CurrentUser)
/// in the request extensions for the handlers behind it.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(&headers)
        .ok_or_else(|| ApiError::unauthenticated("Missing or malformed bearer token"))?;

    let user = state.auth_service.authenticate(&token).await?;

    tracing::Span::current().record("user_id", user.id.value());
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Token from an `Authorization: Bearer` header, if well-formed.
fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
/// Verify username and password, returns a fresh bearer token
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    let Json(payload) = payload?;

    let result = state
        .auth_service
        .login(payload.username.trim(), &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(result)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_is_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer abc123"));
        assert_eq!(extract_bearer(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn malformed_headers_are_rejected() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer(&headers).is_none());

        headers.insert("Authorization", HeaderValue::from_static("Basic abc123"));
        assert!(extract_bearer(&headers).is_none());

        headers.insert("Authorization", HeaderValue::from_static("Bearer   "));
        assert!(extract_bearer(&headers).is_none());
    }
}
