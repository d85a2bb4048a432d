use super::UNAUTHORIZED_MESSAGE;
use super::jwt::JwtAuth;
use crate::errors::AppError;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Extract JWT from Authorization header or cookie
fn extract_token_from_request(headers: &HeaderMap) -> Option<String> {
    // Authorization header first: "Bearer <token>"
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    // Fallback: "access_token=<token>" cookie
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| match cookie.trim().split_once('=') {
            Some((ACCESS_TOKEN_COOKIE, value)) if !value.is_empty() => Some(value.to_string()),
            _ => None,
        })
}

/// JWT authentication middleware
///
/// Validates the token from the Authorization header or the `access_token` cookie and
/// inserts [`JwtClaims`](super::JwtClaims) into request extensions on success.
/// Anything else is rejected with 401.
pub async fn jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = extract_token_from_request(request.headers()) else {
        tracing::debug!("No JWT found in Authorization header or cookie");
        return Err(AppError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string()));
    };

    let claims = auth.verify_token(&token).map_err(|e| {
        tracing::debug!("JWT verification failed: {}", e);
        AppError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string())
    })?;

    tracing::debug!(user_id = %claims.sub, "JWT verified");
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
