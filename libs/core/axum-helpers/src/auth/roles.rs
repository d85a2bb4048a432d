//! Role-based route guard.
//!
//! Runs after [`jwt_auth_middleware`](super::jwt_auth_middleware) and checks the verified
//! claims against the roles a route requires. The required set is passed as middleware
//! state, so each route declares its own.

use super::jwt::JwtClaims;
use super::{FORBIDDEN_MESSAGE, UNAUTHORIZED_MESSAGE};
use crate::errors::AppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Roles of which the caller must hold at least one.
///
/// An empty set admits any authenticated caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequiredRoles(Arc<[String]>);

impl RequiredRoles {
    pub fn any_of<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: ToString,
    {
        Self(roles.into_iter().map(|r| r.to_string()).collect())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// True when `claims` carries at least one of the required roles.
    pub fn allows(&self, claims: &JwtClaims) -> bool {
        self.0.is_empty() || self.0.iter().any(|required| claims.has_role(required))
    }
}

/// Rejects the request before it reaches the handler unless the caller holds a required role.
///
/// - no verified claims in the request: 401
/// - claims without an intersecting role: 403
pub async fn require_roles(
    State(required): State<RequiredRoles>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(claims) = request.extensions().get::<JwtClaims>() else {
        return Err(AppError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string()));
    };

    if !required.allows(claims) {
        tracing::info!(
            user_id = %claims.sub,
            roles = ?claims.roles,
            required = ?required.as_slice(),
            "Role check failed"
        );
        return Err(AppError::Forbidden(FORBIDDEN_MESSAGE.to_string()));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtAuth, JwtConfig, jwt_auth_middleware};
    use axum::{
        Router,
        body::Body,
        http::{Request as HttpRequest, StatusCode, header},
        middleware::from_fn_with_state,
        routing::get,
    };
    use http_body_util::BodyExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    fn claims(roles: &[&str]) -> JwtClaims {
        JwtClaims {
            sub: "u1".into(),
            email: "u1@example.com".into(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            exp: 0,
            iat: 0,
            jti: "j".into(),
        }
    }

    #[test]
    fn test_allows_intersection() {
        let required = RequiredRoles::any_of(["super_admin", "admin"]);
        assert!(required.allows(&claims(&["admin"])));
        assert!(required.allows(&claims(&["user", "super_admin"])));
        assert!(!required.allows(&claims(&["user"])));
        assert!(!required.allows(&claims(&[])));
    }

    #[test]
    fn test_empty_requirement_admits_any_authenticated() {
        assert!(RequiredRoles::any_of(Vec::<String>::new()).allows(&claims(&[])));
    }

    struct Harness {
        app: Router,
        auth: JwtAuth,
        hits: Arc<AtomicUsize>,
    }

    fn harness() -> Harness {
        let auth = JwtAuth::new(&JwtConfig::new("roles-test-secret-that-is-long-enough"));
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        let guarded = get(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                "ok"
            }
        })
        .route_layer(from_fn_with_state(
            RequiredRoles::any_of(["super_admin"]),
            require_roles,
        ));

        let app = Router::new()
            .route("/admin", guarded)
            .layer(from_fn_with_state(auth.clone(), jwt_auth_middleware));

        Harness { app, auth, hits }
    }

    async fn call(app: Router, token: Option<String>) -> (StatusCode, String) {
        let mut builder = HttpRequest::get("/admin");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_wrong_role_is_forbidden_and_handler_not_called() {
        let h = harness();
        let token = h
            .auth
            .create_access_token("u1", "u1@example.com", &["user".to_string()])
            .unwrap();

        let (status, body) = call(h.app, Some(token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.contains(FORBIDDEN_MESSAGE));
        assert_eq!(h.hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized_and_handler_not_called() {
        let h = harness();
        let (status, _) = call(h.app, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(h.hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_required_role_reaches_handler() {
        let h = harness();
        let token = h
            .auth
            .create_access_token("u1", "u1@example.com", &["super_admin".to_string()])
            .unwrap();

        let (status, body) = call(h.app, Some(token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
        assert_eq!(h.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_guard_without_auth_layer_is_unauthorized() {
        let app = Router::new().route(
            "/admin",
            get(|| async { "ok" }).route_layer(from_fn_with_state(
                RequiredRoles::any_of(["super_admin"]),
                require_roles,
            )),
        );
        let (status, _) = call(app, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
