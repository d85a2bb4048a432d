//! Authentication and authorization module.
//!
//! This module provides:
//! - HS256 access-token creation and verification ([`JwtAuth`])
//! - Bearer/cookie authentication middleware that stores [`JwtClaims`] in request extensions
//! - A role guard ([`require_roles`]) that checks those claims against a [`RequiredRoles`] set
//!
//! # Example
//!
//! ```ignore
//! use axum::{middleware::from_fn_with_state, routing::post, Router};
//! use axum_helpers::auth::{jwt_auth_middleware, require_roles, JwtAuth, JwtConfig, RequiredRoles};
//! use core_config::FromEnv;
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//!
//! let admin_only = post(create).route_layer(from_fn_with_state(
//!     RequiredRoles::any_of(["super_admin"]),
//!     require_roles,
//! ));
//!
//! let app = Router::new()
//!     .route("/users", admin_only)
//!     .layer(from_fn_with_state(auth, jwt_auth_middleware));
//! ```

pub mod config;
pub mod jwt;
pub mod middleware;
pub mod roles;

pub use config::JwtConfig;
pub use jwt::{ACCESS_TOKEN_TTL, JwtAuth, JwtClaims};
pub use middleware::jwt_auth_middleware;
pub use roles::{RequiredRoles, require_roles};

/// Message returned when a request carries no valid credentials.
pub const UNAUTHORIZED_MESSAGE: &str =
    "You are not authorized to access this endpoint, please login!";

/// Message returned when the caller is authenticated but lacks a required role.
pub const FORBIDDEN_MESSAGE: &str =
    "You are not authorized to access this endpoint, please contact the administrator!";
