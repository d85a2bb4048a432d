//! Tokens Domain
//!
//! Persisted auth-token records: an opaque value tied to a user, a purpose and an expiry.
//! There is no HTTP surface; the authentication layer uses [`TokenService`] directly.
//!
//! Expired tokens are removed three ways:
//! - MongoDB's TTL index on `expires`
//! - [`TokenService::verify`] deletes an expired token it finds
//! - [`TokenService::purge_expired`], run periodically by the application

pub mod error;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{TokenError, TokenResult};
pub use models::{NewToken, Token, TokenType};
pub use self::mongodb::MongoTokenRepository;
pub use repository::{InMemoryTokenRepository, TokenRepository};
pub use service::{TokenService, generate_token_value};
