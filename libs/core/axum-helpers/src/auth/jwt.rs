use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default access token time-to-live (15 minutes)
pub const ACCESS_TOKEN_TTL: i64 = 900;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,        // Subject (user ID)
    pub email: String,      // User email
    pub roles: Vec<String>, // User roles
    pub exp: i64,           // Expiration time
    pub iat: i64,           // Issued at
    pub jti: String,        // JWT ID
}

impl JwtClaims {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Stateless HS256 access-token signer and verifier.
#[derive(Clone)]
pub struct JwtAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl_secs: i64,
}

impl std::fmt::Debug for JwtAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuth")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .finish_non_exhaustive()
    }
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        tracing::info!(access_ttl_secs = config.access_ttl_secs, "JWT auth initialized");
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            access_ttl_secs: config.access_ttl_secs,
        }
    }

    /// Create an access token with the configured TTL
    pub fn create_access_token(
        &self,
        user_id: &str,
        email: &str,
        roles: &[String],
    ) -> eyre::Result<String> {
        self.create_token(user_id, email, roles, self.access_ttl_secs)
    }

    /// Create a JWT with an explicit TTL. Negative values produce an already expired token.
    pub fn create_token(
        &self,
        user_id: &str,
        email: &str,
        roles: &[String],
        ttl_seconds: i64,
    ) -> eyre::Result<String> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            roles: roles.to_vec(),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Verify signature and expiry, then decode claims
    pub fn verify_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data = decode::<JwtClaims>(token, &self.decoding, &validation)?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("test-secret-that-is-long-enough-1234"))
    }

    #[test]
    fn test_issue_and_verify() {
        let auth = auth();
        let roles = vec!["super_admin".to_string()];
        let token = auth
            .create_access_token("64b7f0c2a1b2c3d4e5f60718", "root@example.com", &roles)
            .unwrap();

        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "64b7f0c2a1b2c3d4e5f60718");
        assert_eq!(claims.email, "root@example.com");
        assert!(claims.has_role("super_admin"));
        assert!(!claims.has_role("user"));
        assert_eq!(claims.exp - claims.iat, ACCESS_TOKEN_TTL);
    }

    #[test]
    fn test_each_token_gets_unique_jti() {
        let auth = auth();
        let a = auth.create_access_token("1", "a@example.com", &[]).unwrap();
        let b = auth.create_access_token("1", "a@example.com", &[]).unwrap();
        let ca = auth.verify_token(&a).unwrap();
        let cb = auth.verify_token(&b).unwrap();
        assert_ne!(ca.jti, cb.jti);
    }

    #[test]
    fn test_expired_token_rejected() {
        let auth = auth();
        let token = auth.create_token("1", "a@example.com", &[], -60).unwrap();
        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let other = JwtAuth::new(&JwtConfig::new("another-secret-that-is-long-enough-99"));
        let token = other.create_access_token("1", "a@example.com", &[]).unwrap();
        assert!(auth().verify_token(&token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(auth().verify_token("not.a.jwt").is_err());
    }
}
