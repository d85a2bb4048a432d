//! Token service - issuing, verifying and revoking auth tokens

use chrono::{Duration, Utc};
use domain_users::UserRepository;
use mongodb::bson::oid::ObjectId;
use observability::AccountMetrics;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

use crate::error::{TokenError, TokenResult};
use crate::models::{Token, TokenType};
use crate::repository::TokenRepository;

/// Random bytes behind each token value
pub const TOKEN_BYTES: usize = 32;

/// 32 random bytes, hex-encoded
pub fn generate_token_value() -> String {
    let bytes: Vec<u8> = (0..TOKEN_BYTES).map(|_| rand::random::<u8>()).collect();
    const_hex::encode(bytes)
}

/// Issues and checks tokens for existing users.
pub struct TokenService<T: TokenRepository, U: UserRepository> {
    tokens: Arc<T>,
    users: Arc<U>,
}

impl<T: TokenRepository, U: UserRepository> Clone for TokenService<T, U> {
    fn clone(&self) -> Self {
        Self {
            tokens: Arc::clone(&self.tokens),
            users: Arc::clone(&self.users),
        }
    }
}

impl<T: TokenRepository, U: UserRepository> TokenService<T, U> {
    pub fn new(tokens: T, users: U) -> Self {
        Self {
            tokens: Arc::new(tokens),
            users: Arc::new(users),
        }
    }

    /// Issue a fresh token for `user`, valid for `ttl`.
    ///
    /// The user must exist at issue time.
    #[instrument(skip(self))]
    pub async fn issue(
        &self,
        user: ObjectId,
        token_type: TokenType,
        ttl: Duration,
    ) -> TokenResult<Token> {
        if ttl <= Duration::zero() {
            return Err(TokenError::Validation("ttl must be positive".to_string()));
        }

        if self.users.get_by_id(user).await?.is_none() {
            return Err(TokenError::UnknownUser(user.to_hex()));
        }

        let token = Token::new(generate_token_value(), user, Utc::now() + ttl, token_type)?;
        let token = self.tokens.create(token).await?;

        AccountMetrics::record_token_issued(token_type.as_ref());
        tracing::info!(token_id = %token.id, expires = %token.expires, "Token issued");
        Ok(token)
    }

    /// Look a token up by value and type.
    ///
    /// An expired token is deleted and reported as [`TokenError::Expired`].
    #[instrument(skip(self, token))]
    pub async fn verify(&self, token: &str, token_type: TokenType) -> TokenResult<Token> {
        let Some(found) = self.tokens.find_by_token(token, token_type).await? else {
            AccountMetrics::record_token_verification(token_type.as_ref(), "not_found");
            return Err(TokenError::NotFound);
        };

        if found.is_expired(Utc::now()) {
            self.tokens.delete(found.id).await?;
            AccountMetrics::record_token_verification(token_type.as_ref(), "expired");
            tracing::info!(token_id = %found.id, "Expired token removed on verify");
            return Err(TokenError::Expired);
        }

        AccountMetrics::record_token_verification(token_type.as_ref(), "valid");
        Ok(found)
    }

    #[instrument(skip(self))]
    pub async fn revoke(&self, id: ObjectId) -> TokenResult<()> {
        if !self.tokens.delete(id).await? {
            return Err(TokenError::NotFound);
        }
        AccountMetrics::record_tokens_revoked(1);
        Ok(())
    }

    /// Revoke every token of `user`, or only those of `token_type`. Returns the count removed.
    #[instrument(skip(self))]
    pub async fn revoke_all_for_user(
        &self,
        user: ObjectId,
        token_type: Option<TokenType>,
    ) -> TokenResult<u64> {
        let removed = self.tokens.delete_for_user(user, token_type).await?;
        AccountMetrics::record_tokens_revoked(removed);
        Ok(removed)
    }

    pub async fn find_for_user(
        &self,
        user: ObjectId,
        token_type: Option<TokenType>,
    ) -> TokenResult<Vec<Token>> {
        self.tokens.find_by_user(user, token_type).await
    }

    /// Remove every expired token. Returns the count removed.
    #[instrument(skip(self))]
    pub async fn purge_expired(&self) -> TokenResult<u64> {
        let started = Instant::now();
        let purged = self.tokens.purge_expired(Utc::now()).await?;

        AccountMetrics::record_tokens_purged(purged, started.elapsed().as_secs_f64());
        if purged > 0 {
            tracing::info!(purged, "Expired tokens purged");
        }
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryTokenRepository, MockTokenRepository};
    use domain_users::{CreateUser, InMemoryUserRepository, User};

    async fn service_with_user() -> (
        TokenService<InMemoryTokenRepository, InMemoryUserRepository>,
        InMemoryTokenRepository,
        ObjectId,
    ) {
        let users = InMemoryUserRepository::new();
        let user = users
            .create(User::new(CreateUser {
                email: "ada@example.com".to_string(),
                name: "Ada".to_string(),
                roles: None,
            }))
            .await
            .unwrap();
        let tokens = InMemoryTokenRepository::new();
        (TokenService::new(tokens.clone(), users), tokens, user.id)
    }

    #[test]
    fn test_generate_token_value() {
        let a = generate_token_value();
        let b = generate_token_value();

        assert_eq!(a.len(), TOKEN_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_issue_and_verify() {
        let (service, _, user) = service_with_user().await;

        let issued = service
            .issue(user, TokenType::VerifyEmail, Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(issued.user, user);

        let verified = service
            .verify(&issued.token, TokenType::VerifyEmail)
            .await
            .unwrap();
        assert_eq!(verified, issued);

        assert!(matches!(
            service.verify(&issued.token, TokenType::Refresh).await,
            Err(TokenError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_issue_refuses_unknown_user() {
        let (service, tokens, _) = service_with_user().await;

        let result = service
            .issue(ObjectId::new(), TokenType::Refresh, Duration::hours(1))
            .await;

        assert!(matches!(result, Err(TokenError::UnknownUser(_))));
        assert!(tokens.is_empty().await);
    }

    #[tokio::test]
    async fn test_issue_rejects_non_positive_ttl() {
        let (service, _, user) = service_with_user().await;

        let result = service.issue(user, TokenType::Refresh, Duration::zero()).await;
        assert!(matches!(result, Err(TokenError::Validation(_))));
    }

    #[tokio::test]
    async fn test_verify_expired_deletes_token() {
        let (service, tokens, user) = service_with_user().await;
        let expired = Token::new(
            "stale",
            user,
            Utc::now() - Duration::seconds(1),
            TokenType::ResetPassword,
        )
        .unwrap();
        tokens.create(expired).await.unwrap();

        assert!(matches!(
            service.verify("stale", TokenType::ResetPassword).await,
            Err(TokenError::Expired)
        ));
        assert!(tokens.is_empty().await);
        assert!(matches!(
            service.verify("stale", TokenType::ResetPassword).await,
            Err(TokenError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_revoke_and_revoke_all() {
        let (service, _, user) = service_with_user().await;
        let first = service
            .issue(user, TokenType::Refresh, Duration::hours(1))
            .await
            .unwrap();
        service
            .issue(user, TokenType::Refresh, Duration::hours(1))
            .await
            .unwrap();
        service
            .issue(user, TokenType::VerifyEmail, Duration::hours(1))
            .await
            .unwrap();

        service.revoke(first.id).await.unwrap();
        assert!(matches!(
            service.revoke(first.id).await,
            Err(TokenError::NotFound)
        ));

        assert_eq!(
            service
                .revoke_all_for_user(user, Some(TokenType::Refresh))
                .await
                .unwrap(),
            1
        );
        let remaining = service.find_for_user(user, None).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].token_type, TokenType::VerifyEmail);
    }

    #[tokio::test]
    async fn test_purge_expired_delegates_current_time() {
        let mut tokens = MockTokenRepository::new();
        let before = Utc::now();
        tokens
            .expect_purge_expired()
            .withf(move |now| *now >= before)
            .times(1)
            .returning(|_| Ok(3));

        let service = TokenService::new(tokens, InMemoryUserRepository::new());
        assert_eq!(service.purge_expired().await.unwrap(), 3);
    }
}
