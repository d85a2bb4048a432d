use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{TokenError, TokenResult};
use crate::models::{Token, TokenType};

/// Repository trait for Token persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Insert a token. A token value that already exists is `Duplicate`.
    async fn create(&self, token: Token) -> TokenResult<Token>;

    async fn find_by_token(&self, token: &str, token_type: TokenType)
    -> TokenResult<Option<Token>>;

    /// All tokens of `user`, optionally narrowed to one type
    async fn find_by_user(
        &self,
        user: ObjectId,
        token_type: Option<TokenType>,
    ) -> TokenResult<Vec<Token>>;

    /// Returns whether a token was removed
    async fn delete(&self, id: ObjectId) -> TokenResult<bool>;

    /// Returns the number of tokens removed
    async fn delete_for_user(&self, user: ObjectId, token_type: Option<TokenType>)
    -> TokenResult<u64>;

    /// Remove every token with `expires <= now`
    async fn purge_expired(&self, now: DateTime<Utc>) -> TokenResult<u64>;
}

/// In-memory implementation of TokenRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryTokenRepository {
    tokens: Arc<RwLock<HashMap<ObjectId, Token>>>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

fn owned_by(token: &Token, user: ObjectId, token_type: Option<TokenType>) -> bool {
    token.user == user && token_type.is_none_or(|t| token.token_type == t)
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn create(&self, token: Token) -> TokenResult<Token> {
        token.validate()?;
        let mut tokens = self.tokens.write().await;

        if tokens.values().any(|t| t.token == token.token) {
            return Err(TokenError::Duplicate);
        }

        tokens.insert(token.id, token.clone());
        Ok(token)
    }

    async fn find_by_token(
        &self,
        token: &str,
        token_type: TokenType,
    ) -> TokenResult<Option<Token>> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .values()
            .find(|t| t.token == token && t.token_type == token_type)
            .cloned())
    }

    async fn find_by_user(
        &self,
        user: ObjectId,
        token_type: Option<TokenType>,
    ) -> TokenResult<Vec<Token>> {
        let tokens = self.tokens.read().await;
        let mut found: Vec<Token> = tokens
            .values()
            .filter(|t| owned_by(t, user, token_type))
            .cloned()
            .collect();
        found.sort_by_key(|t| t.id);
        Ok(found)
    }

    async fn delete(&self, id: ObjectId) -> TokenResult<bool> {
        Ok(self.tokens.write().await.remove(&id).is_some())
    }

    async fn delete_for_user(
        &self,
        user: ObjectId,
        token_type: Option<TokenType>,
    ) -> TokenResult<u64> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| !owned_by(t, user, token_type));
        Ok((before - tokens.len()) as u64)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> TokenResult<u64> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| !t.is_expired(now));
        Ok((before - tokens.len()) as u64)
    }
}
