//! MongoDB implementation of TokenRepository

use async_trait::async_trait;
use axum_helpers::is_duplicate_key;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{self, Document, doc, oid::ObjectId},
    options::IndexOptions,
};
use std::time::Duration;
use tracing::instrument;

use crate::error::{TokenError, TokenResult};
use crate::models::{Token, TokenType};
use crate::repository::TokenRepository;

pub const COLLECTION: &str = "tokens";

/// MongoDB implementation of the TokenRepository
///
/// Reads go through raw documents and [`Token::from_document`], so a stored record missing a
/// required field surfaces as [`TokenError::MissingField`].
#[derive(Clone)]
pub struct MongoTokenRepository {
    collection: Collection<Token>,
    documents: Collection<Document>,
}

impl MongoTokenRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, COLLECTION)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<Token>(collection_name);
        let documents = collection.clone_with_type::<Document>();
        Self {
            collection,
            documents,
        }
    }

    /// Create the token indexes.
    ///
    /// The TTL index lets MongoDB drop tokens once `expires` has passed. Its monitor runs about
    /// once a minute, so reads still check expiry themselves.
    pub async fn create_indexes(&self) -> TokenResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "token": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_token_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "user": 1, "type": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_user_type".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "expires": 1 })
                .options(
                    IndexOptions::builder()
                        .expire_after(Duration::ZERO)
                        .name("idx_expires_ttl".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Token indexes created successfully");
        Ok(())
    }

    fn user_filter(user: ObjectId, token_type: Option<TokenType>) -> Document {
        let mut filter = doc! { "user": user };
        if let Some(token_type) = token_type {
            filter.insert("type", token_type.as_ref());
        }
        filter
    }
}

#[async_trait]
impl TokenRepository for MongoTokenRepository {
    #[instrument(skip(self, token), fields(user = %token.user, token_type = %token.token_type))]
    async fn create(&self, token: Token) -> TokenResult<Token> {
        token.validate()?;

        self.collection.insert_one(&token).await.map_err(|e| {
            if is_duplicate_key(&e) {
                TokenError::Duplicate
            } else {
                TokenError::Database(e)
            }
        })?;

        tracing::debug!(token_id = %token.id, "Token stored");
        Ok(token)
    }

    #[instrument(skip(self, token))]
    async fn find_by_token(
        &self,
        token: &str,
        token_type: TokenType,
    ) -> TokenResult<Option<Token>> {
        self.documents
            .find_one(doc! { "token": token, "type": token_type.as_ref() })
            .await?
            .map(Token::from_document)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_user(
        &self,
        user: ObjectId,
        token_type: Option<TokenType>,
    ) -> TokenResult<Vec<Token>> {
        let cursor = self
            .documents
            .find(Self::user_filter(user, token_type))
            .sort(doc! { "_id": 1 })
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        documents.into_iter().map(Token::from_document).collect()
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> TokenResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn delete_for_user(
        &self,
        user: ObjectId,
        token_type: Option<TokenType>,
    ) -> TokenResult<u64> {
        let result = self
            .collection
            .delete_many(Self::user_filter(user, token_type))
            .await?;
        Ok(result.deleted_count)
    }

    #[instrument(skip(self))]
    async fn purge_expired(&self, now: DateTime<Utc>) -> TokenResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "expires": { "$lte": bson::DateTime::from_chrono(now) } })
            .await?;
        Ok(result.deleted_count)
    }
}
