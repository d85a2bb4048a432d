//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use axum_helpers::{PageOptions, is_duplicate_key};
use futures::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc, oid::ObjectId},
    options::{FindOptions, IndexOptions},
};
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserFilter, normalize_email};
use crate::repository::UserRepository;

pub const COLLECTION: &str = "users";

/// MongoDB implementation of the UserRepository
#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, COLLECTION)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<User>(collection_name);
        Self { collection }
    }

    /// Create the unique email index and the listing index
    pub async fn create_indexes(&self) -> UserResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_email_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_created_at".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("User indexes created successfully");
        Ok(())
    }

    pub fn collection(&self) -> &Collection<User> {
        &self.collection
    }

    /// Build a MongoDB filter document from UserFilter
    fn build_filter(filter: &UserFilter) -> Document {
        let mut doc = doc! {};

        if let Some(ref email) = filter.email {
            doc.insert("email", doc! { "$regex": regex::escape(email), "$options": "i" });
        }

        if let Some(ref name) = filter.name {
            doc.insert("name", doc! { "$regex": regex::escape(name), "$options": "i" });
        }

        if let Some(role) = filter.role {
            doc.insert("roles", role.to_string());
        }

        if let Some(is_active) = filter.is_active {
            doc.insert("is_active", is_active);
        }

        doc
    }

    fn build_sort(options: &PageOptions) -> Document {
        let Some((field, direction)) = options.sort_spec() else {
            return doc! { "created_at": -1, "_id": -1 };
        };

        let mut sort = Document::new();
        sort.insert(field, direction.as_i32());
        if field != "_id" {
            sort.insert("_id", direction.as_i32());
        }
        sort
    }

    fn map_write_error(err: mongodb::error::Error, email: &str) -> UserError {
        if is_duplicate_key(&err) {
            UserError::DuplicateEmail(email.to_string())
        } else {
            UserError::Database(err)
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: User) -> UserResult<User> {
        self.collection
            .insert_one(&user)
            .await
            .map_err(|e| Self::map_write_error(e, &user.email))?;

        tracing::info!("User created successfully");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: ObjectId) -> UserResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: UserFilter, options: PageOptions) -> UserResult<Vec<User>> {
        let find_options = FindOptions::builder()
            .skip(options.skip())
            .limit(options.limit as i64)
            .sort(Self::build_sort(&options))
            .build();

        let cursor = self
            .collection
            .find(Self::build_filter(&filter))
            .with_options(find_options)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn count(&self, filter: UserFilter) -> UserResult<u64> {
        Ok(self
            .collection
            .count_documents(Self::build_filter(&filter))
            .await?)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update(&self, user: User) -> UserResult<User> {
        let result = self
            .collection
            .replace_one(doc! { "_id": user.id }, &user)
            .await
            .map_err(|e| Self::map_write_error(e, &user.email))?;

        if result.matched_count == 0 {
            return Err(UserError::NotFound(user.id.to_hex()));
        }

        tracing::info!("User updated successfully");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> UserResult<Option<User>> {
        let removed = self
            .collection
            .find_one_and_delete(doc! { "_id": id })
            .await?;

        if removed.is_some() {
            tracing::info!("User deleted successfully");
        }
        Ok(removed)
    }

    #[instrument(skip(self))]
    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let found = self
            .collection
            .find_one(doc! { "email": normalize_email(email) })
            .await?;
        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_build_filter_empty() {
        let doc = MongoUserRepository::build_filter(&UserFilter::default());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_build_filter_all_fields() {
        let filter = UserFilter {
            email: Some("a.b".to_string()),
            name: Some("Ada".to_string()),
            role: Some(Role::SuperAdmin),
            is_active: Some(true),
        };
        let doc = MongoUserRepository::build_filter(&filter);

        let email = doc.get_document("email").unwrap();
        assert_eq!(email.get_str("$regex").unwrap(), "a\\.b");
        assert_eq!(email.get_str("$options").unwrap(), "i");
        assert_eq!(doc.get_str("roles").unwrap(), "super_admin");
        assert!(doc.get_bool("is_active").unwrap());
    }

    #[test]
    fn test_build_sort() {
        let default = MongoUserRepository::build_sort(&PageOptions::default());
        assert_eq!(default, doc! { "created_at": -1, "_id": -1 });

        let by_name = MongoUserRepository::build_sort(&PageOptions::default().with_sort("name"));
        assert_eq!(by_name, doc! { "name": 1, "_id": 1 });
    }

    #[test]
    fn test_build_filter_matches_input_literally() {
        let filter = UserFilter {
            name: Some("a+b (#1)".to_string()),
            ..Default::default()
        };
        let doc = MongoUserRepository::build_filter(&filter);

        let name = doc.get_document("name").unwrap();
        assert_eq!(name.get_str("$regex").unwrap(), "a\\+b \\(\\#1\\)");
    }
}
