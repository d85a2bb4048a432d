use async_trait::async_trait;
use axum_helpers::{PageOptions, SortDirection};
use mongodb::bson::oid::ObjectId;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserFilter, normalize_email};

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. A taken email is `DuplicateEmail`.
    async fn create(&self, user: User) -> UserResult<User>;

    async fn get_by_id(&self, id: ObjectId) -> UserResult<Option<User>>;

    /// One page of users matching `filter`, ordered by `options.sort` (newest first by default)
    async fn list(&self, filter: UserFilter, options: PageOptions) -> UserResult<Vec<User>>;

    /// Count users matching `filter` (for pagination)
    async fn count(&self, filter: UserFilter) -> UserResult<u64>;

    /// Replace a stored user. A missing id is `NotFound`.
    async fn update(&self, user: User) -> UserResult<User>;

    /// Remove a user, returning the removed record
    async fn delete(&self, id: ObjectId) -> UserResult<Option<User>>;

    async fn email_exists(&self, email: &str) -> UserResult<bool>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<ObjectId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn compare_by(field: &str, a: &User, b: &User) -> Ordering {
    match field {
        "email" => a.email.cmp(&b.email),
        "name" => a.name.cmp(&b.name),
        "updated_at" => a.updated_at.cmp(&b.updated_at),
        _ => a.created_at.cmp(&b.created_at),
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: ObjectId) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn list(&self, filter: UserFilter, options: PageOptions) -> UserResult<Vec<User>> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users
            .values()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect();

        let (field, direction) = options
            .sort_spec()
            .unwrap_or(("created_at", SortDirection::Descending));

        // ObjectIds grow monotonically, so they break ties the same way MongoDB's _id would
        result.sort_by(|a, b| {
            let ordering = compare_by(field, a, b).then_with(|| a.id.cmp(&b.id));
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });

        Ok(result
            .into_iter()
            .skip(options.skip() as usize)
            .take(options.limit as usize)
            .collect())
    }

    async fn count(&self, filter: UserFilter) -> UserResult<u64> {
        let users = self.users.read().await;
        Ok(users.values().filter(|u| filter.matches(u)).count() as u64)
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id.to_hex()));
        }

        if users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, "Updated user");
        Ok(user)
    }

    async fn delete(&self, id: ObjectId) -> UserResult<Option<User>> {
        let mut users = self.users.write().await;
        let removed = users.remove(&id);

        if removed.is_some() {
            tracing::info!(user_id = %id, "Deleted user");
        }
        Ok(removed)
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let email = normalize_email(email);
        let users = self.users.read().await;
        Ok(users.values().any(|u| u.email == email))
    }
}
