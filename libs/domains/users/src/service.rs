//! User service - business logic layer

use async_trait::async_trait;
use axum_helpers::{Page, PageOptions};
use mongodb::bson::oid::ObjectId;
use observability::OperationTimer;
use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{
    CreateUser, SORTABLE_FIELDS, UpdateUser, User, UserFilter, UserResponse, normalize_email,
};
use crate::repository::UserRepository;

/// Operations behind the user HTTP surface.
///
/// Ids arrive as the raw path segment; implementations parse them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    async fn create(&self, input: CreateUser) -> UserResult<UserResponse>;

    async fn update_by_id(&self, id: String, input: UpdateUser) -> UserResult<UserResponse>;

    async fn find_paginated(
        &self,
        filter: UserFilter,
        options: PageOptions,
    ) -> UserResult<Page<UserResponse>>;

    async fn find_by_id(&self, id: String) -> UserResult<UserResponse>;

    /// Delete a user and return the removed record
    async fn delete_by_id(&self, id: String) -> UserResult<UserResponse>;
}

/// Repository-backed [`UserService`]
pub struct UserManager<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> Clone for UserManager<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: UserRepository> UserManager<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    fn parse_id(id: &str) -> UserResult<ObjectId> {
        Ok(ObjectId::parse_str(id.trim())?)
    }

    fn validate_options(options: &PageOptions) -> UserResult<()> {
        options.validate().map_err(UserError::Validation)?;

        match options.sort_spec() {
            Some((field, _)) if !SORTABLE_FIELDS.contains(&field) => {
                Err(UserError::Validation(format!(
                    "cannot sort by '{}', expected one of: {}",
                    field,
                    SORTABLE_FIELDS.join(", ")
                )))
            }
            _ => Ok(()),
        }
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    async fn create_user(&self, input: CreateUser) -> UserResult<UserResponse> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        if self.repository.email_exists(&input.email).await? {
            return Err(UserError::DuplicateEmail(normalize_email(&input.email)));
        }

        let created = self.repository.create(User::new(input)).await?;
        Ok(created.into())
    }

    #[instrument(skip(self, input))]
    async fn update_user(&self, id: String, input: UpdateUser) -> UserResult<UserResponse> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;
        if input.is_empty() {
            return Err(UserError::Validation(
                "update must set at least one field".to_string(),
            ));
        }

        let oid = Self::parse_id(&id)?;
        let mut user = self
            .repository
            .get_by_id(oid)
            .await?
            .ok_or(UserError::NotFound(id))?;

        if let Some(ref new_email) = input.email {
            let new_email = normalize_email(new_email);
            if new_email != user.email && self.repository.email_exists(&new_email).await? {
                return Err(UserError::DuplicateEmail(new_email));
            }
        }

        user.apply_update(input);

        let updated = self.repository.update(user).await?;
        Ok(updated.into())
    }

    #[instrument(skip(self))]
    async fn list_users(
        &self,
        filter: UserFilter,
        options: PageOptions,
    ) -> UserResult<Page<UserResponse>> {
        Self::validate_options(&options)?;

        let total = self.repository.count(filter.clone()).await?;
        let users = self.repository.list(filter, options.clone()).await?;

        Ok(Page::new(users, total, &options).map(UserResponse::from))
    }

    #[instrument(skip(self))]
    async fn get_user(&self, id: String) -> UserResult<UserResponse> {
        let oid = Self::parse_id(&id)?;
        self.repository
            .get_by_id(oid)
            .await?
            .map(UserResponse::from)
            .ok_or(UserError::NotFound(id))
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: String) -> UserResult<UserResponse> {
        let oid = Self::parse_id(&id)?;
        self.repository
            .delete(oid)
            .await?
            .map(UserResponse::from)
            .ok_or(UserError::NotFound(id))
    }
}

#[async_trait]
impl<R: UserRepository> UserService for UserManager<R> {
    async fn create(&self, input: CreateUser) -> UserResult<UserResponse> {
        OperationTimer::start("create").finish(self.create_user(input).await)
    }

    async fn update_by_id(&self, id: String, input: UpdateUser) -> UserResult<UserResponse> {
        OperationTimer::start("update").finish(self.update_user(id, input).await)
    }

    async fn find_paginated(
        &self,
        filter: UserFilter,
        options: PageOptions,
    ) -> UserResult<Page<UserResponse>> {
        OperationTimer::start("list").finish(self.list_users(filter, options).await)
    }

    async fn find_by_id(&self, id: String) -> UserResult<UserResponse> {
        OperationTimer::start("get").finish(self.get_user(id).await)
    }

    async fn delete_by_id(&self, id: String) -> UserResult<UserResponse> {
        OperationTimer::start("delete").finish(self.delete_user(id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::repository::{InMemoryUserRepository, MockUserRepository};
    use mockall::predicate::eq;

    fn create_input(email: &str) -> CreateUser {
        CreateUser {
            email: email.to_string(),
            name: "Ada".to_string(),
            roles: None,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_roles_and_lowercases_email() {
        let service = UserManager::new(InMemoryUserRepository::new());

        let created = service.create(create_input("Ada@Example.com")).await.unwrap();

        assert_eq!(created.email, "ada@example.com");
        assert_eq!(created.roles, vec![Role::User]);
        assert!(created.is_active);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email_before_insert() {
        let mut repo = MockUserRepository::new();
        repo.expect_email_exists()
            .with(eq("ada@example.com"))
            .times(1)
            .returning(|_| Ok(true));
        repo.expect_create().never();

        let service = UserManager::new(repo);
        let result = service.create(create_input("ada@example.com")).await;

        assert!(matches!(result, Err(UserError::DuplicateEmail(e)) if e == "ada@example.com"));
    }

    #[tokio::test]
    async fn test_malformed_id_is_invalid_id() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id().never();
        repo.expect_delete().never();

        let service = UserManager::new(repo);

        assert!(matches!(
            service.find_by_id("not-an-id".into()).await,
            Err(UserError::InvalidId(_))
        ));
        assert!(matches!(
            service.delete_by_id("123".into()).await,
            Err(UserError::InvalidId(_))
        ));
    }

    #[tokio::test]
    async fn test_find_and_delete_missing_is_not_found() {
        let service = UserManager::new(InMemoryUserRepository::new());
        let id = ObjectId::new().to_hex();

        assert!(matches!(
            service.find_by_id(id.clone()).await,
            Err(UserError::NotFound(missing)) if missing == id
        ));
        assert!(matches!(
            service.delete_by_id(id).await,
            Err(UserError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_returns_removed_record() {
        let service = UserManager::new(InMemoryUserRepository::new());
        let created = service.create(create_input("ada@example.com")).await.unwrap();

        let deleted = service.delete_by_id(created.id.clone()).await.unwrap();
        assert_eq!(deleted, created);
        assert!(service.find_by_id(created.id).await.is_err());
    }

    #[tokio::test]
    async fn test_update_changes_fields_and_checks_email() {
        let service = UserManager::new(InMemoryUserRepository::new());
        let ada = service.create(create_input("ada@example.com")).await.unwrap();
        service.create(create_input("grace@example.com")).await.unwrap();

        let updated = service
            .update_by_id(
                ada.id.clone(),
                UpdateUser {
                    name: Some("Countess".into()),
                    roles: Some(vec![]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Countess");
        assert_eq!(updated.roles, vec![Role::User]);

        // same email in a different case is not a change
        let unchanged = service
            .update_by_id(
                ada.id.clone(),
                UpdateUser {
                    email: Some("ADA@example.com".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(unchanged.is_ok());

        let taken = service
            .update_by_id(
                ada.id,
                UpdateUser {
                    email: Some("grace@example.com".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(taken, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let id = ObjectId::new();
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id()
            .with(eq(id))
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_update().never();

        let service = UserManager::new(repo);
        let result = service
            .update_by_id(
                id.to_hex(),
                UpdateUser {
                    name: Some("Ghost".into()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(UserError::NotFound(missing)) if missing == id.to_hex()));
    }

    #[tokio::test]
    async fn test_update_rejects_empty_and_blank_input() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id().never();
        repo.expect_update().never();
        let service = UserManager::new(repo);
        let id = ObjectId::new().to_hex();

        let empty = service.update_by_id(id.clone(), UpdateUser::default()).await;
        assert!(matches!(empty, Err(UserError::Validation(msg)) if msg.contains("at least one")));

        let blank = service
            .update_by_id(
                id,
                UpdateUser {
                    name: Some("   ".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(blank, Err(UserError::Validation(_))));
    }

    #[tokio::test]
    async fn test_find_paginated_builds_page() {
        let service = UserManager::new(InMemoryUserRepository::new());
        for i in 0..5 {
            service
                .create(create_input(&format!("user{i}@example.com")))
                .await
                .unwrap();
        }

        let page = service
            .find_paginated(
                UserFilter::default(),
                PageOptions::new(2, 2).with_sort("email"),
            )
            .await
            .unwrap();

        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 2);
        let emails: Vec<_> = page.items.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, ["user2@example.com", "user3@example.com"]);
    }

    #[tokio::test]
    async fn test_find_paginated_rejects_unknown_sort_field() {
        let mut repo = MockUserRepository::new();
        repo.expect_count().never();
        repo.expect_list().never();

        let service = UserManager::new(repo);
        let result = service
            .find_paginated(
                UserFilter::default(),
                PageOptions::default().with_sort("-password"),
            )
            .await;

        assert!(matches!(result, Err(UserError::Validation(msg)) if msg.contains("password")));
    }

    #[tokio::test]
    async fn test_find_paginated_rejects_oversized_limit() {
        let service = UserManager::new(InMemoryUserRepository::new());
        let result = service
            .find_paginated(UserFilter::default(), PageOptions::new(1, 101))
            .await;

        assert!(matches!(result, Err(UserError::Validation(_))));
    }
}
