use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// Fields `PageOptions::sort` may name for user listings.
pub const SORTABLE_FIELDS: &[&str] = &["created_at", "updated_at", "email", "name"];

/// Names are stored trimmed, so whitespace alone is not a name
fn validate_user_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("blank_name").with_message("name must not be blank".into()));
    }
    Ok(())
}

/// User roles
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    /// May create, update and delete users
    SuperAdmin,
    Admin,
    #[default]
    User,
}

/// Deduplicate roles, keeping first-seen order. An empty list becomes `[user]`.
pub fn normalize_roles(roles: Vec<Role>) -> Vec<Role> {
    let mut normalized = Vec::with_capacity(roles.len());
    for role in roles {
        if !normalized.contains(&role) {
            normalized.push(role);
        }
    }
    if normalized.is_empty() {
        normalized.push(Role::User);
    }
    normalized
}

/// Emails are stored trimmed and lowercased so the unique index is case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// BSON dates carry millisecond precision
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

fn default_roles() -> Vec<Role> {
    vec![Role::User]
}

fn default_true() -> bool {
    true
}

/// User entity - the document stored in the `users` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub email: String,
    pub name: String,
    #[serde(default = "default_roles")]
    pub roles: Vec<Role>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(input: CreateUser) -> Self {
        let now = now();
        Self {
            id: ObjectId::new(),
            email: normalize_email(&input.email),
            name: input.name.trim().to_string(),
            roles: normalize_roles(input.roles.unwrap_or_default()),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update and bump `updated_at`
    pub fn apply_update(&mut self, update: UpdateUser) {
        if let Some(email) = update.email {
            self.email = normalize_email(&email);
        }
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(roles) = update.roles {
            self.roles = normalize_roles(roles);
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now();
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// User as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// Hex ObjectId
    #[schema(example = "65f1c0ffee0ddba11ad0c0de")]
    pub id: String,
    pub email: String,
    pub name: String,
    pub roles: Vec<Role>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_hex(),
            email: user.email,
            name: user.name,
            roles: user.roles,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// DTO for creating a new user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(email, length(max = 255))]
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[validate(length(min = 1, max = 100), custom(function = "validate_user_name"))]
    pub name: String,
    /// Defaults to `[user]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Role>>,
}

/// DTO for a partial update of an existing user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(email, length(max = 255))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100), custom(function = "validate_user_name"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Role>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.name.is_none() && self.roles.is_none() && self.is_active.is_none()
    }
}

/// Query filters for listing users
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserFilter {
    /// Case-insensitive substring of the email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Case-insensitive substring of the name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Users holding this role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UserFilter {
    /// In-process equivalent of the MongoDB filter
    pub fn matches(&self, user: &User) -> bool {
        let contains = |haystack: &str, needle: &Option<String>| match needle {
            Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        };

        contains(&user.email, &self.email)
            && contains(&user.name, &self.name)
            && self.role.is_none_or(|role| user.has_role(role))
            && self.is_active.is_none_or(|active| user.is_active == active)
    }
}
