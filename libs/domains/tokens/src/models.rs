use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::{Bson, Document, oid::ObjectId};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::error::{TokenError, TokenResult};

/// Fields every stored token document must carry
pub const REQUIRED_FIELDS: [&str; 4] = ["token", "user", "expires", "type"];

/// What a token may be used for
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TokenType {
    Refresh,
    ResetPassword,
    VerifyEmail,
}

/// Auth token record, stored in the `tokens` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Opaque credential value
    pub token: String,
    /// Owning user. Not a cascade: deleting the user leaves its tokens behind.
    pub user: ObjectId,
    /// The token is invalid at and after this instant
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub expires: DateTime<Utc>,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Token {
    /// Build a token from its four required fields.
    pub fn new(
        token: impl Into<String>,
        user: ObjectId,
        expires: DateTime<Utc>,
        token_type: TokenType,
    ) -> TokenResult<Self> {
        let now = Utc::now().trunc_subsecs(3);
        let token = Self {
            id: ObjectId::new(),
            token: token.into(),
            user,
            expires: expires.trunc_subsecs(3),
            token_type,
            created_at: now,
            updated_at: now,
        };
        token.validate()?;
        Ok(token)
    }

    pub fn validate(&self) -> TokenResult<()> {
        if self.token.trim().is_empty() {
            return Err(TokenError::Validation("token must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires
    }

    pub fn to_document(&self) -> TokenResult<Document> {
        bson::to_document(self).map_err(|e| TokenError::Validation(e.to_string()))
    }

    /// Decode a stored document, naming the first required field it lacks.
    pub fn from_document(doc: Document) -> TokenResult<Self> {
        if let Some(field) = REQUIRED_FIELDS
            .into_iter()
            .find(|field| matches!(doc.get(*field), None | Some(Bson::Null)))
        {
            return Err(TokenError::MissingField(field));
        }

        let token: Token =
            bson::from_document(doc).map_err(|e| TokenError::Validation(e.to_string()))?;
        token.validate()?;
        Ok(token)
    }
}

/// Loosely-typed token input; becomes a [`Token`] only through `TryFrom`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewToken {
    pub token: Option<String>,
    pub user: Option<ObjectId>,
    pub expires: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub token_type: Option<TokenType>,
}

impl TryFrom<NewToken> for Token {
    type Error = TokenError;

    fn try_from(input: NewToken) -> TokenResult<Self> {
        let token = input.token.ok_or(TokenError::MissingField("token"))?;
        let user = input.user.ok_or(TokenError::MissingField("user"))?;
        let expires = input.expires.ok_or(TokenError::MissingField("expires"))?;
        let token_type = input.token_type.ok_or(TokenError::MissingField("type"))?;

        Token::new(token, user, expires, token_type)
    }
}
