use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_users::UserError;
use mongodb::bson::oid;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token not found")]
    NotFound,

    #[error("Token has expired")]
    Expired,

    #[error("Token is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Invalid token: {0}")]
    Validation(String),

    #[error("Token value already exists")]
    Duplicate,

    #[error("Cannot issue a token for unknown user {0}")]
    UnknownUser(String),

    #[error("Invalid id: {0}")]
    InvalidId(#[from] oid::Error),

    #[error("User lookup failed: {0}")]
    User(#[from] UserError),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

pub type TokenResult<T> = Result<T, TokenError>;

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::NotFound => AppError::NotFound("Token not found".to_string()),
            TokenError::Expired => AppError::Unauthorized("Token has expired".to_string()),
            TokenError::MissingField(field) => {
                AppError::BadRequest(format!("Token is missing required field '{}'", field))
            }
            TokenError::Validation(msg) => AppError::BadRequest(msg),
            TokenError::Duplicate => AppError::Conflict("Token value already exists".to_string()),
            TokenError::UnknownUser(id) => {
                AppError::UnprocessableEntity(format!("User {} does not exist", id))
            }
            TokenError::InvalidId(e) => AppError::InvalidObjectId(e),
            TokenError::User(e) => e.into(),
            TokenError::Database(e) => AppError::Database(e),
        }
    }
}

impl IntoResponse for TokenError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
