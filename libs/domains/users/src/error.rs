use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use mongodb::bson::oid;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Invalid user id: {0}")]
    InvalidId(#[from] oid::Error),

    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

pub type UserResult<T> = Result<T, UserError>;

/// Convert UserError to AppError for standardized error responses
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => AppError::NotFound(format!("User {} not found", id)),
            UserError::InvalidId(e) => AppError::InvalidObjectId(e),
            UserError::DuplicateEmail(email) => {
                AppError::Conflict(format!("User with email '{}' already exists", email))
            }
            UserError::Validation(msg) => AppError::BadRequest(msg),
            UserError::Database(e) => AppError::Database(e),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (UserError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                UserError::InvalidId(ObjectId::parse_str("nope").unwrap_err()),
                StatusCode::BAD_REQUEST,
            ),
            (
                UserError::DuplicateEmail("a@b.io".into()),
                StatusCode::CONFLICT,
            ),
            (UserError::Validation("bad".into()), StatusCode::BAD_REQUEST),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
