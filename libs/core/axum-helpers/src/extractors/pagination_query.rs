//! Query extractor that yields a domain filter together with [`PageOptions`].

use crate::errors::AppError;
use crate::pagination::PageOptions;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

/// Extracts a filter `F` and [`PageOptions`] from the same query string.
///
/// Out-of-range options (`page=0`, `limit=0`, `limit>100`) are rejected with 400.
///
/// ```ignore
/// async fn list(PaginationQuery(filter, options): PaginationQuery<UserFilter>) { .. }
/// ```
#[derive(Debug, Clone)]
pub struct PaginationQuery<F>(pub F, pub PageOptions);

impl<F, S> FromRequestParts<S> for PaginationQuery<F>
where
    F: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(filter) = Query::<F>::from_request_parts(parts, state).await?;
        let Query(options) = Query::<PageOptions>::from_request_parts(parts, state).await?;
        options.validate().map_err(AppError::BadRequest)?;

        Ok(PaginationQuery(filter, options))
    }
}
