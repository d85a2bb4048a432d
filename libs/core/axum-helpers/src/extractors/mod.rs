//! Custom extractors for Axum handlers.
//!
//! Both reject with [`AppError`](crate::errors::AppError) so failures render as the
//! standard error body.

pub mod pagination_query;
pub mod validated_json;

pub use pagination_query::PaginationQuery;
pub use validated_json::ValidatedJson;
