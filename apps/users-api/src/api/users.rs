//! User routes backed by MongoDB

use axum::Router;
use axum_helpers::JwtAuth;
use domain_users::{MongoUserRepository, UserManager, handlers};
use mongodb::Database;

use crate::state::AppState;

/// Ensure the unique email index exists before serving
pub async fn init_indexes(db: &Database) -> eyre::Result<()> {
    MongoUserRepository::new(db).create_indexes().await?;
    Ok(())
}

pub fn router(state: &AppState) -> Router {
    let service = UserManager::new(MongoUserRepository::new(&state.db));
    handlers::router(service, JwtAuth::new(&state.config.jwt))
}
