//! Background task that removes expired tokens on a fixed interval.
//!
//! Runs alongside the TTL index on `expires`, which MongoDB applies roughly once a minute.

use domain_tokens::{MongoTokenRepository, TokenRepository, TokenService};
use domain_users::{MongoUserRepository, UserRepository};
use mongodb::Database;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

pub type MongoTokenService = TokenService<MongoTokenRepository, MongoUserRepository>;

pub fn token_service(db: &Database) -> MongoTokenService {
    TokenService::new(MongoTokenRepository::new(db), MongoUserRepository::new(db))
}

/// Create the unique token index and the TTL index on `expires`
pub async fn init_indexes(db: &Database) -> eyre::Result<()> {
    MongoTokenRepository::new(db).create_indexes().await?;
    Ok(())
}

/// Spawn the sweeper. It runs once immediately, then every `interval`, until `shutdown`
/// fires or its sender is dropped.
pub fn spawn<T, U>(
    service: TokenService<T, U>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()>
where
    T: TokenRepository + 'static,
    U: UserRepository + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(?interval, "Token sweeper started");

        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                _ = ticker.tick() => {
                    if let Err(e) = service.purge_expired().await {
                        warn!(error = %e, "Token sweep failed");
                    }
                }
            }
        }

        info!("Token sweeper stopped");
    })
}
