use mongodb::Database;
use std::time::Instant;

use super::connector::ping;
use crate::common::{DatabaseError, DatabaseResult};

/// Detailed health status for MongoDB
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub healthy: bool,
    /// Error details when unhealthy
    pub message: Option<String>,
    /// Round-trip time of the ping in milliseconds
    pub response_time_ms: u64,
}

/// Ping the database, mapping failures to [`DatabaseError::HealthCheckFailed`].
///
/// ```ignore
/// use database::mongodb::check_health;
///
/// check_health(&client.database("accounts")).await?;
/// ```
pub async fn check_health(database: &Database) -> DatabaseResult<()> {
    ping(database)
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(e.to_string()))
}

/// Ping the database and report latency alongside the outcome.
pub async fn check_health_detailed(database: &Database) -> HealthStatus {
    let start = Instant::now();
    let result = ping(database).await;
    let response_time_ms = start.elapsed().as_millis() as u64;

    HealthStatus {
        healthy: result.is_ok(),
        message: result.err().map(|e| e.to_string()),
        response_time_ms,
    }
}
