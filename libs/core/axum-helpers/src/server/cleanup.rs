//! Connection cleanup run during graceful shutdown.

use tracing::info;

/// Shut down a MongoDB client.
///
/// Waits for in-use sessions and cursors to be returned, then closes pooled connections.
/// Every clone of the client stops working afterwards.
pub async fn close_mongodb(client: mongodb::Client, name: &str) {
    info!("Closing MongoDB client '{}'", name);
    client.shutdown().await;
    info!("MongoDB client '{}' closed", name);
}
