use axum::{middleware, routing::get};
use axum_helpers::server::{ShutdownCoordinator, close_mongodb, create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use observability::{metrics_handler, metrics_middleware};
use tracing::{info, warn};

mod api;
mod config;
mod openapi;
mod state;
mod token_sweeper;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);
    observability::init_metrics()?;

    info!("Connecting to MongoDB at {}", config.mongodb.redacted_url());
    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;
    let db = mongo_client.database(&config.mongodb.database);
    info!("Connected to MongoDB database: {}", config.mongodb.database);

    api::users::init_indexes(&db).await?;
    token_sweeper::init_indexes(&db).await?;

    let state = AppState {
        config,
        mongo_client,
        db,
    };

    let (coordinator, _rx) = ShutdownCoordinator::new();
    let sweeper = token_sweeper::spawn(
        token_sweeper::token_service(&state.db),
        state.config.token_sweep_interval,
        coordinator.subscribe(),
    );

    let router = axum_helpers::create_router::<openapi::ApiDoc>(api::routes(&state)).await?;
    let app = router
        .merge(health_router(state.config.app))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(metrics_middleware));

    info!(
        "Starting {} v{} (shutdown timeout {:?})",
        state.config.app.name, state.config.app.version, state.config.server.shutdown_timeout
    );

    let mongo_client = state.mongo_client.clone();
    create_production_app(app, &state.config.server, coordinator, async move {
        if let Err(e) = sweeper.await {
            warn!("Token sweeper ended abnormally: {}", e);
        }
        close_mongodb(mongo_client, "main").await;
    })
    .await?;

    info!("Users API shutdown complete");
    Ok(())
}
