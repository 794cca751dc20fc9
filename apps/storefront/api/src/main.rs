use axum::Router;
use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use eyre::WrapErr;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env().wrap_err("Invalid storefront configuration")?;
    init_tracing(&config.environment);

    let state = connect(config).await?;
    let app = build_app(&state).await?;
    serve(app, state).await?;

    info!("Storefront API shutdown complete");
    Ok(())
}

/// Open the MongoDB pool, retrying while the deployment comes up.
async fn connect(config: Config) -> eyre::Result<AppState> {
    info!(
        database = config.mongodb.database(),
        page_size = config.products.page_size.get(),
        search_field = %config.products.search_field,
        "Connecting to MongoDB"
    );

    let mongo_client = database::mongodb::connect_from_config_with_retry(&config.mongodb, None)
        .await
        .wrap_err("MongoDB is unreachable")?;
    let db = mongo_client.database(config.mongodb.database());

    Ok(AppState {
        config,
        mongo_client,
        db,
    })
}

/// Catalogue routes under `/api/v1/products`, docs UIs, `/health` and `/api/ready`.
async fn build_app(state: &AppState) -> eyre::Result<Router> {
    let products = api::products::service(state);
    products
        .init_indexes()
        .await
        .wrap_err("Failed to create product indexes")?;

    let router = axum_helpers::create_router::<openapi::ApiDoc>(api::routes(state, products)).await?;
    Ok(router.merge(health_router(state.config.app)))
}

async fn serve(app: Router, state: AppState) -> eyre::Result<()> {
    let server = &state.config.server;
    info!(address = %server.address(), shutdown_timeout = ?server.shutdown_timeout, "Starting storefront API");

    let client = state.mongo_client.clone();
    create_production_app(app, server, server.shutdown_timeout, async move {
        info!("Closing MongoDB connections");
        client.shutdown().await;
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {e}"))
}
