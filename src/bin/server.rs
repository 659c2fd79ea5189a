//! Server entry point: loads settings from env, ensures the database and
//! schema exist, then mounts common, docs and resource routes.

use std::sync::Arc;

use axum::Router;
use backoffice_api::{
    common_routes, docs_routes, ensure_database_exists, ensure_schema, resource_routes, AppState,
    ResourceModel, ServerConfig, TokenVerifier,
};
use tokio::net::TcpListener;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

const BODY_LIMIT_BYTES: usize = 1024 * 1024;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("backoffice_api=info".parse()?),
        )
        .init();

    let config = ServerConfig::from_env()?;
    ensure_database_exists(&config.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    let model = ResourceModel::builtin();
    ensure_schema(&pool, &model).await?;

    let state = AppState {
        pool,
        model: Arc::new(model),
        verifier: TokenVerifier::from_secret(&config.jwt_secret),
    };

    let app = Router::new()
        .merge(common_routes(state.clone()))
        .merge(docs_routes())
        .merge(resource_routes(state))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
