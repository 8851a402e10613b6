//! Application setup and initialization
//!
//! Everything main.rs needs before it can serve: configuration checks, the
//! database pool, application state and the router.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use venuehub_core::Config;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;
    tracing::info!("Configuration loaded and validated successfully");

    let pool = database::setup_database(&config).await?;
    build_app(&config, pool)
}

/// State and router over an existing pool with migrations applied.
pub fn build_app(config: &Config, pool: PgPool) -> Result<(Arc<AppState>, axum::Router)> {
    let state = services::initialize_services(config, pool)?;
    let router = routes::setup_routes(config, state.clone())?;
    Ok((state, router))
}
