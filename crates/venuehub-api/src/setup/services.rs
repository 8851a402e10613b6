//! Service initialization and application state setup

use crate::auth::JwtService;
use crate::constants::RATE_LIMIT_PURGE_INTERVAL_SECS;
use crate::middleware::AuditLogger;
use crate::services::Notifier;
use crate::state::{AppState, DbState, SecurityState};
use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use venuehub_core::{Config, EncryptionService};
use venuehub_infra::{CsrfConfig, RateLimiter};

/// Initialize repositories and services, returning the application state.
///
/// Must run inside a Tokio runtime: the rate limiter's purge task is spawned here.
pub fn initialize_services(config: &Config, pool: PgPool) -> Result<Arc<AppState>> {
    let db = DbState::new(pool);

    let encryption = EncryptionService::from_base64_key(config.encryption_key())
        .context("Failed to initialize encryption service")?;
    let security = SecurityState {
        jwt: JwtService::new(config.jwt_secret(), config.jwt_expiry_hours()),
        csrf: CsrfConfig::new(config.csrf_secret(), config.is_production()),
        encryption: Arc::new(encryption),
    };

    let audit = AuditLogger::new(db.audit_logs.clone());
    let notifier = Notifier::new(db.notifications.clone());

    let rate_limiter = RateLimiter::new(config.rate_limits().clone());
    rate_limiter.spawn_purge_task(Duration::from_secs(RATE_LIMIT_PURGE_INTERVAL_SECS));
    tracing::info!(
        purge_interval_secs = RATE_LIMIT_PURGE_INTERVAL_SECS,
        "Rate limiter initialized"
    );

    Ok(Arc::new(AppState {
        db,
        security,
        audit,
        notifier,
        rate_limiter,
        is_production: config.is_production(),
        config: config.clone(),
    }))
}
