//! Configuration validation
//!
//! Startup checks that depend on the deployment environment. Value-level
//! checks (secret lengths, URL scheme, positive limits) live in
//! `Config::validate`.

use anyhow::Result;
use venuehub_core::{Config, EncryptionService};

pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    let is_production = config.is_production();

    if is_production && config.cors_origins().iter().any(|origin| origin == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production - this is a security risk. \
            Please set specific allowed origins via CORS_ORIGINS environment variable."
        ));
    }

    if config.trusted_proxy_count() > 10 {
        tracing::warn!(
            trusted_proxy_count = config.trusted_proxy_count(),
            "TRUSTED_PROXY_COUNT is very high - ensure this matches your actual proxy setup"
        );
    }

    if config.db_max_connections() == 0 {
        return Err(anyhow::anyhow!("Database max connections cannot be 0"));
    }

    if config.db_timeout_seconds() == 0 {
        return Err(anyhow::anyhow!("Database timeout cannot be 0"));
    }

    if config.request_timeout_secs() == 0 {
        return Err(anyhow::anyhow!("Request timeout cannot be 0"));
    }

    // Fail at startup rather than on the first payment config write.
    EncryptionService::from_base64_key(config.encryption_key())
        .map_err(|e| anyhow::anyhow!("ENCRYPTION_KEY is invalid: {}", e))?;

    if is_production && config.csrf_secret() == config.jwt_secret() {
        tracing::warn!("CSRF_SECRET is not set - CSRF tokens are signed with the JWT secret");
    }

    tracing::info!("Configuration validation passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use venuehub_core::{BaseConfig, RateLimitSettings, VenueHubConfig};

    fn config(environment: &str, cors: &str) -> Config {
        Config::new(VenueHubConfig {
            base: BaseConfig {
                server_port: 3000,
                cors_origins: vec![cors.to_string()],
                db_max_connections: 5,
                db_timeout_seconds: 5,
                jwt_secret: "a".repeat(32),
                jwt_expiry_hours: 24,
                environment: environment.to_string(),
                log_format: "text".to_string(),
                request_timeout_secs: 30,
            },
            database_url: "postgres://localhost/venuehub".to_string(),
            encryption_key: "MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY=".to_string(),
            csrf_secret: "b".repeat(32),
            trusted_proxy_count: 1,
            rate_limits: RateLimitSettings::default(),
            notification_poll_interval_secs: 30,
        })
    }

    #[test]
    fn wildcard_cors_rejected_in_production() {
        assert!(validate_config(&config("production", "*")).is_err());
        assert!(validate_config(&config("production", "https://venuehub.app")).is_ok());
        assert!(validate_config(&config("development", "*")).is_ok());
    }

    #[test]
    fn bad_encryption_key_rejected() {
        let mut config = config("development", "*");
        config.0.encryption_key = "not-base64!".to_string();
        assert!(validate_config(&config).is_err());
    }
}
