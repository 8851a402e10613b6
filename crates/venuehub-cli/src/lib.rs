//! Shared plumbing for the seed binaries.
//!
//! Each binary loads the API configuration, connects with migrations
//! applied and writes through the same repositories the API uses. Rows with
//! a natural key (email, slug, code, name) are skipped when they already
//! exist, so re-running a seed is harmless.

use anyhow::Context;
use sqlx::PgPool;
use venuehub_core::{AppError, Config};

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,sqlx=warn")),
        )
        .init();
}

/// Load configuration and open a migrated pool.
pub async fn connect() -> anyhow::Result<PgPool> {
    let config = Config::from_env().context("Failed to load configuration")?;
    venuehub_api::setup::database::setup_database(&config).await
}

/// Tally of what a seed run did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub skipped: usize,
}

impl SeedReport {
    /// Count one insert. A unique-key conflict means the row is already
    /// seeded; any other error aborts the run.
    pub fn record<T>(&mut self, result: Result<T, AppError>) -> anyhow::Result<Option<T>> {
        match result {
            Ok(value) => {
                self.created += 1;
                Ok(Some(value))
            }
            Err(AppError::Conflict(reason)) => {
                tracing::debug!(reason = %reason, "Already seeded");
                self.skipped += 1;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    pub fn log(&self, what: &str) {
        tracing::info!(
            created = self.created,
            skipped = self.skipped,
            "Seeded {}",
            what
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_counts_as_skip() {
        let mut report = SeedReport::default();
        let first = report.record::<u8>(Ok(1)).unwrap();
        let second = report
            .record::<u8>(Err(AppError::Conflict("amenities name".to_string())))
            .unwrap();
        assert_eq!(first, Some(1));
        assert_eq!(second, None);
        assert_eq!(report, SeedReport { created: 1, skipped: 1 });
    }

    #[test]
    fn other_errors_abort() {
        let mut report = SeedReport::default();
        let result = report.record::<u8>(Err(AppError::Internal("boom".to_string())));
        assert!(result.is_err());
        assert_eq!(report, SeedReport::default());
    }
}
