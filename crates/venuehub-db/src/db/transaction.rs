//! Database transaction utilities
//!
//! Multi-step writes (booking creation, review creation, order placement,
//! invoice numbering) run inside a `TransactionGuard`.

use sqlx::{PgPool, Postgres, Transaction};
use std::ops::{Deref, DerefMut};
use venuehub_core::AppError;

/// A database transaction that rolls back unless explicitly committed.
///
/// # Example
///
/// ```ignore
/// use venuehub_db::TransactionGuard;
///
/// async fn example(pool: &sqlx::PgPool) -> Result<(), venuehub_core::AppError> {
///     let mut tx = TransactionGuard::begin(pool, "example").await?;
///     sqlx::query("UPDATE ...").execute(&mut **tx).await?;
///     tx.commit().await
/// }
/// ```
pub struct TransactionGuard<'a> {
    transaction: Transaction<'a, Postgres>,
    operation: &'static str,
}

impl<'a> TransactionGuard<'a> {
    /// Begin a new database transaction
    pub async fn begin(pool: &'a PgPool, operation: &'static str) -> Result<Self, AppError> {
        let transaction = pool.begin().await.map_err(|e| {
            tracing::error!(error = %e, operation, "Failed to begin database transaction");
            AppError::from(e)
        })?;

        Ok(Self {
            transaction,
            operation,
        })
    }

    /// Commit the transaction
    pub async fn commit(self) -> Result<(), AppError> {
        let operation = self.operation;
        self.transaction.commit().await.map_err(|e| {
            tracing::error!(error = %e, operation, "Failed to commit database transaction");
            AppError::from(e)
        })?;
        tracing::debug!(operation, "Transaction committed");
        Ok(())
    }

    /// Roll back explicitly. Dropping the guard has the same effect.
    pub async fn rollback(self) -> Result<(), AppError> {
        let operation = self.operation;
        self.transaction.rollback().await.map_err(|e| {
            tracing::error!(error = %e, operation, "Failed to rollback database transaction");
            AppError::from(e)
        })?;
        tracing::debug!(operation, "Transaction rolled back");
        Ok(())
    }
}

impl<'a> Deref for TransactionGuard<'a> {
    type Target = Transaction<'a, Postgres>;

    fn deref(&self) -> &Self::Target {
        &self.transaction
    }
}

impl<'a> DerefMut for TransactionGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.transaction
    }
}
