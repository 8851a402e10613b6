use chrono::{DateTime, Datelike, Duration, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use venuehub_core::models::{
    compute_invoice_totals, format_invoice_number, CreateInvoiceRequest, Invoice, InvoiceQuery,
    InvoiceStatus, ListParams, Page,
};
use venuehub_core::AppError;

use crate::db::transaction::TransactionGuard;

/// Who may see an invoice list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceOwner {
    Any,
    Tenant(Uuid),
    Organization(Uuid),
}

#[derive(Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an invoice with the next `INV-{year}-{seq}` number. The per-year
    /// counter row is bumped in the same transaction so numbers never repeat.
    #[tracing::instrument(skip(self, request), fields(db.table = "invoices", db.operation = "insert"))]
    pub async fn create(&self, request: &CreateInvoiceRequest) -> Result<Invoice, AppError> {
        request.billed_party()?;
        let totals = compute_invoice_totals(&request.line_items, request.tax_percent)?;

        let issued_at = Utc::now();
        let due_at = issued_at + Duration::days(request.due_in_days);
        let status = if request.issue {
            InvoiceStatus::Issued
        } else {
            InvoiceStatus::Draft
        };

        let mut tx = TransactionGuard::begin(&self.pool, "create_invoice").await?;

        let seq = sqlx::query_scalar::<Postgres, i64>(
            r#"
            INSERT INTO invoice_sequences (year, last_value)
            VALUES ($1, 1)
            ON CONFLICT (year) DO UPDATE SET last_value = invoice_sequences.last_value + 1
            RETURNING last_value
            "#,
        )
        .bind(issued_at.year())
        .fetch_one(&mut **tx)
        .await?;
        let invoice_number = format_invoice_number(issued_at.year(), seq);

        let invoice = sqlx::query_as::<Postgres, Invoice>(
            r#"
            INSERT INTO invoices (
                invoice_number, tenant_id, organization_id, plan_id, line_items,
                subtotal, tax_amount, total, currency, status, issued_at, due_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, UPPER($9), $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(&invoice_number)
        .bind(request.tenant_id)
        .bind(request.organization_id)
        .bind(request.plan_id)
        .bind(Json(&totals.line_items))
        .bind(totals.subtotal)
        .bind(totals.tax_amount)
        .bind(totals.total)
        .bind(&request.currency)
        .bind(status)
        .bind(issued_at)
        .bind(due_at)
        .fetch_one(&mut **tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            total = %invoice.total,
            "Invoice created"
        );
        Ok(invoice)
    }

    #[tracing::instrument(skip(self), fields(db.table = "invoices", db.operation = "select"))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Invoice>, AppError> {
        let invoice = sqlx::query_as::<Postgres, Invoice>("SELECT * FROM invoices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(invoice)
    }

    /// List invoices visible to `owner`, newest first.
    #[tracing::instrument(skip(self), fields(db.table = "invoices", db.operation = "select"))]
    pub async fn list(
        &self,
        owner: InvoiceOwner,
        query: &InvoiceQuery,
    ) -> Result<Page<Invoice>, AppError> {
        let (tenant_id, organization_id) = match owner {
            InvoiceOwner::Any => (query.tenant_id, query.organization_id),
            InvoiceOwner::Tenant(id) => (Some(id), None),
            InvoiceOwner::Organization(id) => (None, Some(id)),
        };
        let params = ListParams {
            search: None,
            limit: query.limit,
            offset: query.offset,
        };

        let total = sqlx::query_scalar::<Postgres, i64>(
            r#"
            SELECT COUNT(*) FROM invoices
            WHERE ($1::uuid IS NULL OR tenant_id = $1)
              AND ($2::uuid IS NULL OR organization_id = $2)
              AND ($3::invoice_status IS NULL OR status = $3)
            "#,
        )
        .bind(tenant_id)
        .bind(organization_id)
        .bind(query.status)
        .fetch_one(&self.pool)
        .await?;

        let invoices = sqlx::query_as::<Postgres, Invoice>(
            r#"
            SELECT * FROM invoices
            WHERE ($1::uuid IS NULL OR tenant_id = $1)
              AND ($2::uuid IS NULL OR organization_id = $2)
              AND ($3::invoice_status IS NULL OR status = $3)
            ORDER BY issued_at DESC, invoice_number DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(tenant_id)
        .bind(organization_id)
        .bind(query.status)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(invoices, total, &params))
    }

    /// Move an invoice through its lifecycle; `paid_at` is stamped on payment.
    #[tracing::instrument(skip(self), fields(db.table = "invoices", db.operation = "update"))]
    pub async fn update_status(&self, id: Uuid, next: InvoiceStatus) -> Result<Invoice, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool, "update_invoice_status").await?;

        let current = sqlx::query_scalar::<Postgres, InvoiceStatus>(
            "SELECT status FROM invoices WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Invoice not found".to_string()))?;
        current.ensure_transition(next)?;

        let paid_at: Option<DateTime<Utc>> = (next == InvoiceStatus::Paid).then(Utc::now);
        let issued_now = current == InvoiceStatus::Draft && next == InvoiceStatus::Issued;

        let invoice = sqlx::query_as::<Postgres, Invoice>(
            r#"
            UPDATE invoices
            SET status = $2,
                paid_at = COALESCE($3, paid_at),
                issued_at = CASE WHEN $4 THEN NOW() ELSE issued_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(next)
        .bind(paid_at)
        .bind(issued_now)
        .fetch_one(&mut **tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            invoice_id = %id,
            from = current.as_str(),
            to = next.as_str(),
            "Invoice status changed"
        );
        Ok(invoice)
    }
}
