//! Security audit logging
//!
//! Security-relevant events (logins, registrations, rate limit violations,
//! CSRF failures, permission denials and admin changes to tenants, plans,
//! payment settings and reviews) are written to the `audit` tracing target
//! and persisted to `audit_logs` off the request path.

use crate::auth::models::SessionContext;
use crate::utils::ip_extraction::ClientIp;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use venuehub_core::models::{AuditEvent, AuditEventType};
use venuehub_db::AuditLogRepository;

#[derive(Clone)]
pub struct AuditLogger {
    repository: Option<AuditLogRepository>,
}

impl AuditLogger {
    pub fn new(repository: AuditLogRepository) -> Self {
        Self {
            repository: Some(repository),
        }
    }

    /// Logger that only emits tracing events.
    pub fn tracing_only() -> Self {
        Self { repository: None }
    }

    /// Emit the event and persist it in the background.
    pub fn record(&self, event: AuditEvent) {
        log_event(&event);

        if let Some(repository) = self.repository.clone() {
            tokio::spawn(async move {
                if let Err(e) = repository.insert(&event).await {
                    tracing::warn!(
                        error = %e,
                        event_type = %event.event_type,
                        "Failed to persist audit event"
                    );
                }
            });
        }
    }

    pub fn login(&self, email: &str, user_id: Option<uuid::Uuid>, ip: &str, success: bool) {
        let event_type = if success {
            AuditEventType::LoginSuccess
        } else {
            AuditEventType::LoginFailure
        };
        let mut event = AuditEvent::new(event_type, success)
            .ip(ip)
            .details(serde_json::json!({ "email": email }));
        if let Some(user_id) = user_id {
            event = event.actor(user_id);
        }
        self.record(event);
    }

    pub fn rate_limit_exceeded(&self, ip: &str, path: &str, limit_type: &str, limit: u32) {
        self.record(
            AuditEvent::new(AuditEventType::RateLimitExceeded, false)
                .ip(ip)
                .details(serde_json::json!({
                    "path": path,
                    "limitType": limit_type,
                    "limit": limit,
                })),
        );
    }

    /// Admin change to a platform resource, attributed to the caller.
    pub fn admin_change(
        &self,
        ctx: &SessionContext,
        event_type: AuditEventType,
        resource_type: &str,
        resource_id: uuid::Uuid,
        action: &str,
    ) {
        self.record(
            AuditEvent::new(event_type, true)
                .actor(ctx.user_id)
                .tenant(ctx.tenant_id)
                .resource(resource_type, resource_id)
                .details(serde_json::json!({ "action": action })),
        );
    }
}

fn log_event(event: &AuditEvent) {
    if event.success {
        tracing::event!(
            target: "audit",
            tracing::Level::INFO,
            event_type = %event.event_type,
            actor_user_id = ?event.actor_user_id,
            tenant_id = ?event.tenant_id,
            resource_type = ?event.resource_type,
            resource_id = ?event.resource_id,
            client_ip = ?event.ip_address,
            details = %event.details,
            success = event.success,
            "Security audit log"
        );
    } else {
        tracing::event!(
            target: "audit",
            tracing::Level::WARN,
            event_type = %event.event_type,
            actor_user_id = ?event.actor_user_id,
            tenant_id = ?event.tenant_id,
            resource_type = ?event.resource_type,
            resource_id = ?event.resource_id,
            client_ip = ?event.ip_address,
            details = %event.details,
            success = event.success,
            "Security audit log - failure"
        );
    }
}

/// Records a `permission_denied` event for every 403 returned to an
/// authenticated caller.
pub async fn permission_audit_middleware(
    State(audit): State<Arc<AuditLogger>>,
    request: Request,
    next: Next,
) -> Response {
    let ctx = request.extensions().get::<SessionContext>().cloned();
    let ip = request.extensions().get::<ClientIp>().cloned();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    if response.status() == StatusCode::FORBIDDEN {
        if let Some(ctx) = ctx {
            let mut event = AuditEvent::new(AuditEventType::PermissionDenied, false)
                .actor(ctx.user_id)
                .tenant(ctx.tenant_id)
                .details(serde_json::json!({
                    "method": method.as_str(),
                    "path": path,
                    "role": ctx.role.as_str(),
                }));
            if let Some(ClientIp(ip)) = ip {
                event = event.ip(ip);
            }
            audit.record(event);
        }
    }

    response
}
