//! Append-only audit trail for tenant mutations.

use saasify_core::error::SaasifyResult;
use saasify_core::models::audit::{AuditLogEntry, CreateAuditLogEntry};
use saasify_core::repository::{AuditLogRepository, PaginatedResult, Pagination};
use tracing::error;
use uuid::Uuid;

#[derive(Clone)]
pub struct AuditTrail<A: AuditLogRepository> {
    repo: A,
}

impl<A: AuditLogRepository> AuditTrail<A> {
    pub fn new(repo: A) -> Self {
        Self { repo }
    }

    /// Record a mutation that has already happened.
    ///
    /// A failed append is logged and swallowed; the mutation it describes
    /// is not rolled back.
    pub async fn record(
        &self,
        tenant_id: Uuid,
        actor_id: Uuid,
        action: &str,
        target_id: Option<Uuid>,
        metadata: Option<serde_json::Value>,
    ) {
        let entry = CreateAuditLogEntry {
            tenant_id,
            actor_id,
            action: action.to_string(),
            target_id,
            metadata,
        };
        if let Err(e) = self.repo.append(entry).await {
            error!(%tenant_id, %actor_id, action, error = %e, "Failed to append audit entry");
        }
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> SaasifyResult<PaginatedResult<AuditLogEntry>> {
        self.repo.list(tenant_id, pagination).await
    }
}
