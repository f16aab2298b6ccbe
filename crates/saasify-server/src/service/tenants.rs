//! Platform-level tenant provisioning and status management.

use saasify_core::error::SaasifyResult;
use saasify_core::models::tenant::{CreateTenant, Tenant, TenantListing, TenantStatus};
use saasify_core::repository::{AuditLogRepository, Pagination, TenantRepository};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::audit::AuditTrail;
use super::validate::{
    normalize_slug, trim_in_place, validate_input, validate_object, validate_slug,
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TenantInput {
    #[serde(default)]
    #[validate(length(min = 1, max = 120, message = "Must be 1 to 120 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,
    #[serde(default)]
    #[validate(custom(function = "validate_object"))]
    pub metadata: Option<serde_json::Value>,
}

impl TenantInput {
    fn normalized(mut self) -> Self {
        trim_in_place(&mut self.name);
        self.slug = normalize_slug(&self.slug);
        self
    }
}

#[derive(Clone)]
pub struct TenantService<T: TenantRepository, A: AuditLogRepository> {
    tenants: T,
    audit: AuditTrail<A>,
}

impl<T: TenantRepository, A: AuditLogRepository> TenantService<T, A> {
    pub fn new(tenants: T, audit: AuditTrail<A>) -> Self {
        Self { tenants, audit }
    }

    /// Provision a tenant. The creator becomes its first tenant admin in
    /// the same write, so a tenant never exists without an admin.
    pub async fn create(&self, actor_id: Uuid, input: TenantInput) -> SaasifyResult<Tenant> {
        let input = input.normalized();
        validate_input(&input)?;

        let tenant = self
            .tenants
            .create_with_admin(CreateTenant {
                name: input.name,
                slug: input.slug,
                created_by: actor_id,
                metadata: input.metadata,
            })
            .await?;

        info!(tenant_id = %tenant.id, slug = %tenant.slug, "Tenant provisioned");
        self.audit
            .record(tenant.id, actor_id, "tenant.created", Some(tenant.id), None)
            .await;
        Ok(tenant)
    }

    /// One page of tenants plus status counts under the same search.
    pub async fn list(
        &self,
        search: Option<&str>,
        pagination: Pagination,
    ) -> SaasifyResult<TenantListing> {
        let (page, active, suspended) = tokio::try_join!(
            self.tenants.list(search, pagination),
            self.tenants.count(search, Some(TenantStatus::Active)),
            self.tenants.count(search, Some(TenantStatus::Suspended)),
        )?;

        Ok(TenantListing {
            items: page.items,
            total: page.total,
            active,
            suspended,
            limit: page.limit,
            offset: page.offset,
        })
    }

    pub async fn set_status(
        &self,
        actor_id: Uuid,
        tenant_id: Uuid,
        status: TenantStatus,
    ) -> SaasifyResult<Tenant> {
        let tenant = self.tenants.set_status(tenant_id, status).await?;
        info!(%tenant_id, status = status.as_str(), "Tenant status changed");
        self.audit
            .record(
                tenant_id,
                actor_id,
                "tenant.status_changed",
                Some(tenant_id),
                Some(serde_json::json!({ "status": status.as_str() })),
            )
            .await;
        Ok(tenant)
    }
}
