//! Tenant context resolution.

use saasify_core::error::SaasifyResult;
use saasify_core::models::tenant_context::{TenantContext, TenantContextStatus};
use saasify_core::repository::{MembershipRepository, TenantRepository};
use tracing::debug;
use uuid::Uuid;

use crate::config::AuthConfig;

/// Resolves the tenant a request may act on from its selection token.
///
/// Read-only: resolution never mutates tenants or memberships. Storage
/// errors propagate as errors; they are not folded into a status.
#[derive(Clone)]
pub struct TenantContextResolver<T: TenantRepository, M: MembershipRepository> {
    tenants: T,
    memberships: M,
    config: AuthConfig,
}

impl<T: TenantRepository, M: MembershipRepository> TenantContextResolver<T, M> {
    pub fn new(tenants: T, memberships: M, config: AuthConfig) -> Self {
        Self {
            tenants,
            memberships,
            config,
        }
    }

    /// Resolve `selection` (the raw selection cookie value) for `user_id`.
    ///
    /// With no `user_id` only the tenant's existence and activity are
    /// checked and the returned context has no role.
    pub async fn resolve(
        &self,
        selection: Option<&str>,
        user_id: Option<Uuid>,
    ) -> SaasifyResult<TenantContext> {
        let redirect = self.config.safe_select_path();

        // 1. Something must be selected.
        let Some(raw) = selection.map(str::trim).filter(|s| !s.is_empty()) else {
            debug!("No tenant selected");
            return Ok(TenantContext::failure(
                TenantContextStatus::MissingTenant,
                None,
                None,
                redirect,
            ));
        };

        // 2. It must look like a tenant id.
        let Ok(tenant_id) = Uuid::parse_str(raw) else {
            debug!(selection = raw, "Tenant selection is not a valid id");
            return Ok(TenantContext::failure(
                TenantContextStatus::InvalidTenant,
                None,
                None,
                redirect,
            ));
        };

        // 3. The tenant must exist.
        let Some(tenant) = self.tenants.find_by_id(tenant_id).await? else {
            debug!(%tenant_id, "Selected tenant not found");
            return Ok(TenantContext::failure(
                TenantContextStatus::TenantNotFound,
                Some(tenant_id),
                None,
                redirect,
            ));
        };

        // 4. Suspension overrides membership.
        if tenant.is_suspended() {
            debug!(%tenant_id, "Selected tenant is suspended");
            return Ok(TenantContext::failure(
                TenantContextStatus::TenantSuspended,
                Some(tenant_id),
                Some(tenant),
                redirect,
            ));
        }

        // 5. Existence-only check.
        let Some(user_id) = user_id else {
            return Ok(TenantContext::resolved(tenant, None));
        };

        // 6. Non-removed membership for the pair.
        match self.memberships.find(tenant_id, user_id).await? {
            Some(membership) => {
                debug!(%tenant_id, %user_id, role = membership.role.as_str(), "Tenant context resolved");
                Ok(TenantContext::resolved(tenant, Some(membership.role)))
            }
            None => {
                debug!(%tenant_id, %user_id, "Caller is not a member of the selected tenant");
                Ok(TenantContext::failure(
                    TenantContextStatus::NotAMember,
                    Some(tenant_id),
                    Some(tenant),
                    redirect,
                ))
            }
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}
