//! Membership listings and admin changes.
//!
//! Listings join memberships with users or tenants explicitly: one batch
//! fetch of the referenced records, then a merge by id.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use saasify_core::error::{SaasifyError, SaasifyResult};
use saasify_core::models::membership::{Membership, MembershipStatus, TenantRole};
use saasify_core::models::tenant::TenantStatus;
use saasify_core::repository::{
    AuditLogRepository, MembershipRepository, TenantRepository, UserRepository,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::audit::AuditTrail;

/// A tenant member with their profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub user_id: Uuid,
    pub role: TenantRole,
    pub status: MembershipStatus,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub joined_at: DateTime<Utc>,
}

/// One of the caller's tenants.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyTenantView {
    pub tenant_id: Uuid,
    pub tenant_name: String,
    pub tenant_slug: String,
    pub tenant_status: TenantStatus,
    pub role: TenantRole,
}

#[derive(Clone)]
pub struct MemberService<M, U, T, A>
where
    M: MembershipRepository,
    U: UserRepository,
    T: TenantRepository,
    A: AuditLogRepository,
{
    memberships: M,
    users: U,
    tenants: T,
    audit: AuditTrail<A>,
}

impl<M, U, T, A> MemberService<M, U, T, A>
where
    M: MembershipRepository,
    U: UserRepository,
    T: TenantRepository,
    A: AuditLogRepository,
{
    pub fn new(memberships: M, users: U, tenants: T, audit: AuditTrail<A>) -> Self {
        Self {
            memberships,
            users,
            tenants,
            audit,
        }
    }

    pub async fn list_members(&self, tenant_id: Uuid) -> SaasifyResult<Vec<MemberView>> {
        let memberships = self.memberships.list_for_tenant(tenant_id).await?;
        let ids: Vec<Uuid> = memberships.iter().map(|m| m.user_id).collect();
        let users: HashMap<Uuid, _> = self
            .users
            .get_many(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(memberships
            .into_iter()
            .map(|m| {
                let user = users.get(&m.user_id);
                MemberView {
                    user_id: m.user_id,
                    role: m.role,
                    status: m.status,
                    name: user.map(|u| u.name.clone()),
                    email: user.map(|u| u.email.clone()),
                    avatar_url: user.map(|u| u.avatar_url.clone()),
                    joined_at: m.created_at,
                }
            })
            .collect())
    }

    /// The caller's memberships joined with their tenants, newest first.
    /// Memberships whose tenant no longer exists are dropped.
    pub async fn my_tenants(&self, user_id: Uuid) -> SaasifyResult<Vec<MyTenantView>> {
        let memberships = self.memberships.list_for_user(user_id).await?;
        let ids: Vec<Uuid> = memberships.iter().map(|m| m.tenant_id).collect();
        let tenants: HashMap<Uuid, _> = self
            .tenants
            .get_many(&ids)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        Ok(memberships
            .into_iter()
            .filter_map(|m| {
                let tenant = tenants.get(&m.tenant_id)?;
                Some(MyTenantView {
                    tenant_id: tenant.id,
                    tenant_name: tenant.name.clone(),
                    tenant_slug: tenant.slug.clone(),
                    tenant_status: tenant.status,
                    role: m.role,
                })
            })
            .collect())
    }

    pub async fn change_role(
        &self,
        tenant_id: Uuid,
        actor_id: Uuid,
        user_id: Uuid,
        role: TenantRole,
    ) -> SaasifyResult<Membership> {
        if actor_id == user_id {
            return Err(SaasifyError::invalid_field(
                "userId",
                "You cannot change your own role",
            ));
        }
        let membership = self.memberships.update_role(tenant_id, user_id, role).await?;
        info!(%tenant_id, %user_id, role = role.as_str(), "Member role changed");
        self.audit
            .record(
                tenant_id,
                actor_id,
                "member.role_changed",
                Some(user_id),
                Some(serde_json::json!({ "role": role.as_str() })),
            )
            .await;
        Ok(membership)
    }

    pub async fn remove(
        &self,
        tenant_id: Uuid,
        actor_id: Uuid,
        user_id: Uuid,
    ) -> SaasifyResult<Membership> {
        if actor_id == user_id {
            return Err(SaasifyError::invalid_field(
                "userId",
                "You cannot remove yourself",
            ));
        }
        let membership = self.memberships.remove(tenant_id, user_id).await?;
        info!(%tenant_id, %user_id, "Member removed");
        self.audit
            .record(tenant_id, actor_id, "member.removed", Some(user_id), None)
            .await;
        Ok(membership)
    }
}
