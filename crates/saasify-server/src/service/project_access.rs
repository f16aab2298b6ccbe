//! Per-project access grants, managed by tenant admins.
//!
//! A grant can only target an active member of the same tenant, on a
//! project that tenant owns.

use saasify_core::error::{SaasifyError, SaasifyResult};
use saasify_core::models::membership::MembershipStatus;
use saasify_core::models::project_access::{
    ProjectAccessRole, ProjectMember, UpsertProjectMember,
};
use saasify_core::repository::{
    AuditLogRepository, MembershipRepository, ProjectMemberRepository, ProjectRepository,
};
use tracing::info;
use uuid::Uuid;

use super::audit::AuditTrail;

#[derive(Clone)]
pub struct ProjectAccessService<G, P, M, A>
where
    G: ProjectMemberRepository,
    P: ProjectRepository,
    M: MembershipRepository,
    A: AuditLogRepository,
{
    grants: G,
    projects: P,
    memberships: M,
    audit: AuditTrail<A>,
}

impl<G, P, M, A> ProjectAccessService<G, P, M, A>
where
    G: ProjectMemberRepository,
    P: ProjectRepository,
    M: MembershipRepository,
    A: AuditLogRepository,
{
    pub fn new(grants: G, projects: P, memberships: M, audit: AuditTrail<A>) -> Self {
        Self {
            grants,
            projects,
            memberships,
            audit,
        }
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        project_id: Uuid,
    ) -> SaasifyResult<Vec<ProjectMember>> {
        self.projects.get_by_id(tenant_id, project_id).await?;
        self.grants.list_active(tenant_id, project_id).await
    }

    pub async fn assign(
        &self,
        tenant_id: Uuid,
        actor_id: Uuid,
        project_id: Uuid,
        user_id: Uuid,
        role: ProjectAccessRole,
    ) -> SaasifyResult<ProjectMember> {
        self.projects.get_by_id(tenant_id, project_id).await?;
        let is_active_member = self
            .memberships
            .find(tenant_id, user_id)
            .await?
            .is_some_and(|m| m.status == MembershipStatus::Active);
        if !is_active_member {
            return Err(SaasifyError::invalid_field(
                "userId",
                "Must be an active member of this tenant",
            ));
        }

        let grant = self
            .grants
            .upsert(UpsertProjectMember {
                tenant_id,
                project_id,
                user_id,
                role,
            })
            .await?;

        info!(%tenant_id, %project_id, %user_id, role = role.as_str(), "Project access granted");
        self.audit
            .record(
                tenant_id,
                actor_id,
                "project_member.assigned",
                Some(project_id),
                Some(serde_json::json!({ "userId": user_id, "role": role.as_str() })),
            )
            .await;
        Ok(grant)
    }

    pub async fn remove(
        &self,
        tenant_id: Uuid,
        actor_id: Uuid,
        project_id: Uuid,
        user_id: Uuid,
    ) -> SaasifyResult<ProjectMember> {
        let grant = self.grants.remove(tenant_id, project_id, user_id).await?;
        info!(%tenant_id, %project_id, %user_id, "Project access removed");
        self.audit
            .record(
                tenant_id,
                actor_id,
                "project_member.removed",
                Some(project_id),
                Some(serde_json::json!({ "userId": user_id })),
            )
            .await;
        Ok(grant)
    }
}
