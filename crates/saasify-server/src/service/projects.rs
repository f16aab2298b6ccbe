//! Project operations within one tenant.

use saasify_core::error::SaasifyResult;
use saasify_core::models::project::{
    CreateProject, Project, ProjectFilter, ProjectStatus, UpdateProject,
};
use saasify_core::repository::{
    AuditLogRepository, PaginatedResult, Pagination, ProjectRepository,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::audit::AuditTrail;
use super::validate::{trim_in_place, validate_input};

/// Body of a create request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProjectInput {
    #[serde(default)]
    #[validate(length(min = 1, max = 120, message = "Must be 1 to 120 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000, message = "Must be at most 2000 characters"))]
    pub description: Option<String>,
}

impl ProjectInput {
    fn normalized(mut self) -> Self {
        trim_in_place(&mut self.title);
        if let Some(description) = self.description.as_mut() {
            trim_in_place(description);
        }
        self
    }
}

/// Body of a partial update; absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProjectPatch {
    #[validate(length(min = 1, max = 120, message = "Must be 1 to 120 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "Must be at most 2000 characters"))]
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
}

impl ProjectPatch {
    fn normalized(mut self) -> Self {
        for field in [&mut self.title, &mut self.description] {
            if let Some(value) = field.as_mut() {
                trim_in_place(value);
            }
        }
        self
    }
}

#[derive(Clone)]
pub struct ProjectService<P: ProjectRepository, A: AuditLogRepository> {
    projects: P,
    audit: AuditTrail<A>,
}

impl<P: ProjectRepository, A: AuditLogRepository> ProjectService<P, A> {
    pub fn new(projects: P, audit: AuditTrail<A>) -> Self {
        Self { projects, audit }
    }

    pub async fn create(
        &self,
        tenant_id: Uuid,
        actor_id: Uuid,
        input: ProjectInput,
    ) -> SaasifyResult<Project> {
        let input = input.normalized();
        validate_input(&input)?;

        let project = self
            .projects
            .create(CreateProject {
                tenant_id,
                title: input.title,
                description: input.description.unwrap_or_default(),
                created_by: actor_id,
            })
            .await?;

        info!(%tenant_id, project_id = %project.id, "Project created");
        self.audit
            .record(tenant_id, actor_id, "project.created", Some(project.id), None)
            .await;
        Ok(project)
    }

    pub async fn get(&self, tenant_id: Uuid, project_id: Uuid) -> SaasifyResult<Project> {
        self.projects.get_by_id(tenant_id, project_id).await
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: ProjectFilter,
        pagination: Pagination,
    ) -> SaasifyResult<PaginatedResult<Project>> {
        self.projects.list(tenant_id, filter, pagination).await
    }

    pub async fn update(
        &self,
        tenant_id: Uuid,
        project_id: Uuid,
        actor_id: Uuid,
        patch: ProjectPatch,
    ) -> SaasifyResult<Project> {
        let patch = patch.normalized();
        validate_input(&patch)?;

        let changed: Vec<&str> = [
            patch.title.as_ref().map(|_| "title"),
            patch.description.as_ref().map(|_| "description"),
            patch.status.map(|_| "status"),
        ]
        .into_iter()
        .flatten()
        .collect();

        let project = self
            .projects
            .update(
                tenant_id,
                project_id,
                UpdateProject {
                    title: patch.title,
                    description: patch.description,
                    status: patch.status,
                    updated_by: actor_id,
                },
            )
            .await?;

        info!(%tenant_id, %project_id, ?changed, "Project updated");
        self.audit
            .record(
                tenant_id,
                actor_id,
                "project.updated",
                Some(project_id),
                Some(serde_json::json!({ "fields": changed })),
            )
            .await;
        Ok(project)
    }

    pub async fn delete(
        &self,
        tenant_id: Uuid,
        project_id: Uuid,
        actor_id: Uuid,
    ) -> SaasifyResult<Project> {
        let project = self.projects.soft_delete(tenant_id, project_id, actor_id).await?;
        info!(%tenant_id, %project_id, "Project deleted");
        self.audit
            .record(tenant_id, actor_id, "project.deleted", Some(project_id), None)
            .await;
        Ok(project)
    }

    pub async fn restore(
        &self,
        tenant_id: Uuid,
        project_id: Uuid,
        actor_id: Uuid,
    ) -> SaasifyResult<Project> {
        let project = self.projects.restore(tenant_id, project_id, actor_id).await?;
        info!(%tenant_id, %project_id, "Project restored");
        self.audit
            .record(tenant_id, actor_id, "project.restored", Some(project_id), None)
            .await;
        Ok(project)
    }
}
