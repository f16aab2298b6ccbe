//! SurrealDB implementation of [`ProjectMemberRepository`].
//!
//! One record per (project, user) pair, keyed like memberships so that a
//! re-grant after removal reuses the same record.

use chrono::{DateTime, Utc};
use saasify_core::error::SaasifyResult;
use saasify_core::models::project_access::{
    ProjectAccessRole, ProjectAccessStatus, ProjectMember, UpsertProjectMember,
};
use saasify_core::repository::ProjectMemberRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_enum, parse_uuid};
use crate::error::DbError;

fn grant_record_id(project_id: Uuid, user_id: Uuid) -> Uuid {
    Uuid::new_v5(
        &Uuid::NAMESPACE_OID,
        format!("project_member:{project_id}:{user_id}").as_bytes(),
    )
}

#[derive(Debug, SurrealValue)]
struct GrantRow {
    tenant_id: String,
    project_id: String,
    user_id: String,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GrantRow {
    fn into_grant(self, id: Uuid) -> Result<ProjectMember, DbError> {
        Ok(ProjectMember {
            id,
            tenant_id: parse_uuid("tenant", &self.tenant_id)?,
            project_id: parse_uuid("project", &self.project_id)?,
            user_id: parse_uuid("user", &self.user_id)?,
            role: parse_enum("project role", &self.role, ProjectAccessRole::parse)?,
            status: parse_enum("project grant status", &self.status, ProjectAccessStatus::parse)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct GrantRowWithId {
    record_id: String,
    tenant_id: String,
    project_id: String,
    user_id: String,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GrantRowWithId {
    fn try_into_grant(self) -> Result<ProjectMember, DbError> {
        let id = parse_uuid("project member", &self.record_id)?;
        GrantRow {
            tenant_id: self.tenant_id,
            project_id: self.project_id,
            user_id: self.user_id,
            role: self.role,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_grant(id)
    }
}

#[derive(Clone)]
pub struct SurrealProjectMemberRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProjectMemberRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ProjectMemberRepository for SurrealProjectMemberRepository<C> {
    async fn upsert(&self, input: UpsertProjectMember) -> SaasifyResult<ProjectMember> {
        let id = grant_record_id(input.project_id, input.user_id);

        let result = self
            .db
            .query(
                "UPSERT type::record('project_member', $id) SET \
                 tenant_id = $tenant_id, project_id = $project_id, \
                 user_id = $user_id, role = $role, status = 'active', \
                 updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("project_id", input.project_id.to_string()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("role", input.role.as_str()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("project member", e))?;

        let rows: Vec<GrantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("project member", id))?;
        Ok(row.into_grant(id)?)
    }

    async fn remove(
        &self,
        tenant_id: Uuid,
        project_id: Uuid,
        user_id: Uuid,
    ) -> SaasifyResult<ProjectMember> {
        let id = grant_record_id(project_id, user_id);

        let result = self
            .db
            .query(
                "UPDATE type::record('project_member', $id) SET \
                 status = 'removed', updated_at = time::now() \
                 WHERE tenant_id = $tenant_id AND status = 'active'",
            )
            .bind(("id", id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("project member", e))?;

        let rows: Vec<GrantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("project member", id))?;
        Ok(row.into_grant(id)?)
    }

    async fn list_active(
        &self,
        tenant_id: Uuid,
        project_id: Uuid,
    ) -> SaasifyResult<Vec<ProjectMember>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM project_member \
                 WHERE tenant_id = $tenant_id AND project_id = $project_id \
                 AND status = 'active' \
                 ORDER BY created_at DESC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("project_id", project_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GrantRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(GrantRowWithId::try_into_grant)
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
