//! SurrealDB implementation of [`ProjectRepository`].

use chrono::{DateTime, Utc};
use saasify_core::error::SaasifyResult;
use saasify_core::models::project::{
    CreateProject, Project, ProjectFilter, ProjectStatus, UpdateProject,
};
use saasify_core::repository::{PaginatedResult, Pagination, ProjectRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_enum, parse_optional_uuid, parse_uuid};
use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct ProjectRow {
    tenant_id: String,
    title: String,
    description: String,
    status: String,
    deleted_at: Option<DateTime<Utc>>,
    created_by: String,
    updated_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProjectRow {
    fn into_project(self, id: Uuid) -> Result<Project, DbError> {
        Ok(Project {
            id,
            tenant_id: parse_uuid("tenant", &self.tenant_id)?,
            title: self.title,
            description: self.description,
            status: parse_enum("project status", &self.status, ProjectStatus::parse)?,
            deleted_at: self.deleted_at,
            created_by: parse_uuid("creator", &self.created_by)?,
            updated_by: parse_optional_uuid("updater", self.updated_by.as_deref())?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct ProjectRowWithId {
    record_id: String,
    tenant_id: String,
    title: String,
    description: String,
    status: String,
    deleted_at: Option<DateTime<Utc>>,
    created_by: String,
    updated_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProjectRowWithId {
    fn try_into_project(self) -> Result<Project, DbError> {
        let id = parse_uuid("project", &self.record_id)?;
        ProjectRow {
            tenant_id: self.tenant_id,
            title: self.title,
            description: self.description,
            status: self.status,
            deleted_at: self.deleted_at,
            created_by: self.created_by,
            updated_by: self.updated_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_project(id)
    }
}

/// SurrealDB implementation of the Project repository.
#[derive(Clone)]
pub struct SurrealProjectRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProjectRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Conditional single-record write scoped to `tenant_id`. Yields
    /// `NotFound` when the record is absent, belongs to another tenant or
    /// fails `condition`.
    async fn write_scoped(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        sets: &str,
        condition: &str,
        actor_id: Uuid,
    ) -> Result<Project, DbError> {
        let query = format!(
            "UPDATE type::record('project', $id) SET {sets}, \
             updated_by = $actor_id, updated_at = time::now() \
             WHERE tenant_id = $tenant_id AND {condition}"
        );

        let result = self
            .db
            .query(query)
            .bind(("id", id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("actor_id", actor_id.to_string()))
            .await?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("project", e))?;

        let rows: Vec<ProjectRow> = result.take(0)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("project", id))?;
        row.into_project(id)
    }
}

impl<C: Connection> ProjectRepository for SurrealProjectRepository<C> {
    async fn create(&self, input: CreateProject) -> SaasifyResult<Project> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('project', $id) SET \
                 tenant_id = $tenant_id, \
                 title = $title, \
                 description = $description, \
                 created_by = $created_by",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .bind(("created_by", input.created_by.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("project", e))?;

        let rows: Vec<ProjectRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("project", &id_str))?;

        Ok(row.into_project(id)?)
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> SaasifyResult<Project> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('project', $id) \
                 WHERE tenant_id = $tenant_id AND deleted_at = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProjectRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("project", &id_str))?;

        Ok(row.into_project(id)?)
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: ProjectFilter,
        pagination: Pagination,
    ) -> SaasifyResult<PaginatedResult<Project>> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut conditions = vec!["tenant_id = $tenant_id", "deleted_at = NONE"];
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if search.is_some() {
            conditions.push(
                "(string::contains(string::lowercase(title), $search) \
                 OR string::contains(string::lowercase(description), $search))",
            );
        }
        let where_clause = conditions.join(" AND ");

        let query = format!(
            "SELECT count() AS total FROM project WHERE {where_clause} GROUP ALL; \
             SELECT meta::id(id) AS record_id, * FROM project \
             WHERE {where_clause} \
             ORDER BY created_at DESC \
             LIMIT $limit START $offset;"
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));
        if let Some(status) = filter.status {
            builder = builder.bind(("status", status.as_str()));
        }
        if let Some(search) = search {
            builder = builder.bind(("search", search));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);
        let rows: Vec<ProjectRowWithId> = result.take(1).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_project())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateProject,
    ) -> SaasifyResult<Project> {
        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        sets.push("updated_by = $updated_by");
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('project', $id) SET {} \
             WHERE tenant_id = $tenant_id AND deleted_at = NONE",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("updated_by", input.updated_by.to_string()));

        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("project", e))?;

        let rows: Vec<ProjectRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("project", id))?;

        Ok(row.into_project(id)?)
    }

    async fn soft_delete(&self, tenant_id: Uuid, id: Uuid, actor_id: Uuid) -> SaasifyResult<Project> {
        Ok(self
            .write_scoped(
                tenant_id,
                id,
                "deleted_at = time::now()",
                "deleted_at = NONE",
                actor_id,
            )
            .await?)
    }

    async fn restore(&self, tenant_id: Uuid, id: Uuid, actor_id: Uuid) -> SaasifyResult<Project> {
        Ok(self
            .write_scoped(
                tenant_id,
                id,
                "deleted_at = NONE",
                "deleted_at != NONE",
                actor_id,
            )
            .await?)
    }

    async fn count(&self, tenant_id: Uuid, status: Option<ProjectStatus>) -> SaasifyResult<u64> {
        let query = if status.is_some() {
            "SELECT count() AS total FROM project \
             WHERE tenant_id = $tenant_id AND deleted_at = NONE \
             AND status = $status GROUP ALL"
        } else {
            "SELECT count() AS total FROM project \
             WHERE tenant_id = $tenant_id AND deleted_at = NONE GROUP ALL"
        };

        let mut builder = self
            .db
            .query(query)
            .bind(("tenant_id", tenant_id.to_string()));
        if let Some(status) = status {
            builder = builder.bind(("status", status.as_str()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn count_all(&self) -> SaasifyResult<u64> {
        let mut result = self
            .db
            .query("SELECT count() AS total FROM project WHERE deleted_at = NONE GROUP ALL")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
