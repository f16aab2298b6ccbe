//! SurrealDB implementation of [`SavedViewRepository`].

use chrono::{DateTime, Utc};
use saasify_core::error::SaasifyResult;
use saasify_core::models::project::ProjectStatus;
use saasify_core::models::saved_view::{CreateSavedView, SavedView, SavedViewFilters};
use saasify_core::repository::SavedViewRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_enum, parse_uuid};
use crate::error::DbError;

/// Every statement here is scoped to the owner as well as the tenant.
const OWNER_SCOPE: &str = "tenant_id = $tenant_id AND user_id = $user_id";

#[derive(Debug, SurrealValue)]
struct SavedViewRow {
    tenant_id: String,
    user_id: String,
    name: String,
    filter_status: Option<String>,
    filter_search: Option<String>,
    is_pinned: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SavedViewRow {
    fn into_view(self, id: Uuid) -> Result<SavedView, DbError> {
        let status = self
            .filter_status
            .as_deref()
            .map(|s| parse_enum("project status", s, ProjectStatus::parse))
            .transpose()?;
        Ok(SavedView {
            id,
            tenant_id: parse_uuid("tenant", &self.tenant_id)?,
            user_id: parse_uuid("user", &self.user_id)?,
            name: self.name,
            filters: SavedViewFilters {
                status,
                search: self.filter_search,
            },
            is_pinned: self.is_pinned,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct SavedViewRowWithId {
    record_id: String,
    tenant_id: String,
    user_id: String,
    name: String,
    filter_status: Option<String>,
    filter_search: Option<String>,
    is_pinned: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SavedViewRowWithId {
    fn try_into_view(self) -> Result<SavedView, DbError> {
        let id = parse_uuid("saved view", &self.record_id)?;
        SavedViewRow {
            tenant_id: self.tenant_id,
            user_id: self.user_id,
            name: self.name,
            filter_status: self.filter_status,
            filter_search: self.filter_search,
            is_pinned: self.is_pinned,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_view(id)
    }
}

#[derive(Clone)]
pub struct SurrealSavedViewRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSavedViewRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn single(
        &self,
        query: String,
        tenant_id: Uuid,
        user_id: Uuid,
        id: Uuid,
        is_pinned: Option<bool>,
    ) -> Result<SavedView, DbError> {
        let mut request = self
            .db
            .query(query)
            .bind(("id", id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("user_id", user_id.to_string()));
        if let Some(pinned) = is_pinned {
            request = request.bind(("is_pinned", pinned));
        }

        let mut result = request
            .await?
            .check()
            .map_err(|e| DbError::from_statement("saved view", e))?;

        let rows: Vec<SavedViewRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("saved view", id))?
            .into_view(id)
    }
}

impl<C: Connection> SavedViewRepository for SurrealSavedViewRepository<C> {
    async fn create(&self, input: CreateSavedView) -> SaasifyResult<SavedView> {
        let id = Uuid::new_v4();

        let result = self
            .db
            .query(
                "CREATE type::record('saved_view', $id) SET \
                 tenant_id = $tenant_id, \
                 user_id = $user_id, \
                 name = $name, \
                 filter_status = $filter_status, \
                 filter_search = $filter_search, \
                 is_pinned = $is_pinned",
            )
            .bind(("id", id.to_string()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("name", input.name))
            .bind((
                "filter_status",
                input.filters.status.map(|s| s.as_str().to_string()),
            ))
            .bind(("filter_search", input.filters.search))
            .bind(("is_pinned", input.is_pinned))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("saved view", e))?;

        let rows: Vec<SavedViewRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("saved view", id))?;
        Ok(row.into_view(id)?)
    }

    async fn list_for_user(&self, tenant_id: Uuid, user_id: Uuid) -> SaasifyResult<Vec<SavedView>> {
        let mut result = self
            .db
            .query(format!(
                "SELECT meta::id(id) AS record_id, * FROM saved_view \
                 WHERE {OWNER_SCOPE} \
                 ORDER BY is_pinned DESC, created_at DESC"
            ))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SavedViewRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(SavedViewRowWithId::try_into_view)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn set_pinned(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        id: Uuid,
        is_pinned: bool,
    ) -> SaasifyResult<SavedView> {
        let query = format!(
            "UPDATE type::record('saved_view', $id) SET \
             is_pinned = $is_pinned, updated_at = time::now() \
             WHERE {OWNER_SCOPE}"
        );
        Ok(self
            .single(query, tenant_id, user_id, id, Some(is_pinned))
            .await?)
    }

    async fn delete(&self, tenant_id: Uuid, user_id: Uuid, id: Uuid) -> SaasifyResult<SavedView> {
        let query = format!(
            "DELETE type::record('saved_view', $id) \
             WHERE {OWNER_SCOPE} \
             RETURN BEFORE"
        );
        Ok(self.single(query, tenant_id, user_id, id, None).await?)
    }
}
