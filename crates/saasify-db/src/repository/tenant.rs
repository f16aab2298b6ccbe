//! SurrealDB implementation of [`TenantRepository`].

use chrono::{DateTime, Utc};
use saasify_core::error::SaasifyResult;
use saasify_core::models::tenant::{CreateTenant, Tenant, TenantStatus};
use saasify_core::repository::{PaginatedResult, Pagination, TenantRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::membership::membership_record_id;
use super::{CountRow, parse_enum, parse_uuid};
use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct TenantRow {
    name: String,
    slug: String,
    status: String,
    created_by: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantRow {
    fn into_tenant(self, id: Uuid) -> Result<Tenant, DbError> {
        Ok(Tenant {
            id,
            name: self.name,
            slug: self.slug,
            status: parse_enum("tenant status", &self.status, TenantStatus::parse)?,
            created_by: parse_uuid("creator", &self.created_by)?,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TenantRowWithId {
    record_id: String,
    name: String,
    slug: String,
    status: String,
    created_by: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantRowWithId {
    fn try_into_tenant(self) -> Result<Tenant, DbError> {
        let id = parse_uuid("tenant", &self.record_id)?;
        TenantRow {
            name: self.name,
            slug: self.slug,
            status: self.status,
            created_by: self.created_by,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_tenant(id)
    }
}

/// Builds the WHERE clause shared by `list` and `count`.
fn tenant_filter(search: Option<&str>, status: Option<TenantStatus>) -> String {
    let mut conditions = Vec::new();
    if search.is_some() {
        conditions.push(
            "(string::contains(string::lowercase(name), $search) \
             OR string::contains(string::lowercase(slug), $search))",
        );
    }
    if status.is_some() {
        conditions.push("status = $status");
    }
    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    }
}

fn normalize_search(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

/// SurrealDB implementation of the Tenant repository.
#[derive(Clone)]
pub struct SurrealTenantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TenantRepository for SurrealTenantRepository<C> {
    async fn create(&self, input: CreateTenant) -> SaasifyResult<Tenant> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let metadata = input
            .metadata
            .unwrap_or(serde_json::Value::Object(Default::default()));

        let result = self
            .db
            .query(
                "CREATE type::record('tenant', $id) SET \
                 name = $name, slug = $slug, \
                 created_by = $created_by, \
                 metadata = $metadata",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("slug", input.slug))
            .bind(("created_by", input.created_by.to_string()))
            .bind(("metadata", metadata))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("tenant", e))?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("tenant", &id_str))?;

        Ok(row.into_tenant(id)?)
    }

    async fn create_with_admin(&self, input: CreateTenant) -> SaasifyResult<Tenant> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let metadata = input
            .metadata
            .unwrap_or(serde_json::Value::Object(Default::default()));

        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 CREATE type::record('tenant', $id) SET \
                 name = $name, slug = $slug, \
                 created_by = $created_by, \
                 metadata = $metadata; \
                 CREATE type::record('membership', $membership_id) SET \
                 tenant_id = $id, user_id = $created_by, \
                 role = 'tenant_admin', status = 'active'; \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str.clone()))
            .bind((
                "membership_id",
                membership_record_id(id, input.created_by).to_string(),
            ))
            .bind(("name", input.name))
            .bind(("slug", input.slug))
            .bind(("created_by", input.created_by.to_string()))
            .bind(("metadata", metadata))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("tenant", e))?;

        let rows: Vec<TenantRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("tenant", &id_str))?;

        Ok(row.into_tenant(id)?)
    }

    async fn find_by_id(&self, id: Uuid) -> SaasifyResult<Option<Tenant>> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('tenant', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_tenant(id)?)),
            None => Ok(None),
        }
    }

    async fn get_by_id(&self, id: Uuid) -> SaasifyResult<Tenant> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("tenant", id).into())
    }

    async fn get_many(&self, ids: &[Uuid]) -> SaasifyResult<Vec<Tenant>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = ids.iter().map(Uuid::to_string).collect();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tenant \
                 WHERE meta::id(id) IN $ids",
            )
            .bind(("ids", ids))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;
        let tenants = rows
            .into_iter()
            .map(|row| row.try_into_tenant())
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(tenants)
    }

    async fn list(
        &self,
        search: Option<&str>,
        pagination: Pagination,
    ) -> SaasifyResult<PaginatedResult<Tenant>> {
        let search = normalize_search(search);
        let total = self.count(search.as_deref(), None).await?;

        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM tenant {} \
             ORDER BY created_at DESC \
             LIMIT $limit START $offset",
            tenant_filter(search.as_deref(), None)
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));
        if let Some(search) = search {
            builder = builder.bind(("search", search));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_tenant())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn count(
        &self,
        search: Option<&str>,
        status: Option<TenantStatus>,
    ) -> SaasifyResult<u64> {
        let search = normalize_search(search);
        let query = format!(
            "SELECT count() AS total FROM tenant {} GROUP ALL",
            tenant_filter(search.as_deref(), status)
        );

        let mut builder = self.db.query(&query);
        if let Some(search) = search {
            builder = builder.bind(("search", search));
        }
        if let Some(status) = status {
            builder = builder.bind(("status", status.as_str()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn set_status(&self, id: Uuid, status: TenantStatus) -> SaasifyResult<Tenant> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('tenant', $id) SET \
                 status = $status, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("status", status.as_str()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("tenant", e))?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("tenant", &id_str))?;

        Ok(row.into_tenant(id)?)
    }
}
