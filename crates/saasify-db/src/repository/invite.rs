//! SurrealDB implementation of [`InviteRepository`].

use chrono::{DateTime, Utc};
use saasify_core::error::SaasifyResult;
use saasify_core::models::invite::{CreateInvite, Invite, InviteStatus};
use saasify_core::models::membership::TenantRole;
use saasify_core::repository::{InviteRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_enum, parse_optional_uuid, parse_uuid};
use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct InviteRow {
    tenant_id: String,
    email: String,
    role: String,
    status: String,
    token_hash: String,
    invited_by: String,
    accepted_by: Option<String>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl InviteRow {
    fn into_invite(self, id: Uuid) -> Result<Invite, DbError> {
        Ok(Invite {
            id,
            tenant_id: parse_uuid("tenant", &self.tenant_id)?,
            email: self.email,
            role: parse_enum("tenant role", &self.role, TenantRole::parse)?,
            status: parse_enum("invite status", &self.status, InviteStatus::parse)?,
            token_hash: self.token_hash,
            invited_by: parse_uuid("inviter", &self.invited_by)?,
            accepted_by: parse_optional_uuid("acceptor", self.accepted_by.as_deref())?,
            expires_at: self.expires_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct InviteRowWithId {
    record_id: String,
    tenant_id: String,
    email: String,
    role: String,
    status: String,
    token_hash: String,
    invited_by: String,
    accepted_by: Option<String>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl InviteRowWithId {
    fn try_into_invite(self) -> Result<Invite, DbError> {
        let id = parse_uuid("invite", &self.record_id)?;
        InviteRow {
            tenant_id: self.tenant_id,
            email: self.email,
            role: self.role,
            status: self.status,
            token_hash: self.token_hash,
            invited_by: self.invited_by,
            accepted_by: self.accepted_by,
            expires_at: self.expires_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_invite(id)
    }
}

/// SurrealDB implementation of the Invite repository.
#[derive(Clone)]
pub struct SurrealInviteRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealInviteRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> InviteRepository for SurrealInviteRepository<C> {
    async fn create(&self, input: CreateInvite) -> SaasifyResult<Invite> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('invite', $id) SET \
                 tenant_id = $tenant_id, \
                 email = $email, \
                 role = $role, \
                 token_hash = $token_hash, \
                 invited_by = $invited_by, \
                 expires_at = $expires_at",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("email", input.email))
            .bind(("role", input.role.as_str()))
            .bind(("token_hash", input.token_hash))
            .bind(("invited_by", input.invited_by.to_string()))
            .bind(("expires_at", input.expires_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("invite", e))?;

        let rows: Vec<InviteRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("invite", &id_str))?;

        Ok(row.into_invite(id)?)
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> SaasifyResult<Invite> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('invite', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InviteRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("invite", &id_str))?;

        Ok(row.into_invite(id)?)
    }

    async fn find_pending_by_token_hash(&self, token_hash: &str) -> SaasifyResult<Option<Invite>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM invite \
                 WHERE token_hash = $token_hash AND status = 'pending'",
            )
            .bind(("token_hash", token_hash.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InviteRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_invite()?)),
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        status: Option<InviteStatus>,
        pagination: Pagination,
    ) -> SaasifyResult<PaginatedResult<Invite>> {
        let where_clause = if status.is_some() {
            "tenant_id = $tenant_id AND status = $status"
        } else {
            "tenant_id = $tenant_id"
        };

        let query = format!(
            "SELECT count() AS total FROM invite WHERE {where_clause} GROUP ALL; \
             SELECT meta::id(id) AS record_id, * FROM invite \
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
        if let Some(status) = status {
            builder = builder.bind(("status", status.as_str()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);
        let rows: Vec<InviteRowWithId> = result.take(1).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_invite())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn revoke(&self, tenant_id: Uuid, id: Uuid) -> SaasifyResult<Invite> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('invite', $id) SET \
                 status = 'revoked', updated_at = time::now() \
                 WHERE tenant_id = $tenant_id AND status = 'pending'",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("invite", e))?;

        let rows: Vec<InviteRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("invite", &id_str))?;

        Ok(row.into_invite(id)?)
    }
}
