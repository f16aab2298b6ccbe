//! SurrealDB implementation of [`MembershipRepository`].
//!
//! A membership's record id is derived from its (tenant, user) pair, so
//! each pair maps to exactly one record for its whole lifetime. Removal
//! only flips the status; accepting a later invite writes the same record
//! again.

use chrono::{DateTime, Utc};
use saasify_core::error::SaasifyResult;
use saasify_core::models::invite::Invite;
use saasify_core::models::membership::{
    CreateMembership, Membership, MembershipStatus, TenantRole,
};
use saasify_core::repository::MembershipRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_enum, parse_uuid};
use crate::error::DbError;

/// Deterministic record id for a (tenant, user) pair.
pub(super) fn membership_record_id(tenant_id: Uuid, user_id: Uuid) -> Uuid {
    Uuid::new_v5(
        &Uuid::NAMESPACE_OID,
        format!("membership:{tenant_id}:{user_id}").as_bytes(),
    )
}

const ALREADY_MEMBER: &str = "membership already active";
const INVITE_NOT_PENDING: &str = "invite is not pending";

/// Both preconditions sit in the first statement so that its THROW is the
/// error `check()` reports when the transaction is cancelled.
const ACCEPT_INVITE: &str = "\
BEGIN TRANSACTION;
IF (SELECT VALUE status FROM ONLY type::record('membership', $id)) = 'active' {
    THROW 'membership already active';
} ELSE IF array::len((
    UPDATE type::record('invite', $invite_id) SET
        status = 'accepted', accepted_by = $user_id, updated_at = time::now()
    WHERE status = 'pending' AND expires_at > time::now()
)) = 0 {
    THROW 'invite is not pending';
};
UPSERT type::record('membership', $id) SET
    tenant_id = $tenant_id, user_id = $user_id,
    role = $role, status = 'active', updated_at = time::now();
COMMIT TRANSACTION;
";

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct MembershipRow {
    tenant_id: String,
    user_id: String,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MembershipRow {
    fn into_membership(self, id: Uuid) -> Result<Membership, DbError> {
        Ok(Membership {
            id,
            tenant_id: parse_uuid("tenant", &self.tenant_id)?,
            user_id: parse_uuid("user", &self.user_id)?,
            role: parse_enum("tenant role", &self.role, TenantRole::parse)?,
            status: parse_enum("membership status", &self.status, MembershipStatus::parse)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct MembershipRowWithId {
    record_id: String,
    tenant_id: String,
    user_id: String,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MembershipRowWithId {
    fn try_into_membership(self) -> Result<Membership, DbError> {
        let id = parse_uuid("membership", &self.record_id)?;
        MembershipRow {
            tenant_id: self.tenant_id,
            user_id: self.user_id,
            role: self.role,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_membership(id)
    }
}

/// SurrealDB implementation of the Membership repository.
#[derive(Clone)]
pub struct SurrealMembershipRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMembershipRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Runs a single-record write and returns the written row, or
    /// `NotFound` when the statement's condition matched nothing.
    async fn write_one(
        &self,
        query: &str,
        id: Uuid,
        binds: Vec<(&'static str, String)>,
    ) -> Result<Membership, DbError> {
        let mut builder = self.db.query(query).bind(("id", id.to_string()));
        for bind in binds {
            builder = builder.bind(bind);
        }

        let result = builder.await?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("membership", e))?;

        let rows: Vec<MembershipRow> = result.take(0)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("membership", id))?;
        row.into_membership(id)
    }

    async fn list_where(&self, field: &'static str, value: Uuid) -> Result<Vec<Membership>, DbError> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM membership \
             WHERE {field} = $value AND status != 'removed' \
             ORDER BY created_at DESC"
        );

        let mut result = self
            .db
            .query(query)
            .bind(("value", value.to_string()))
            .await?;

        let rows: Vec<MembershipRowWithId> = result.take(0)?;
        rows.into_iter()
            .map(|row| row.try_into_membership())
            .collect()
    }
}

impl<C: Connection> MembershipRepository for SurrealMembershipRepository<C> {
    async fn create(&self, input: CreateMembership) -> SaasifyResult<Membership> {
        let id = membership_record_id(input.tenant_id, input.user_id);
        let status = input.status.unwrap_or(MembershipStatus::Active);

        Ok(self
            .write_one(
                "CREATE type::record('membership', $id) SET \
                 tenant_id = $tenant_id, user_id = $user_id, \
                 role = $role, status = $status",
                id,
                vec![
                    ("tenant_id", input.tenant_id.to_string()),
                    ("user_id", input.user_id.to_string()),
                    ("role", input.role.as_str().to_string()),
                    ("status", status.as_str().to_string()),
                ],
            )
            .await?)
    }

    async fn find(&self, tenant_id: Uuid, user_id: Uuid) -> SaasifyResult<Option<Membership>> {
        let id = membership_record_id(tenant_id, user_id);

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('membership', $id) \
                 WHERE status != 'removed'",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_membership(id)?)),
            None => Ok(None),
        }
    }

    async fn list_for_tenant(&self, tenant_id: Uuid) -> SaasifyResult<Vec<Membership>> {
        Ok(self.list_where("tenant_id", tenant_id).await?)
    }

    async fn list_for_user(&self, user_id: Uuid) -> SaasifyResult<Vec<Membership>> {
        Ok(self.list_where("user_id", user_id).await?)
    }

    async fn update_role(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        role: TenantRole,
    ) -> SaasifyResult<Membership> {
        Ok(self
            .write_one(
                "UPDATE type::record('membership', $id) SET \
                 role = $role, updated_at = time::now() \
                 WHERE status != 'removed'",
                membership_record_id(tenant_id, user_id),
                vec![("role", role.as_str().to_string())],
            )
            .await?)
    }

    async fn remove(&self, tenant_id: Uuid, user_id: Uuid) -> SaasifyResult<Membership> {
        Ok(self
            .write_one(
                "UPDATE type::record('membership', $id) SET \
                 status = 'removed', updated_at = time::now() \
                 WHERE status != 'removed'",
                membership_record_id(tenant_id, user_id),
                Vec::new(),
            )
            .await?)
    }

    async fn accept_invite(&self, invite: &Invite, user_id: Uuid) -> SaasifyResult<Membership> {
        let id = membership_record_id(invite.tenant_id, user_id);

        let result = self
            .db
            .query(ACCEPT_INVITE)
            .bind(("id", id.to_string()))
            .bind(("invite_id", invite.id.to_string()))
            .bind(("tenant_id", invite.tenant_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .bind(("role", invite.role.as_str()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| {
            let msg = e.to_string();
            if msg.contains(ALREADY_MEMBER) {
                DbError::AlreadyExists {
                    entity: "membership".into(),
                }
            } else if msg.contains(INVITE_NOT_PENDING) {
                DbError::not_found("invite", invite.id)
            } else {
                DbError::from_statement("membership", e)
            }
        })?;

        let rows: Vec<MembershipRow> = result.take(2).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("membership", id))?;
        Ok(row.into_membership(id)?)
    }

    async fn count_for_tenant(&self, tenant_id: Uuid) -> SaasifyResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM membership \
                 WHERE tenant_id = $tenant_id AND status != 'removed' \
                 GROUP ALL",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
