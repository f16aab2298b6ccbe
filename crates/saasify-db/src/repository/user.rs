//! SurrealDB implementation of [`UserRepository`].
//!
//! User record ids are UUID v5 digests of the identity-provider subject, so
//! every sign-in for the same subject addresses the same record and the
//! create-or-refresh can be a single `UPSERT`.

use chrono::{DateTime, Utc};
use saasify_core::error::SaasifyResult;
use saasify_core::models::user::{PlatformRole, UpsertUser, User};
use saasify_core::repository::UserRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{parse_enum, parse_uuid};
use crate::error::DbError;

const UPSERT_ATTEMPTS: usize = 3;

/// Deterministic record id for an identity-provider subject.
pub fn user_record_id(external_id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, external_id.as_bytes())
}

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    external_id: String,
    email: String,
    name: String,
    avatar_url: String,
    platform_role: String,
    last_signed_in_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        Ok(User {
            id,
            external_id: self.external_id,
            email: self.email,
            name: self.name,
            avatar_url: self.avatar_url,
            platform_role: parse_enum("platform role", &self.platform_role, PlatformRole::parse)?,
            last_signed_in_at: self.last_signed_in_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    external_id: String,
    email: String,
    name: String,
    avatar_url: String,
    platform_role: String,
    last_signed_in_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = parse_uuid("user", &self.record_id)?;
        UserRow {
            external_id: self.external_id,
            email: self.email,
            name: self.name,
            avatar_url: self.avatar_url,
            platform_role: self.platform_role,
            last_signed_in_at: self.last_signed_in_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_user(id)
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn upsert_once(&self, id: Uuid, input: &UpsertUser) -> Result<User, DbError> {
        let id_str = id.to_string();

        // platform_role and created_at are left to their schema defaults,
        // which only apply when the record is first created.
        let result = self
            .db
            .query(
                "UPSERT type::record('user', $id) SET \
                 external_id = $external_id, \
                 email = $email, \
                 name = $name, \
                 avatar_url = $avatar_url, \
                 last_signed_in_at = time::now(), \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("external_id", input.external_id.clone()))
            .bind(("email", input.email.clone()))
            .bind(("name", input.name.clone()))
            .bind(("avatar_url", input.avatar_url.clone()))
            .await?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("user", e))?;

        let rows: Vec<UserRow> = result.take(0)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", &id_str))?;
        row.into_user(id)
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn upsert_by_external_id(&self, input: UpsertUser) -> SaasifyResult<User> {
        let id = user_record_id(&input.external_id);

        let mut attempt = 1;
        loop {
            match self.upsert_once(id, &input).await {
                Ok(user) => {
                    debug!(user_id = %user.id, "User upserted");
                    return Ok(user);
                }
                Err(DbError::Conflict(msg)) if attempt < UPSERT_ATTEMPTS => {
                    warn!(attempt, error = %msg, "User upsert conflicted, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn get_by_id(&self, id: Uuid) -> SaasifyResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", &id_str))?;

        Ok(row.into_user(id)?)
    }

    async fn find_by_external_id(&self, external_id: &str) -> SaasifyResult<Option<User>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE external_id = $external_id",
            )
            .bind(("external_id", external_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_user()?)),
            None => Ok(None),
        }
    }

    async fn get_many(&self, ids: &[Uuid]) -> SaasifyResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = ids.iter().map(Uuid::to_string).collect();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE meta::id(id) IN $ids",
            )
            .bind(("ids", ids))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let users = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(users)
    }

    async fn set_platform_role(&self, id: Uuid, role: PlatformRole) -> SaasifyResult<User> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 platform_role = $role, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("role", role.as_str()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("user", e))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", &id_str))?;

        Ok(row.into_user(id)?)
    }
}
