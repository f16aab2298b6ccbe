//! SurrealDB schema for the tenant store, plus a versioned migration runner.
//!
//! Every table is SCHEMAFULL. Ids are UUID strings and enum columns hold
//! snake_case values guarded by ASSERT.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        sql: SCHEMA_V1,
    },
    Migration {
        version: 2,
        name: "project_access_and_saved_views",
        sql: SCHEMA_V2,
    },
];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Tenants (global scope)
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD name ON TABLE tenant TYPE string;
DEFINE FIELD slug ON TABLE tenant TYPE string;
DEFINE FIELD status ON TABLE tenant TYPE string \
    ASSERT $value IN ['active', 'suspended'] DEFAULT 'active';
DEFINE FIELD created_by ON TABLE tenant TYPE string;
DEFINE FIELD metadata ON TABLE tenant TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tenant_slug ON TABLE tenant COLUMNS slug UNIQUE;
DEFINE INDEX idx_tenant_status ON TABLE tenant COLUMNS status;

-- =======================================================================
-- Users (global scope, mirrored from the identity provider)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD external_id ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD name ON TABLE user TYPE string DEFAULT '';
DEFINE FIELD avatar_url ON TABLE user TYPE string DEFAULT '';
DEFINE FIELD platform_role ON TABLE user TYPE string \
    ASSERT $value IN ['platform_admin', 'user'] DEFAULT 'user';
DEFINE FIELD last_signed_in_at ON TABLE user TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_external_id ON TABLE user \
    COLUMNS external_id UNIQUE;
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email;

-- =======================================================================
-- Memberships (tenant x user)
-- =======================================================================
DEFINE TABLE membership SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE membership TYPE string;
DEFINE FIELD user_id ON TABLE membership TYPE string;
DEFINE FIELD role ON TABLE membership TYPE string \
    ASSERT $value IN ['tenant_admin', 'tenant_user'];
DEFINE FIELD status ON TABLE membership TYPE string \
    ASSERT $value IN ['active', 'invited', 'removed'] DEFAULT 'active';
DEFINE FIELD created_at ON TABLE membership TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE membership TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_membership_tenant_user ON TABLE membership \
    COLUMNS tenant_id, user_id UNIQUE;
DEFINE INDEX idx_membership_user ON TABLE membership COLUMNS user_id;

-- =======================================================================
-- Projects (tenant scope, soft-deletable)
-- =======================================================================
DEFINE TABLE project SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE project TYPE string;
DEFINE FIELD title ON TABLE project TYPE string;
DEFINE FIELD description ON TABLE project TYPE string DEFAULT '';
DEFINE FIELD status ON TABLE project TYPE string \
    ASSERT $value IN ['active', 'archived'] DEFAULT 'active';
DEFINE FIELD deleted_at ON TABLE project TYPE option<datetime>;
DEFINE FIELD created_by ON TABLE project TYPE string;
DEFINE FIELD updated_by ON TABLE project TYPE option<string>;
DEFINE FIELD created_at ON TABLE project TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE project TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_project_tenant_status ON TABLE project \
    COLUMNS tenant_id, status;
DEFINE INDEX idx_project_tenant_created ON TABLE project \
    COLUMNS tenant_id, created_at;

-- =======================================================================
-- Invites (tenant scope)
-- =======================================================================
DEFINE TABLE invite SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE invite TYPE string;
DEFINE FIELD email ON TABLE invite TYPE string;
DEFINE FIELD role ON TABLE invite TYPE string \
    ASSERT $value IN ['tenant_admin', 'tenant_user'];
DEFINE FIELD status ON TABLE invite TYPE string \
    ASSERT $value IN ['pending', 'accepted', 'revoked'] DEFAULT 'pending';
DEFINE FIELD token_hash ON TABLE invite TYPE string;
DEFINE FIELD invited_by ON TABLE invite TYPE string;
DEFINE FIELD accepted_by ON TABLE invite TYPE option<string>;
DEFINE FIELD expires_at ON TABLE invite TYPE datetime;
DEFINE FIELD created_at ON TABLE invite TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE invite TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_invite_token_hash ON TABLE invite \
    COLUMNS token_hash UNIQUE;
DEFINE INDEX idx_invite_tenant_status ON TABLE invite \
    COLUMNS tenant_id, status;

-- =======================================================================
-- Audit Log (tenant scope, append-only)
-- =======================================================================
DEFINE TABLE audit_log SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD tenant_id ON TABLE audit_log TYPE string;
DEFINE FIELD actor_id ON TABLE audit_log TYPE string;
DEFINE FIELD action ON TABLE audit_log TYPE string;
DEFINE FIELD target_id ON TABLE audit_log TYPE option<string>;
DEFINE FIELD metadata ON TABLE audit_log TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD timestamp ON TABLE audit_log TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_audit_tenant_time ON TABLE audit_log \
    COLUMNS tenant_id, timestamp;
";

// -----------------------------------------------------------------------
// Schema v2
// -----------------------------------------------------------------------

const SCHEMA_V2: &str = "\
-- =======================================================================
-- Project access grants (tenant scope, project x user)
-- =======================================================================
DEFINE TABLE project_member SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE project_member TYPE string;
DEFINE FIELD project_id ON TABLE project_member TYPE string;
DEFINE FIELD user_id ON TABLE project_member TYPE string;
DEFINE FIELD role ON TABLE project_member TYPE string \
    ASSERT $value IN ['viewer', 'editor'];
DEFINE FIELD status ON TABLE project_member TYPE string \
    ASSERT $value IN ['active', 'removed'] DEFAULT 'active';
DEFINE FIELD created_at ON TABLE project_member TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE project_member TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_project_member_project_user ON TABLE project_member \
    COLUMNS project_id, user_id UNIQUE;
DEFINE INDEX idx_project_member_tenant_project ON TABLE project_member \
    COLUMNS tenant_id, project_id, status;

-- =======================================================================
-- Saved project views (tenant x user)
-- =======================================================================
DEFINE TABLE saved_view SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE saved_view TYPE string;
DEFINE FIELD user_id ON TABLE saved_view TYPE string;
DEFINE FIELD name ON TABLE saved_view TYPE string;
DEFINE FIELD filter_status ON TABLE saved_view TYPE option<string> \
    ASSERT $value = NONE OR $value IN ['active', 'archived'];
DEFINE FIELD filter_search ON TABLE saved_view TYPE option<string>;
DEFINE FIELD is_pinned ON TABLE saved_view TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE saved_view TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE saved_view TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_saved_view_owner ON TABLE saved_view \
    COLUMNS tenant_id, user_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Bring `db` up to the latest schema version.
///
/// Versions already listed in `_migration` are skipped, so calling this on
/// every startup is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "migration v{} ({}) failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "could not record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Schema migration applied"
            );
        }
    }

    Ok(())
}

/// DDL of the first schema version.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

/// DDL added by the second schema version.
pub fn schema_v2() -> &'static str {
    SCHEMA_V2
}
