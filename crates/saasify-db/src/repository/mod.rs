//! SurrealDB repository implementations.

mod audit;
mod invite;
mod membership;
mod project;
mod project_member;
mod saved_view;
mod tenant;
mod user;

pub use audit::SurrealAuditLogRepository;
pub use invite::SurrealInviteRepository;
pub use membership::SurrealMembershipRepository;
pub use project::SurrealProjectRepository;
pub use project_member::SurrealProjectMemberRepository;
pub use saved_view::SurrealSavedViewRepository;
pub use tenant::SurrealTenantRepository;
pub use user::{SurrealUserRepository, user_record_id};

use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_uuid(what: &str, s: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Corrupt(format!("invalid {what} UUID: {e}")))
}

fn parse_optional_uuid(what: &str, s: Option<&str>) -> Result<Option<Uuid>, DbError> {
    s.map(|s| parse_uuid(what, s)).transpose()
}

fn parse_enum<T>(what: &str, s: &str, parse: fn(&str) -> Option<T>) -> Result<T, DbError> {
    parse(s).ok_or_else(|| DbError::Corrupt(format!("unknown {what}: {s}")))
}
