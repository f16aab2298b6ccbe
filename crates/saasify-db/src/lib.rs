//! Saasify Database: SurrealDB connection management and repository
//! implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Error types ([`DbError`])
//! - SurrealDB implementations of every `saasify-core` repository trait

mod connection;
mod error;
mod schema;

pub mod repository;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use repository::{
    SurrealAuditLogRepository, SurrealInviteRepository, SurrealMembershipRepository,
    SurrealProjectMemberRepository, SurrealProjectRepository, SurrealSavedViewRepository,
    SurrealTenantRepository, SurrealUserRepository, user_record_id,
};
pub use schema::{run_migrations, schema_v1, schema_v2};
