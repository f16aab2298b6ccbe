//! Domain models for Saasify.
//!
//! Persisted records (users, tenants, memberships, projects and their
//! access grants, saved views, invites, audit entries) plus the derived, never-persisted [`TenantContext`].
//!
//! [`TenantContext`]: tenant_context::TenantContext

pub mod audit;
pub mod invite;
pub mod membership;
pub mod project;
pub mod project_access;
pub mod saved_view;
pub mod tenant;
pub mod tenant_context;
pub mod user;
