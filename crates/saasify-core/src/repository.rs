//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Tenant-scoped repositories
//! require a `tenant_id` parameter on every call and filter by it.

use serde::Serialize;
use uuid::Uuid;

use crate::error::SaasifyResult;
use crate::models::{
    audit::{AuditLogEntry, CreateAuditLogEntry},
    invite::{CreateInvite, Invite, InviteStatus},
    membership::{CreateMembership, Membership, TenantRole},
    project::{CreateProject, Project, ProjectFilter, ProjectStatus, UpdateProject},
    project_access::{ProjectMember, UpsertProjectMember},
    saved_view::{CreateSavedView, SavedView},
    tenant::{CreateTenant, Tenant, TenantStatus},
    user::{PlatformRole, UpsertUser, User},
};

pub const DEFAULT_PAGE_LIMIT: u64 = 12;
pub const MAX_PAGE_LIMIT: u64 = 100;

/// Pagination parameters for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Pagination {
    /// Builds a window from optional caller input, clamping `limit` to
    /// `1..=100` (default 12). Negative offsets become zero.
    pub fn clamped(offset: Option<i64>, limit: Option<i64>) -> Self {
        let limit = limit
            .unwrap_or(DEFAULT_PAGE_LIMIT as i64)
            .clamp(1, MAX_PAGE_LIMIT as i64) as u64;
        let offset = offset.unwrap_or(0).max(0) as u64;
        Self { offset, limit }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Tenants & users (global scope)
// ---------------------------------------------------------------------------

pub trait TenantRepository: Send + Sync {
    fn create(&self, input: CreateTenant) -> impl Future<Output = SaasifyResult<Tenant>> + Send;
    /// Create the tenant and an active `tenant_admin` membership for
    /// `input.created_by` in one transaction.
    fn create_with_admin(
        &self,
        input: CreateTenant,
    ) -> impl Future<Output = SaasifyResult<Tenant>> + Send;
    /// `Ok(None)` when no tenant has this id.
    fn find_by_id(&self, id: Uuid) -> impl Future<Output = SaasifyResult<Option<Tenant>>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = SaasifyResult<Tenant>> + Send;
    /// Batch fetch; missing ids are skipped.
    fn get_many(&self, ids: &[Uuid]) -> impl Future<Output = SaasifyResult<Vec<Tenant>>> + Send;
    /// Newest first. `search` matches name or slug, case-insensitive.
    fn list(
        &self,
        search: Option<&str>,
        pagination: Pagination,
    ) -> impl Future<Output = SaasifyResult<PaginatedResult<Tenant>>> + Send;
    fn count(
        &self,
        search: Option<&str>,
        status: Option<TenantStatus>,
    ) -> impl Future<Output = SaasifyResult<u64>> + Send;
    fn set_status(
        &self,
        id: Uuid,
        status: TenantStatus,
    ) -> impl Future<Output = SaasifyResult<Tenant>> + Send;
}

pub trait UserRepository: Send + Sync {
    /// Atomic create-or-refresh keyed by external id. Never touches the
    /// platform role of an existing user.
    fn upsert_by_external_id(
        &self,
        input: UpsertUser,
    ) -> impl Future<Output = SaasifyResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = SaasifyResult<User>> + Send;
    fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> impl Future<Output = SaasifyResult<Option<User>>> + Send;
    fn get_many(&self, ids: &[Uuid]) -> impl Future<Output = SaasifyResult<Vec<User>>> + Send;
    fn set_platform_role(
        &self,
        id: Uuid,
        role: PlatformRole,
    ) -> impl Future<Output = SaasifyResult<User>> + Send;
}

// ---------------------------------------------------------------------------
// Tenant-scoped repositories
// ---------------------------------------------------------------------------

/// Every lookup here except `create` ignores memberships whose status is
/// `removed`.
pub trait MembershipRepository: Send + Sync {
    fn create(
        &self,
        input: CreateMembership,
    ) -> impl Future<Output = SaasifyResult<Membership>> + Send;
    fn find(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = SaasifyResult<Option<Membership>>> + Send;
    fn list_for_tenant(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = SaasifyResult<Vec<Membership>>> + Send;
    fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = SaasifyResult<Vec<Membership>>> + Send;
    fn update_role(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        role: TenantRole,
    ) -> impl Future<Output = SaasifyResult<Membership>> + Send;
    fn remove(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = SaasifyResult<Membership>> + Send;
    /// Consume a pending invite and grant the membership it carries, in one
    /// transaction. A removed or invited membership is re-activated.
    ///
    /// `AlreadyExists` when `user_id` is already an active member of the
    /// invite's tenant; `NotFound` when the invite is no longer pending or
    /// has expired. Neither failure changes anything.
    fn accept_invite(
        &self,
        invite: &Invite,
        user_id: Uuid,
    ) -> impl Future<Output = SaasifyResult<Membership>> + Send;
    fn count_for_tenant(&self, tenant_id: Uuid) -> impl Future<Output = SaasifyResult<u64>> + Send;
}

/// Logically deleted projects are invisible to every read except `restore`.
pub trait ProjectRepository: Send + Sync {
    fn create(&self, input: CreateProject) -> impl Future<Output = SaasifyResult<Project>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = SaasifyResult<Project>> + Send;
    fn list(
        &self,
        tenant_id: Uuid,
        filter: ProjectFilter,
        pagination: Pagination,
    ) -> impl Future<Output = SaasifyResult<PaginatedResult<Project>>> + Send;
    fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateProject,
    ) -> impl Future<Output = SaasifyResult<Project>> + Send;
    fn soft_delete(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        actor_id: Uuid,
    ) -> impl Future<Output = SaasifyResult<Project>> + Send;
    fn restore(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        actor_id: Uuid,
    ) -> impl Future<Output = SaasifyResult<Project>> + Send;
    /// Non-deleted projects in one tenant, optionally of one status.
    fn count(
        &self,
        tenant_id: Uuid,
        status: Option<ProjectStatus>,
    ) -> impl Future<Output = SaasifyResult<u64>> + Send;
    /// Non-deleted projects across every tenant.
    fn count_all(&self) -> impl Future<Output = SaasifyResult<u64>> + Send;
}

pub trait InviteRepository: Send + Sync {
    fn create(&self, input: CreateInvite) -> impl Future<Output = SaasifyResult<Invite>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = SaasifyResult<Invite>> + Send;
    /// Global lookup by token hash; the caller does not know the tenant yet.
    fn find_pending_by_token_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = SaasifyResult<Option<Invite>>> + Send;
    fn list(
        &self,
        tenant_id: Uuid,
        status: Option<InviteStatus>,
        pagination: Pagination,
    ) -> impl Future<Output = SaasifyResult<PaginatedResult<Invite>>> + Send;
    /// Pending -> revoked. `NotFound` for anything not pending.
    fn revoke(&self, tenant_id: Uuid, id: Uuid)
    -> impl Future<Output = SaasifyResult<Invite>> + Send;
}

/// Per-project grants. Every call is scoped to `tenant_id`.
pub trait ProjectMemberRepository: Send + Sync {
    fn upsert(
        &self,
        input: UpsertProjectMember,
    ) -> impl Future<Output = SaasifyResult<ProjectMember>> + Send;
    /// Active -> removed. `NotFound` when there is no active grant.
    fn remove(
        &self,
        tenant_id: Uuid,
        project_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = SaasifyResult<ProjectMember>> + Send;
    /// Active grants only, newest first.
    fn list_active(
        &self,
        tenant_id: Uuid,
        project_id: Uuid,
    ) -> impl Future<Output = SaasifyResult<Vec<ProjectMember>>> + Send;
}

/// Saved views are owned by one user; every call filters on both
/// `tenant_id` and `user_id`.
pub trait SavedViewRepository: Send + Sync {
    fn create(
        &self,
        input: CreateSavedView,
    ) -> impl Future<Output = SaasifyResult<SavedView>> + Send;
    /// Pinned views first, then newest first.
    fn list_for_user(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = SaasifyResult<Vec<SavedView>>> + Send;
    fn set_pinned(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        id: Uuid,
        pinned: bool,
    ) -> impl Future<Output = SaasifyResult<SavedView>> + Send;
    /// Returns the deleted view.
    fn delete(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = SaasifyResult<SavedView>> + Send;
}

// ---------------------------------------------------------------------------
// Audit (append-only, tenant-scoped)
// ---------------------------------------------------------------------------

pub trait AuditLogRepository: Send + Sync {
    fn append(
        &self,
        input: CreateAuditLogEntry,
    ) -> impl Future<Output = SaasifyResult<AuditLogEntry>> + Send;
    /// Newest first.
    fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = SaasifyResult<PaginatedResult<AuditLogEntry>>> + Send;
}
