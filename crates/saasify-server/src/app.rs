//! HTTP application wiring.
//!
//! Builds the shared state from one SurrealDB handle and composes the
//! axum router.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post, put};
use saasify_auth::{
    AccessGuard, AuthConfig, IdentityAdapter, JwtIdentityProvider, TenantContextResolver,
};
use saasify_db::repository::{
    SurrealAuditLogRepository, SurrealInviteRepository, SurrealMembershipRepository,
    SurrealProjectMemberRepository, SurrealProjectRepository, SurrealSavedViewRepository,
    SurrealTenantRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::service::{
    AuditTrail, InviteService, MemberService, ProjectAccessService, ProjectService,
    SavedViewsService, StatsService, TenantService,
};

type Users = SurrealUserRepository<Any>;
type Tenants = SurrealTenantRepository<Any>;
type Memberships = SurrealMembershipRepository<Any>;
type Projects = SurrealProjectRepository<Any>;
type Invites = SurrealInviteRepository<Any>;
type AuditLogs = SurrealAuditLogRepository<Any>;
type ProjectGrants = SurrealProjectMemberRepository<Any>;
type SavedViews = SurrealSavedViewRepository<Any>;

pub type Guard = AccessGuard<JwtIdentityProvider, Users, Tenants, Memberships>;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthConfig>,
    pub guard: Arc<Guard>,
    pub projects: Arc<ProjectService<Projects, AuditLogs>>,
    pub project_access: Arc<ProjectAccessService<ProjectGrants, Projects, Memberships, AuditLogs>>,
    pub saved_views: Arc<SavedViewsService<SavedViews>>,
    pub tenants: Arc<TenantService<Tenants, AuditLogs>>,
    pub members: Arc<MemberService<Memberships, Users, Tenants, AuditLogs>>,
    pub invites: Arc<InviteService<Invites, Memberships, AuditLogs>>,
    pub stats: Arc<StatsService<Tenants, Projects, Memberships>>,
    pub audit: Arc<AuditTrail<AuditLogs>>,
}

impl AppState {
    /// Wire every service onto `db`, which must already be migrated.
    pub fn new(db: Surreal<Any>, auth: AuthConfig) -> Self {
        let users = SurrealUserRepository::new(db.clone());
        let tenants = SurrealTenantRepository::new(db.clone());
        let memberships = SurrealMembershipRepository::new(db.clone());
        let projects = SurrealProjectRepository::new(db.clone());
        let invites = SurrealInviteRepository::new(db.clone());
        let grants = SurrealProjectMemberRepository::new(db.clone());
        let saved_views = SurrealSavedViewRepository::new(db.clone());
        let audit = AuditTrail::new(SurrealAuditLogRepository::new(db));

        let guard = AccessGuard::new(
            JwtIdentityProvider::new(auth.clone()),
            IdentityAdapter::new(users.clone()),
            TenantContextResolver::new(tenants.clone(), memberships.clone(), auth.clone()),
        );

        Self {
            auth: Arc::new(auth),
            guard: Arc::new(guard),
            projects: Arc::new(ProjectService::new(projects.clone(), audit.clone())),
            project_access: Arc::new(ProjectAccessService::new(
                grants,
                projects.clone(),
                memberships.clone(),
                audit.clone(),
            )),
            saved_views: Arc::new(SavedViewsService::new(saved_views)),
            tenants: Arc::new(TenantService::new(tenants.clone(), audit.clone())),
            members: Arc::new(MemberService::new(
                memberships.clone(),
                users,
                tenants.clone(),
                audit.clone(),
            )),
            invites: Arc::new(InviteService::new(
                invites,
                memberships.clone(),
                audit.clone(),
            )),
            stats: Arc::new(StatsService::new(tenants, projects, memberships)),
            audit: Arc::new(audit),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
            )
        });

    Router::new()
        .route("/api/health", get(api::system::health))
        .route("/api/me", get(api::me::current_user))
        .route("/api/me/tenants", get(api::me::my_tenants))
        .route("/api/me/tenant", put(api::me::select_tenant))
        .route("/api/invites/accept", post(api::invites::accept_invite))
        .route(
            "/api/tenant/:tenant_id/projects",
            get(api::projects::list_projects).post(api::projects::create_project),
        )
        .route(
            "/api/tenant/:tenant_id/projects/:project_id",
            get(api::projects::get_project)
                .patch(api::projects::update_project)
                .delete(api::projects::delete_project),
        )
        .route(
            "/api/tenant/:tenant_id/projects/:project_id/restore",
            post(api::projects::restore_project),
        )
        .route(
            "/api/tenant/:tenant_id/projects/:project_id/members",
            get(api::project_members::list_project_members)
                .post(api::project_members::assign_project_member)
                .delete(api::project_members::remove_project_member),
        )
        .route(
            "/api/tenant/:tenant_id/saved-views",
            get(api::saved_views::list_saved_views)
                .post(api::saved_views::create_saved_view)
                .patch(api::saved_views::pin_saved_view)
                .delete(api::saved_views::delete_saved_view),
        )
        .route(
            "/api/tenant/:tenant_id/members",
            get(api::members::list_members),
        )
        .route(
            "/api/tenant/:tenant_id/members/:user_id",
            patch(api::members::change_member_role).delete(api::members::remove_member),
        )
        .route(
            "/api/tenant/:tenant_id/invites",
            get(api::invites::list_invites).post(api::invites::create_invite),
        )
        .route(
            "/api/tenant/:tenant_id/invites/:invite_id",
            axum::routing::delete(api::invites::revoke_invite),
        )
        .route(
            "/api/tenant/:tenant_id/audit-logs",
            get(api::tenant::list_audit_logs),
        )
        .route("/api/tenant/:tenant_id/stats", get(api::tenant::tenant_stats))
        .route(
            "/api/platform/tenants",
            get(api::platform::list_tenants).post(api::platform::create_tenant),
        )
        .route(
            "/api/platform/tenants/:tenant_id",
            patch(api::platform::set_tenant_status),
        )
        .route("/api/platform/stats", get(api::platform::platform_stats))
        .route("/api/webhooks/identity", post(api::webhooks::identity_webhook))
        .layer(trace_layer)
        .with_state(state)
}
