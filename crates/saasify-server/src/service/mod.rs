//! Tenant-scoped and platform services.
//!
//! Services take an already-resolved scope (tenant id, acting user) and
//! never consult the request themselves. Each is generic over the
//! repository traits so it does not depend on the storage engine.

pub mod audit;
pub mod invites;
pub mod members;
pub mod project_access;
pub mod projects;
pub mod saved_views;
pub mod stats;
pub mod tenants;
pub mod validate;

pub use audit::AuditTrail;
pub use invites::{CreatedInvite, InviteInput, InviteService};
pub use members::{MemberService, MemberView, MyTenantView};
pub use project_access::ProjectAccessService;
pub use projects::{ProjectInput, ProjectPatch, ProjectService};
pub use saved_views::{SavedViewInput, SavedViewsService};
pub use stats::{ChartPoint, PlatformStats, StatsService, TenantStats};
pub use tenants::{TenantInput, TenantService};
