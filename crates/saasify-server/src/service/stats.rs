//! Dashboard counters.

use saasify_core::error::SaasifyResult;
use saasify_core::models::project::ProjectStatus;
use saasify_core::models::tenant::TenantStatus;
use saasify_core::repository::{MembershipRepository, ProjectRepository, TenantRepository};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChartPoint {
    pub name: &'static str,
    pub value: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_tenants: u64,
    pub active_tenants: u64,
    pub total_projects: u64,
    pub chart_data: Vec<ChartPoint>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantStats {
    pub active_projects: u64,
    pub archived_projects: u64,
    pub members_count: u64,
    pub chart_data: Vec<ChartPoint>,
}

#[derive(Clone)]
pub struct StatsService<T, P, M>
where
    T: TenantRepository,
    P: ProjectRepository,
    M: MembershipRepository,
{
    tenants: T,
    projects: P,
    memberships: M,
}

impl<T, P, M> StatsService<T, P, M>
where
    T: TenantRepository,
    P: ProjectRepository,
    M: MembershipRepository,
{
    pub fn new(tenants: T, projects: P, memberships: M) -> Self {
        Self {
            tenants,
            projects,
            memberships,
        }
    }

    pub async fn platform(&self) -> SaasifyResult<PlatformStats> {
        let (total_tenants, active_tenants, total_projects) = tokio::try_join!(
            self.tenants.count(None, None),
            self.tenants.count(None, Some(TenantStatus::Active)),
            self.projects.count_all(),
        )?;

        Ok(PlatformStats {
            total_tenants,
            active_tenants,
            total_projects,
            chart_data: vec![
                ChartPoint {
                    name: "Tenants",
                    value: total_tenants,
                },
                ChartPoint {
                    name: "Active Tenants",
                    value: active_tenants,
                },
                ChartPoint {
                    name: "Projects",
                    value: total_projects,
                },
            ],
        })
    }

    pub async fn tenant(&self, tenant_id: Uuid) -> SaasifyResult<TenantStats> {
        let (active_projects, archived_projects, members_count) = tokio::try_join!(
            self.projects.count(tenant_id, Some(ProjectStatus::Active)),
            self.projects.count(tenant_id, Some(ProjectStatus::Archived)),
            self.memberships.count_for_tenant(tenant_id),
        )?;

        Ok(TenantStats {
            active_projects,
            archived_projects,
            members_count,
            chart_data: vec![
                ChartPoint {
                    name: "Active",
                    value: active_projects,
                },
                ChartPoint {
                    name: "Archived",
                    value: archived_projects,
                },
            ],
        })
    }
}
