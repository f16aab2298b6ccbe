//! Per-request tenant resolution outcome.
//!
//! A [`TenantContext`] is derived, never persisted. It is recomputed for
//! every request from the selection token, the caller and the stored
//! tenant/membership records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::membership::TenantRole;
use super::tenant::Tenant;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TenantContextStatus {
    Ok,
    MissingTenant,
    InvalidTenant,
    TenantNotFound,
    TenantSuspended,
    NotAMember,
}

impl TenantContextStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::MissingTenant => "missing_tenant",
            Self::InvalidTenant => "invalid_tenant",
            Self::TenantNotFound => "tenant_not_found",
            Self::TenantSuspended => "tenant_suspended",
            Self::NotAMember => "not_a_member",
        }
    }

    /// Message shown to the caller for a failed resolution.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Ok => None,
            Self::MissingTenant => Some("No tenant selected."),
            Self::InvalidTenant => Some("Invalid tenant id in cookie."),
            Self::TenantNotFound => Some("Tenant not found."),
            Self::TenantSuspended => Some("Tenant is suspended."),
            Self::NotAMember => Some("User is not a member of this tenant."),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TenantContext {
    pub ok: bool,
    pub status: TenantContextStatus,
    pub tenant_id: Option<Uuid>,
    pub tenant: Option<Tenant>,
    /// `None` when resolution failed or no user was supplied.
    pub role: Option<TenantRole>,
    /// Where a UI boundary should send the caller to recover.
    pub redirect_to: Option<String>,
    pub message: Option<String>,
}

impl TenantContext {
    /// A failed resolution pointing back at the tenant-selection flow.
    pub fn failure(
        status: TenantContextStatus,
        tenant_id: Option<Uuid>,
        tenant: Option<Tenant>,
        redirect_to: &str,
    ) -> Self {
        Self {
            ok: false,
            status,
            tenant_id,
            tenant,
            role: None,
            redirect_to: Some(redirect_to.to_string()),
            message: status.message().map(str::to_string),
        }
    }

    /// A successful resolution. `role` is `None` for the existence-only check.
    pub fn resolved(tenant: Tenant, role: Option<TenantRole>) -> Self {
        Self {
            ok: true,
            status: TenantContextStatus::Ok,
            tenant_id: Some(tenant.id),
            tenant: Some(tenant),
            role,
            redirect_to: None,
            message: None,
        }
    }
}
