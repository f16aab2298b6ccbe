//! Membership domain model: the (tenant, user, role) link.
//!
//! Memberships are never physically deleted. Removal flips the status to
//! [`MembershipStatus::Removed`], and removed rows are invisible to every
//! lookup used for authorization or member listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TenantRole {
    TenantAdmin,
    TenantUser,
}

impl TenantRole {
    /// Privilege rank; higher ranks include every lower-ranked capability.
    pub fn rank(&self) -> u8 {
        match self {
            Self::TenantAdmin => 2,
            Self::TenantUser => 1,
        }
    }

    /// Whether this role satisfies a `minimum` requirement.
    pub fn satisfies(&self, minimum: TenantRole) -> bool {
        self.rank() >= minimum.rank()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TenantAdmin => "tenant_admin",
            Self::TenantUser => "tenant_user",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tenant_admin" => Some(Self::TenantAdmin),
            "tenant_user" => Some(Self::TenantUser),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Active,
    Invited,
    Removed,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Invited => "invited",
            Self::Removed => "removed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "invited" => Some(Self::Invited),
            "removed" => Some(Self::Removed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub role: TenantRole,
    pub status: MembershipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub role: TenantRole,
    /// Defaults to [`MembershipStatus::Active`].
    pub status: Option<MembershipStatus>,
}
