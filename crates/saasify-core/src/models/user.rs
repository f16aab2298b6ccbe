//! User domain model.
//!
//! Local users mirror identities issued by the external identity provider.
//! They are created or refreshed on every successful sign-in and are never
//! deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlatformRole {
    PlatformAdmin,
    #[default]
    User,
}

impl PlatformRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlatformAdmin => "platform_admin",
            Self::User => "user",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "platform_admin" => Some(Self::PlatformAdmin),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    /// Identity-provider subject; unique across all users.
    pub external_id: String,
    pub email: String,
    /// Display name (first and last name joined).
    pub name: String,
    pub avatar_url: String,
    pub platform_role: PlatformRole,
    pub last_signed_in_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_platform_admin(&self) -> bool {
        self.platform_role == PlatformRole::PlatformAdmin
    }
}

/// Profile fields refreshed by the sign-in / webhook upsert.
///
/// Carries no platform role; the upsert never writes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertUser {
    pub external_id: String,
    pub email: String,
    pub name: String,
    pub avatar_url: String,
}
