//! Saved project-list views, private to one user within one tenant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::project::ProjectStatus;

/// The project-list filters a view restores.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SavedViewFilters {
    pub status: Option<ProjectStatus>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedView {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub filters: SavedViewFilters,
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateSavedView {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub filters: SavedViewFilters,
    pub is_pinned: bool,
}
