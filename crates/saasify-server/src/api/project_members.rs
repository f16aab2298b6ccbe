//! Per-project access handlers. Tenant admins only.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use saasify_core::models::project_access::ProjectAccessRole;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::{admin_scope, ok, parse_body, parse_id};
use crate::app::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GrantRequest {
    user_id: String,
    role: ProjectAccessRole,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RevokeRequest {
    user_id: String,
}

pub async fn list_project_members(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((tenant_id, project_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = admin_scope(&state, &headers, &tenant_id).await?;
    let project_id = parse_id(&project_id)?;
    let grants = state.project_access.list(scope.tenant_id, project_id).await?;
    Ok(ok(grants))
}

pub async fn assign_project_member(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((tenant_id, project_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let scope = admin_scope(&state, &headers, &tenant_id).await?;
    let project_id = parse_id(&project_id)?;
    let request: GrantRequest = parse_body(&body)?;
    let user_id = parse_id(&request.user_id)?;
    let grant = state
        .project_access
        .assign(scope.tenant_id, scope.user.id, project_id, user_id, request.role)
        .await?;
    Ok(ok(grant))
}

pub async fn remove_project_member(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((tenant_id, project_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let scope = admin_scope(&state, &headers, &tenant_id).await?;
    let project_id = parse_id(&project_id)?;
    let request: RevokeRequest = parse_body(&body)?;
    let user_id = parse_id(&request.user_id)?;
    let grant = state
        .project_access
        .remove(scope.tenant_id, scope.user.id, project_id, user_id)
        .await?;
    Ok(ok(grant))
}
