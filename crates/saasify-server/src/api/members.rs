//! Tenant member handlers.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use saasify_core::models::membership::TenantRole;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::{admin_scope, member_scope, ok, parse_body, parse_id};
use crate::app::AppState;

#[derive(Debug, Deserialize)]
struct RoleChange {
    role: TenantRole,
}

pub async fn list_members(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(tenant_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = member_scope(&state, &headers, &tenant_id).await?;
    let members = state.members.list_members(scope.tenant_id).await?;
    Ok(ok(members))
}

pub async fn change_member_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((tenant_id, user_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let scope = admin_scope(&state, &headers, &tenant_id).await?;
    let user_id = parse_id(&user_id)?;
    let change: RoleChange = parse_body(&body)?;
    let membership = state
        .members
        .change_role(scope.tenant_id, scope.user.id, user_id, change.role)
        .await?;
    Ok(ok(membership))
}

pub async fn remove_member(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((tenant_id, user_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = admin_scope(&state, &headers, &tenant_id).await?;
    let user_id = parse_id(&user_id)?;
    let membership = state
        .members
        .remove(scope.tenant_id, scope.user.id, user_id)
        .await?;
    Ok(ok(membership))
}
