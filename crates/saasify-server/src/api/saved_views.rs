//! Saved view handlers. Any tenant member manages their own views.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::{created, member_scope, ok, parse_body, parse_id};
use crate::app::AppState;
use crate::service::SavedViewInput;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PinRequest {
    view_id: String,
    is_pinned: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest {
    view_id: String,
}

pub async fn list_saved_views(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(tenant_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = member_scope(&state, &headers, &tenant_id).await?;
    let views = state
        .saved_views
        .list(scope.tenant_id, scope.user.id)
        .await?;
    Ok(ok(views))
}

pub async fn create_saved_view(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(tenant_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let scope = member_scope(&state, &headers, &tenant_id).await?;
    let input: SavedViewInput = parse_body(&body)?;
    let view = state
        .saved_views
        .create(scope.tenant_id, scope.user.id, input)
        .await?;
    Ok(created(view))
}

pub async fn pin_saved_view(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(tenant_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let scope = member_scope(&state, &headers, &tenant_id).await?;
    let request: PinRequest = parse_body(&body)?;
    let view_id = parse_id(&request.view_id)?;
    let view = state
        .saved_views
        .set_pinned(scope.tenant_id, scope.user.id, view_id, request.is_pinned)
        .await?;
    Ok(ok(view))
}

pub async fn delete_saved_view(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(tenant_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let scope = member_scope(&state, &headers, &tenant_id).await?;
    let request: DeleteRequest = parse_body(&body)?;
    let view_id = parse_id(&request.view_id)?;
    let view = state
        .saved_views
        .delete(scope.tenant_id, scope.user.id, view_id)
        .await?;
    Ok(ok(view))
}
