//! Tenant dashboard and audit log handlers.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;

use crate::api::error::ApiError;
use crate::api::{ListParams, member_scope, ok};
use crate::app::AppState;

pub async fn list_audit_logs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(tenant_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = member_scope(&state, &headers, &tenant_id).await?;
    let page = state
        .audit
        .list(scope.tenant_id, params.pagination())
        .await?;
    Ok(ok(page))
}

pub async fn tenant_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(tenant_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = member_scope(&state, &headers, &tenant_id).await?;
    let stats = state.stats.tenant(scope.tenant_id).await?;
    Ok(ok(stats))
}
