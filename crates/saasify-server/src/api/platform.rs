//! Platform-admin handlers.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use saasify_core::models::tenant::TenantStatus;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::{ListParams, created, credentials, ok, parse_body, parse_id};
use crate::app::AppState;
use crate::service::TenantInput;

#[derive(Debug, Deserialize)]
struct StatusChange {
    status: TenantStatus,
}

pub async fn list_tenants(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .guard
        .require_platform_admin(&credentials(&headers, &state))
        .await?;
    let listing = state
        .tenants
        .list(params.search(), params.pagination())
        .await?;
    Ok(ok(listing))
}

pub async fn create_tenant(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let admin = state
        .guard
        .require_platform_admin(&credentials(&headers, &state))
        .await?;
    let input: TenantInput = parse_body(&body)?;
    let tenant = state.tenants.create(admin.user.id, input).await?;
    Ok(created(tenant))
}

pub async fn set_tenant_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(tenant_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let admin = state
        .guard
        .require_platform_admin(&credentials(&headers, &state))
        .await?;
    let tenant_id = parse_id(&tenant_id)?;
    let change: StatusChange = parse_body(&body)?;
    let tenant = state
        .tenants
        .set_status(admin.user.id, tenant_id, change.status)
        .await?;
    Ok(ok(tenant))
}

pub async fn platform_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    state
        .guard
        .require_platform_admin(&credentials(&headers, &state))
        .await?;
    Ok(ok(state.stats.platform().await?))
}
