//! Caller-centric handlers: profile, tenant list and tenant selection.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::IntoResponse;
use saasify_auth::selection::{parse_tenant_selection, selection_cookie};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::{ApiError, api_internal};
use crate::api::{credentials, ok, parse_body};
use crate::app::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectTenant {
    #[serde(default)]
    tenant_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Selected {
    tenant_id: Uuid,
}

pub async fn current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let auth = state
        .guard
        .require_auth(&credentials(&headers, &state))
        .await?;
    Ok(ok(auth.user))
}

pub async fn my_tenants(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let auth = state
        .guard
        .require_auth(&credentials(&headers, &state))
        .await?;
    Ok(ok(state.members.my_tenants(auth.user.id).await?))
}

/// Point the selection cookie at a tenant.
///
/// Only the id's format is checked. Whether the caller may use the tenant
/// is decided by the resolver on every later request.
pub async fn select_tenant(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    state
        .guard
        .require_auth(&credentials(&headers, &state))
        .await?;
    let input: SelectTenant = parse_body(&body)?;
    let tenant_id = parse_tenant_selection(&input.tenant_id)?;

    let cookie = HeaderValue::from_str(&selection_cookie(&state.auth, tenant_id)).map_err(|e| {
        tracing::error!(error = %e, "selection cookie is not a valid header value");
        api_internal()
    })?;
    Ok(([(header::SET_COOKIE, cookie)], ok(Selected { tenant_id })))
}
