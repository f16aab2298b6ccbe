//! HTTP handlers.
//!
//! Tenant routes always run in the same order: guard, path tenant check,
//! id and payload validation, then the service call. Bodies are read as
//! raw bytes and parsed only after the guard has passed, so an anonymous
//! caller gets `401` no matter what they sent.

pub mod error;
pub mod invites;
pub mod me;
pub mod members;
pub mod platform;
pub mod project_members;
pub mod projects;
pub mod saved_views;
pub mod system;
pub mod tenant;
pub mod webhooks;

use axum::Json;
use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode, header};
use saasify_auth::guard::{RequestCredentials, TenantMembership, ensure_tenant_id_matches_param};
use saasify_auth::selection::read_selection;
use saasify_core::repository::Pagination;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::{ApiError, api_validation_error};
use crate::app::AppState;

#[derive(Debug, Serialize)]
pub struct ApiOk<T> {
    pub ok: bool,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Json<ApiOk<T>> {
    Json(ApiOk { ok: true, data })
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiOk<T>>) {
    (StatusCode::CREATED, ok(data))
}

/// Common list query parameters. Unparseable numbers fall back to the
/// defaults instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
}

impl ListParams {
    pub fn pagination(&self) -> Pagination {
        let number =
            |raw: &Option<String>| -> Option<i64> { raw.as_deref()?.trim().parse().ok() };
        Pagination::clamped(number(&self.offset), number(&self.limit))
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Session token from `Authorization: Bearer` and tenant selection from
/// the selection cookie.
pub fn credentials(headers: &HeaderMap, state: &AppState) -> RequestCredentials {
    let session_token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string());
    let tenant_selection = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|cookies| read_selection(&state.auth, cookies))
        .map(str::to_string);
    RequestCredentials {
        session_token,
        tenant_selection,
    }
}

/// `require_tenant_membership` plus the path tenant check.
pub async fn member_scope(
    state: &AppState,
    headers: &HeaderMap,
    tenant_param: &str,
) -> Result<TenantMembership, ApiError> {
    let creds = credentials(headers, state);
    let scope = state.guard.require_tenant_membership(&creds).await?;
    ensure_tenant_id_matches_param(tenant_param, scope.tenant_id)?;
    Ok(scope)
}

/// `require_tenant_admin` plus the path tenant check.
pub async fn admin_scope(
    state: &AppState,
    headers: &HeaderMap,
    tenant_param: &str,
) -> Result<TenantMembership, ApiError> {
    let creds = credentials(headers, state);
    let scope = state.guard.require_tenant_admin(&creds).await?;
    ensure_tenant_id_matches_param(tenant_param, scope.tenant_id)?;
    Ok(scope)
}

pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| api_validation_error("Invalid id", None))
}

pub fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "rejected request body");
        api_validation_error("Invalid input", None)
    })
}
