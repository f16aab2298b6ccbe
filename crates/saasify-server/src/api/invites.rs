//! Invite handlers.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use saasify_core::models::invite::InviteStatus;
use serde::Deserialize;

use crate::api::error::{ApiError, api_validation_error};
use crate::api::{
    ListParams, admin_scope, created, credentials, member_scope, ok, parse_body, parse_id,
};
use crate::app::AppState;
use crate::service::InviteInput;

#[derive(Debug, Deserialize)]
struct AcceptInvite {
    #[serde(default)]
    token: String,
}

pub async fn list_invites(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(tenant_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = member_scope(&state, &headers, &tenant_id).await?;
    let status = params
        .status()
        .map(|raw| InviteStatus::parse(raw).ok_or_else(|| api_validation_error("Invalid status", None)))
        .transpose()?;
    let page = state
        .invites
        .list(scope.tenant_id, status, params.pagination())
        .await?;
    Ok(ok(page))
}

pub async fn create_invite(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(tenant_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let scope = admin_scope(&state, &headers, &tenant_id).await?;
    let input: InviteInput = parse_body(&body)?;
    let invite = state
        .invites
        .create(scope.tenant_id, scope.user.id, input)
        .await?;
    Ok(created(invite))
}

pub async fn revoke_invite(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((tenant_id, invite_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = admin_scope(&state, &headers, &tenant_id).await?;
    let invite_id = parse_id(&invite_id)?;
    let invite = state
        .invites
        .revoke(scope.tenant_id, scope.user.id, invite_id)
        .await?;
    Ok(ok(invite))
}

/// Accepting needs only a signed-in caller; the tenant comes from the
/// invite, not from the selection cookie.
pub async fn accept_invite(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let auth = state
        .guard
        .require_auth(&credentials(&headers, &state))
        .await?;
    let input: AcceptInvite = parse_body(&body)?;
    let membership = state.invites.accept(&auth.user, &input.token).await?;
    Ok(ok(membership))
}
