//! Project handlers.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use saasify_core::models::project::{ProjectFilter, ProjectStatus};

use crate::api::error::{ApiError, api_validation_error};
use crate::api::{ListParams, admin_scope, created, member_scope, ok, parse_body, parse_id};
use crate::app::AppState;
use crate::service::{ProjectInput, ProjectPatch};

pub async fn list_projects(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(tenant_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = member_scope(&state, &headers, &tenant_id).await?;

    let status = match params.status() {
        None | Some("all") => None,
        Some(raw) => Some(ProjectStatus::parse(raw).ok_or_else(|| {
            api_validation_error("Invalid status", None)
        })?),
    };
    let filter = ProjectFilter {
        status,
        search: params.search().map(str::to_string),
    };

    let page = state
        .projects
        .list(scope.tenant_id, filter, params.pagination())
        .await?;
    Ok(ok(page))
}

pub async fn create_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(tenant_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let scope = admin_scope(&state, &headers, &tenant_id).await?;
    let input: ProjectInput = parse_body(&body)?;
    let project = state
        .projects
        .create(scope.tenant_id, scope.user.id, input)
        .await?;
    Ok(created(project))
}

pub async fn get_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((tenant_id, project_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = member_scope(&state, &headers, &tenant_id).await?;
    let project_id = parse_id(&project_id)?;
    let project = state.projects.get(scope.tenant_id, project_id).await?;
    Ok(ok(project))
}

pub async fn update_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((tenant_id, project_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let scope = admin_scope(&state, &headers, &tenant_id).await?;
    let project_id = parse_id(&project_id)?;
    let patch: ProjectPatch = parse_body(&body)?;
    let project = state
        .projects
        .update(scope.tenant_id, project_id, scope.user.id, patch)
        .await?;
    Ok(ok(project))
}

pub async fn delete_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((tenant_id, project_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = admin_scope(&state, &headers, &tenant_id).await?;
    let project_id = parse_id(&project_id)?;
    let project = state
        .projects
        .delete(scope.tenant_id, project_id, scope.user.id)
        .await?;
    Ok(ok(project))
}

pub async fn restore_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((tenant_id, project_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = admin_scope(&state, &headers, &tenant_id).await?;
    let project_id = parse_id(&project_id)?;
    let project = state
        .projects
        .restore(scope.tenant_id, project_id, scope.user.id)
        .await?;
    Ok(ok(project))
}
