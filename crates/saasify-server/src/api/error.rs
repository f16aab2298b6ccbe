//! API error envelope and the mapping from domain errors.
//!
//! Every failure leaves the server as
//! `{"ok": false, "error": {"code", "message", "fieldErrors"?}}`.
//! All denial reasons collapse into one `FORBIDDEN` body; the specific
//! reason is only logged. Internal failures are logged in full and
//! answered with a generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use saasify_core::error::{FieldErrors, SaasifyError};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    ok: bool,
    error: ErrorBody,
}

/// Structured API error returned by handlers.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let envelope = ErrorEnvelope {
            ok: false,
            error: self.body,
        };
        (self.status, Json(envelope)).into_response()
    }
}

fn api_error(status: StatusCode, code: &str, message: &str) -> ApiError {
    ApiError {
        status,
        body: ErrorBody {
            code: code.to_string(),
            message: message.to_string(),
            field_errors: None,
        },
    }
}

pub fn api_unauthorized() -> ApiError {
    api_error(StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", "Sign in required")
}

pub fn api_forbidden() -> ApiError {
    api_error(StatusCode::FORBIDDEN, "FORBIDDEN", "Access denied")
}

pub fn api_validation_error(message: &str, field_errors: Option<FieldErrors>) -> ApiError {
    let mut err = api_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message);
    err.body.field_errors = field_errors.filter(|f| !f.is_empty());
    err
}

pub fn api_not_found(message: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, "NOT_FOUND", message)
}

pub fn api_conflict(message: &str) -> ApiError {
    api_error(StatusCode::CONFLICT, "CONFLICT", message)
}

pub fn api_internal() -> ApiError {
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "Something went wrong",
    )
}

fn capitalized(entity: &str) -> String {
    let mut chars = entity.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl From<SaasifyError> for ApiError {
    fn from(err: SaasifyError) -> Self {
        match err {
            SaasifyError::Unauthenticated => api_unauthorized(),
            SaasifyError::AccessDenied { .. } => api_forbidden(),
            SaasifyError::Validation {
                message,
                field_errors,
            } => api_validation_error(&message, Some(field_errors)),
            SaasifyError::NotFound { entity, .. } => {
                api_not_found(&format!("{} not found", capitalized(&entity)))
            }
            SaasifyError::AlreadyExists { entity } => {
                api_conflict(&format!("{} already exists", capitalized(&entity)))
            }
            SaasifyError::Database(_) | SaasifyError::Crypto(_) | SaasifyError::Internal(_) => {
                tracing::error!(error = %err, "request failed");
                api_internal()
            }
        }
    }
}
