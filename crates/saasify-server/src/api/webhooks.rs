//! Identity-provider webhook.
//!
//! User create and update events feed the same upsert as interactive
//! sign-in. Nothing in the payload is trusted before the signature checks
//! out.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use chrono::Utc;
use saasify_auth::AuthError;
use saasify_auth::webhook::{
    HEADER_ID, HEADER_SIGNATURE, HEADER_TIMESTAMP, WebhookEvent, WebhookHeaders,
    parse_webhook_event, verify_webhook,
};
use saasify_core::error::SaasifyError;
use serde_json::json;
use tracing::{info, warn};

use crate::api::error::{ApiError, ErrorBody};
use crate::api::ok;
use crate::app::AppState;

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn rejected(err: AuthError) -> ApiError {
    match err {
        AuthError::WebhookSignature(reason) => {
            warn!(%reason, "Webhook signature rejected");
            ApiError {
                status: StatusCode::UNAUTHORIZED,
                body: ErrorBody {
                    code: "UNAUTHENTICATED".into(),
                    message: "Invalid signature".into(),
                    field_errors: None,
                },
            }
        }
        other => SaasifyError::from(other).into(),
    }
}

pub async fn identity_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let signature = WebhookHeaders {
        id: header(&headers, HEADER_ID),
        timestamp: header(&headers, HEADER_TIMESTAMP),
        signature: header(&headers, HEADER_SIGNATURE),
    };
    verify_webhook(&state.auth, signature, &body, Utc::now().timestamp()).map_err(rejected)?;

    match parse_webhook_event(&body).map_err(rejected)? {
        WebhookEvent::UserUpserted(identity) => {
            let user = state.guard.identities().ensure_local_user(identity).await?;
            info!(user_id = %user.id, "User synced from webhook");
        }
        WebhookEvent::UserDeleted { external_id } => {
            info!(?external_id, "Ignoring user deletion; local users are kept");
        }
        WebhookEvent::Ignored { kind } => {
            info!(%kind, "Ignoring webhook event");
        }
    }

    Ok(ok(json!({ "received": true })))
}
