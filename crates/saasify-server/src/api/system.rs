use axum::response::IntoResponse;
use serde_json::json;

use crate::api::ok;

pub async fn health() -> impl IntoResponse {
    ok(json!({ "status": "ok" }))
}
