use axum::Json;
use serde_json::{json, Value as JsonValue};

/// Liveness probe for the hosting platform.
pub async fn health() -> Json<JsonValue> {
    Json(json!({ "status": "ok" }))
}
