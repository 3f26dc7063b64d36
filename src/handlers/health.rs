use axum::Json;
use serde_json::{json, Value};

/// Liveness probe. No dependencies are touched.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
