use axum::Json;
use serde_json::{json, Value};

/// Handles GET /health requests.
pub async fn get_health() -> Json<Value> {
	Json(json!({"status": "ok"}))
}
