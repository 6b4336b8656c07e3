use axum::response::IntoResponse;
use serde_json::json;

use crate::response::success;

pub async fn health_check() -> impl IntoResponse {
    success(json!({
        "status": "ok",
        "service": "despacho",
    }))
}
