use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::routes::AppState;

/// Prometheus exposition endpoint. 503 when no recorder is installed.
pub async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.prometheus {
        Some(handle) => (StatusCode::OK, handle.render()).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed")
            .into_response(),
    }
}
