use axum::{extract::State, response::IntoResponse};
use serde_json::json;

use crate::{error::ApiResult, identity::Identity, response::success, routes::AppState};

pub async fn drain_notification(
    State(state): State<AppState>,
    Identity(ctx): Identity,
) -> ApiResult<impl IntoResponse> {
    let notification = state.mailbox_service.drain(&ctx).await?;
    Ok(success(notification))
}

pub async fn ack_notification(
    State(state): State<AppState>,
    Identity(ctx): Identity,
) -> ApiResult<impl IntoResponse> {
    let acked = state.mailbox_service.ack(&ctx).await?;
    Ok(success(json!({ "acknowledged": acked })))
}
