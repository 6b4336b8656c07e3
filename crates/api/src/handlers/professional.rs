use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;

use crate::{
    error::ApiResult,
    identity::Identity,
    response::{no_content, success},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct EnterRequest {
    pub latitude: f64,
    pub longitude: f64,
}

pub async fn enter_queue(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Json(request): Json<EnterRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state
        .queue_service
        .enter(&ctx, request.latitude, request.longitude)
        .await?;
    Ok(success(outcome))
}

pub async fn exit_queue(
    State(state): State<AppState>,
    Identity(ctx): Identity,
) -> ApiResult<impl IntoResponse> {
    state.queue_service.exit(&ctx).await?;
    Ok(no_content())
}

pub async fn my_position(
    State(state): State<AppState>,
    Identity(ctx): Identity,
) -> ApiResult<impl IntoResponse> {
    let view = state.queue_service.my_position(&ctx).await?;
    Ok(success(view))
}

pub async fn which_hub(
    State(state): State<AppState>,
    Identity(ctx): Identity,
) -> ApiResult<impl IntoResponse> {
    let status = state.queue_service.which_hub(&ctx).await?;
    Ok(success(status))
}
