use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::{
    error::ApiResult,
    identity::Identity,
    response::{no_content, success},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct QueueActionRequest {
    pub professional_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    pub professional_id: String,
    pub note: Option<String>,
}

pub async fn list_queue(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(hub_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let view = state.queue_service.list_queue(&ctx, hub_id).await?;
    Ok(success(view))
}

pub async fn dispatch(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(hub_id): Path<i64>,
    Json(request): Json<QueueActionRequest>,
) -> ApiResult<impl IntoResponse> {
    let entry = state
        .queue_service
        .dispatch(&ctx, hub_id, &request.professional_id)
        .await?;
    Ok(success(entry))
}

pub async fn dispatch_priority(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(hub_id): Path<i64>,
    Json(request): Json<QueueActionRequest>,
) -> ApiResult<impl IntoResponse> {
    let entry = state
        .queue_service
        .dispatch_priority(&ctx, hub_id, &request.professional_id)
        .await?;
    Ok(success(entry))
}

pub async fn move_to_back(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(hub_id): Path<i64>,
    Json(request): Json<QueueActionRequest>,
) -> ApiResult<impl IntoResponse> {
    let entry = state
        .queue_service
        .move_to_back(&ctx, hub_id, &request.professional_id)
        .await?;
    Ok(success(entry))
}

pub async fn remove_from_queue(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(hub_id): Path<i64>,
    Json(request): Json<RemoveRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .queue_service
        .remove(&ctx, hub_id, &request.professional_id, request.note)
        .await?;
    Ok(no_content())
}
