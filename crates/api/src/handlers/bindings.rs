use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::{
    error::ApiResult,
    identity::Identity,
    response::{created, no_content, success},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct BindRequest {
    pub professional_id: String,
    pub display_name: String,
    pub hub_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UnbindRequest {
    pub professional_id: String,
}

pub async fn bind_professional(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Json(request): Json<BindRequest>,
) -> ApiResult<impl IntoResponse> {
    let binding = state
        .binding_service
        .bind(
            &ctx,
            &request.professional_id,
            &request.display_name,
            request.hub_id,
        )
        .await?;
    Ok(created(binding))
}

pub async fn unbind_professional(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Json(request): Json<UnbindRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .binding_service
        .unbind(&ctx, &request.professional_id)
        .await?;
    Ok(no_content())
}

pub async fn rebind_professional(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Json(request): Json<BindRequest>,
) -> ApiResult<impl IntoResponse> {
    let binding = state
        .binding_service
        .rebind(
            &ctx,
            &request.professional_id,
            &request.display_name,
            request.hub_id,
        )
        .await?;
    Ok(success(binding))
}

pub async fn list_bindings(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(hub_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let bindings = state.binding_service.list_by_hub(&ctx, hub_id).await?;
    Ok(success(bindings))
}
