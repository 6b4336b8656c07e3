use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use despacho_domain::entities::NewHub;
use serde::Deserialize;

use crate::{
    error::ApiResult,
    identity::Identity,
    response::{created, no_content, success},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateHubRequest {
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct UpdateHubRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_meters: Option<f64>,
    pub active: Option<bool>,
}

pub async fn create_hub(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Json(request): Json<CreateHubRequest>,
) -> ApiResult<impl IntoResponse> {
    let hub = state
        .hub_service
        .create(
            &ctx,
            NewHub {
                name: request.name,
                address: request.address,
                latitude: request.latitude,
                longitude: request.longitude,
                radius_meters: request.radius_meters,
                active: request.active,
            },
        )
        .await?;
    Ok(created(hub))
}

pub async fn list_hubs(
    State(state): State<AppState>,
    Identity(ctx): Identity,
) -> ApiResult<impl IntoResponse> {
    let hubs = state.hub_service.list(&ctx).await?;
    Ok(success(hubs))
}

pub async fn get_hub(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let hub = state.hub_service.get(&ctx, id).await?;
    Ok(success(hub))
}

pub async fn update_hub(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<i64>,
    Json(request): Json<UpdateHubRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut hub = state.hub_service.get(&ctx, id).await?;
    if let Some(name) = request.name {
        hub.name = name;
    }
    if let Some(address) = request.address {
        hub.address = address;
    }
    if let Some(latitude) = request.latitude {
        hub.latitude = latitude;
    }
    if let Some(longitude) = request.longitude {
        hub.longitude = longitude;
    }
    if let Some(radius_meters) = request.radius_meters {
        hub.radius_meters = radius_meters;
    }
    if let Some(active) = request.active {
        hub.active = active;
    }

    let updated = state.hub_service.update(&ctx, hub).await?;
    Ok(success(updated))
}

pub async fn delete_hub(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    state.hub_service.delete(&ctx, id).await?;
    Ok(no_content())
}
