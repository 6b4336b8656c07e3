use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    identity::Identity,
    response::success,
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// Defaults to today (UTC).
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("data inválida: {raw} (esperado AAAA-MM-DD)")))
}

pub async fn hub_stats(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(hub_id): Path<i64>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<impl IntoResponse> {
    let date = match &query.date {
        Some(raw) => parse_date(raw)?,
        None => Utc::now().date_naive(),
    };

    let view = state.reports_service.stats(&ctx, hub_id, date).await?;
    Ok(success(view))
}

pub async fn hub_history(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(hub_id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<impl IntoResponse> {
    let to = query.to.unwrap_or_else(Utc::now);
    let from = query.from.unwrap_or(to - chrono::Duration::days(7));
    let page = query.page.unwrap_or(1);
    let page_size = query.page_size.unwrap_or(50);

    let history = state
        .reports_service
        .history(&ctx, hub_id, from, to, page, page_size)
        .await?;
    Ok(success(history))
}
