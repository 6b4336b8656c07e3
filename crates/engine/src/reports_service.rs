use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use despacho_domain::entities::HistoryEvent;
use despacho_domain::policy::{self, Action};
use despacho_domain::repositories::{
    DailyStats, HistoryRepository, HourlyCount, HubRepository, ProfessionalRanking,
};
use despacho_domain::value_objects::ActorContext;
use despacho_errors::{DispatchError, DispatchResult};
use serde::Serialize;
use tracing::instrument;

/// Read-only reporting over the transition ledger.
pub struct ReportsService {
    hubs: Arc<dyn HubRepository>,
    history: Arc<dyn HistoryRepository>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsView {
    pub stats: DailyStats,
    pub ranking: Vec<ProfessionalRanking>,
    pub hourly: Vec<HourlyCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryPage {
    pub events: Vec<HistoryEvent>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

impl ReportsService {
    pub fn new(hubs: Arc<dyn HubRepository>, history: Arc<dyn HistoryRepository>) -> Self {
        Self { hubs, history }
    }

    async fn require_hub(&self, hub_id: i64) -> DispatchResult<()> {
        self.hubs
            .get_by_id(hub_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| DispatchError::hub_not_found(hub_id))
    }

    #[instrument(skip(self, ctx))]
    pub async fn stats(
        &self,
        ctx: &ActorContext,
        hub_id: i64,
        date: NaiveDate,
    ) -> DispatchResult<StatsView> {
        policy::ensure(ctx.role, Action::ViewReports)?;
        self.require_hub(hub_id).await?;

        let start = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
        let end = start + chrono::Duration::days(1);

        let stats = self.history.daily_stats(hub_id, date).await?;
        let ranking = self.history.ranking(hub_id, start, end).await?;
        let hourly = self.history.hourly_distribution(hub_id, date).await?;

        Ok(StatsView {
            stats,
            ranking,
            hourly,
        })
    }

    #[instrument(skip(self, ctx))]
    pub async fn history(
        &self,
        ctx: &ActorContext,
        hub_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        page: i64,
        page_size: i64,
    ) -> DispatchResult<HistoryPage> {
        policy::ensure(ctx.role, Action::ViewReports)?;
        self.require_hub(hub_id).await?;

        if page < 1 || page_size < 1 || page_size > 500 {
            return Err(DispatchError::validation_error(
                "page must be >= 1 and page_size in 1..=500",
            ));
        }
        if from >= to {
            return Err(DispatchError::validation_error(
                "history range start must precede its end",
            ));
        }

        let offset = (page - 1) * page_size;
        let events = self.history.list(hub_id, from, to, page_size, offset).await?;
        let total = self.history.count(hub_id, from, to).await?;

        Ok(HistoryPage {
            events,
            total,
            page,
            page_size,
        })
    }
}
