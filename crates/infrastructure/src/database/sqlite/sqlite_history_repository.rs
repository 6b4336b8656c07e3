use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use despacho_domain::entities::{HistoryEvent, NewHistoryEvent};
use despacho_domain::repositories::{DailyStats, HistoryRepository, HourlyCount, ProfessionalRanking};
use despacho_errors::DispatchResult;
use sqlx::{Row, SqlitePool};
use tracing::instrument;

pub struct SqliteHistoryRepository {
    pool: SqlitePool,
}

const EVENT_COLUMNS: &str = "id, hub_id, hub_name, professional_id, display_name, action, \
     wait_minutes, en_route_minutes, note, admin_id, occurred_at";

impl SqliteHistoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_event(row: &sqlx::sqlite::SqliteRow) -> DispatchResult<HistoryEvent> {
        Ok(HistoryEvent {
            id: row.try_get("id")?,
            hub_id: row.try_get("hub_id")?,
            hub_name: row.try_get("hub_name")?,
            professional_id: row.try_get("professional_id")?,
            display_name: row.try_get("display_name")?,
            action: row.try_get("action")?,
            wait_minutes: row.try_get("wait_minutes")?,
            en_route_minutes: row.try_get("en_route_minutes")?,
            note: row.try_get("note")?,
            admin_id: row.try_get("admin_id")?,
            occurred_at: row.try_get("occurred_at")?,
        })
    }

    fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
        (start, start + Duration::days(1))
    }
}

#[async_trait]
impl HistoryRepository for SqliteHistoryRepository {
    #[instrument(skip(self, event), fields(
        hub_id = %event.hub_id,
        professional_id = %event.professional_id,
        action = %event.action.as_str(),
    ))]
    async fn append(&self, event: &NewHistoryEvent) -> DispatchResult<HistoryEvent> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO history_events
                (hub_id, hub_name, professional_id, display_name, action,
                 wait_minutes, en_route_minutes, note, admin_id, occurred_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {EVENT_COLUMNS}
            "#,
        ))
        .bind(event.hub_id)
        .bind(&event.hub_name)
        .bind(&event.professional_id)
        .bind(&event.display_name)
        .bind(event.action)
        .bind(event.wait_minutes)
        .bind(event.en_route_minutes)
        .bind(&event.note)
        .bind(&event.admin_id)
        .bind(event.occurred_at)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_event(&row)
    }

    async fn list(
        &self,
        hub_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> DispatchResult<Vec<HistoryEvent>> {
        let rows = sqlx::query(&format!(
            "SELECT {EVENT_COLUMNS} FROM history_events
             WHERE hub_id = $1 AND occurred_at >= $2 AND occurred_at < $3
             ORDER BY occurred_at DESC
             LIMIT $4 OFFSET $5",
        ))
        .bind(hub_id)
        .bind(from)
        .bind(to)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_event).collect()
    }

    async fn count(
        &self,
        hub_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DispatchResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total FROM history_events
             WHERE hub_id = $1 AND occurred_at >= $2 AND occurred_at < $3",
        )
        .bind(hub_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("total")?)
    }

    #[instrument(skip(self))]
    async fn daily_stats(&self, hub_id: i64, date: NaiveDate) -> DispatchResult<DailyStats> {
        let (from, to) = Self::day_bounds(date);

        let row = sqlx::query(
            r#"
            SELECT
                SUM(CASE WHEN action = 'entrada' THEN 1 ELSE 0 END) AS entrances,
                SUM(CASE WHEN action = 'enviado_rota' THEN 1 ELSE 0 END) AS dispatches,
                SUM(CASE WHEN action = 'enviado_rota_unica' THEN 1 ELSE 0 END) AS single_ride_dispatches,
                SUM(CASE WHEN action = 'retorno' THEN 1 ELSE 0 END) AS returns,
                SUM(CASE WHEN action = 'retorno_prioridade' THEN 1 ELSE 0 END) AS priority_returns,
                SUM(CASE WHEN action = 'removido' THEN 1 ELSE 0 END) AS removals,
                SUM(CASE WHEN action = 'saida_voluntaria' THEN 1 ELSE 0 END) AS voluntary_exits,
                AVG(CASE WHEN action IN ('enviado_rota', 'enviado_rota_unica')
                    THEN wait_minutes END) AS avg_wait_minutes,
                AVG(CASE WHEN action IN ('retorno', 'retorno_prioridade')
                    THEN en_route_minutes END) AS avg_en_route_minutes
            FROM history_events
            WHERE hub_id = $1 AND occurred_at >= $2 AND occurred_at < $3
            "#,
        )
        .bind(hub_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(DailyStats {
            hub_id,
            date,
            entrances: row.try_get::<Option<i64>, _>("entrances")?.unwrap_or(0),
            dispatches: row.try_get::<Option<i64>, _>("dispatches")?.unwrap_or(0),
            single_ride_dispatches: row
                .try_get::<Option<i64>, _>("single_ride_dispatches")?
                .unwrap_or(0),
            returns: row.try_get::<Option<i64>, _>("returns")?.unwrap_or(0),
            priority_returns: row
                .try_get::<Option<i64>, _>("priority_returns")?
                .unwrap_or(0),
            removals: row.try_get::<Option<i64>, _>("removals")?.unwrap_or(0),
            voluntary_exits: row
                .try_get::<Option<i64>, _>("voluntary_exits")?
                .unwrap_or(0),
            avg_wait_minutes: row.try_get("avg_wait_minutes")?,
            avg_en_route_minutes: row.try_get("avg_en_route_minutes")?,
        })
    }

    async fn ranking(
        &self,
        hub_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DispatchResult<Vec<ProfessionalRanking>> {
        let rows = sqlx::query(
            r#"
            SELECT professional_id, display_name,
                   COUNT(*) AS dispatches,
                   AVG(wait_minutes) AS avg_wait_minutes
            FROM history_events
            WHERE hub_id = $1 AND occurred_at >= $2 AND occurred_at < $3
              AND action IN ('enviado_rota', 'enviado_rota_unica')
            GROUP BY professional_id, display_name
            ORDER BY dispatches DESC, avg_wait_minutes ASC
            "#,
        )
        .bind(hub_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(ProfessionalRanking {
                    professional_id: row.try_get("professional_id")?,
                    display_name: row.try_get("display_name")?,
                    dispatches: row.try_get("dispatches")?,
                    avg_wait_minutes: row.try_get("avg_wait_minutes")?,
                })
            })
            .collect()
    }

    async fn hourly_distribution(
        &self,
        hub_id: i64,
        date: NaiveDate,
    ) -> DispatchResult<Vec<HourlyCount>> {
        let (from, to) = Self::day_bounds(date);

        let rows = sqlx::query(
            r#"
            SELECT CAST(strftime('%H', occurred_at) AS INTEGER) AS hour,
                   COUNT(*) AS entrances
            FROM history_events
            WHERE hub_id = $1 AND occurred_at >= $2 AND occurred_at < $3
              AND action = 'entrada'
            GROUP BY hour
            ORDER BY hour
            "#,
        )
        .bind(hub_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(HourlyCount {
                    hour: row.try_get::<i64, _>("hour")? as u32,
                    entrances: row.try_get("entrances")?,
                })
            })
            .collect()
    }
}
