use async_trait::async_trait;
use chrono::{DateTime, Utc};
use despacho_domain::entities::{
    EntryStatus, NewQueueEntry, QueueEntry, POSITION_REASON_MOVED_TO_BACK,
};
use despacho_domain::repositories::QueueRepository;
use despacho_domain::value_objects::Coordinates;
use despacho_errors::{DispatchError, DispatchResult};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::{debug, instrument};

/// Queue store. Every mutation runs inside one transaction: the status
/// change and all implied position shifts commit together, so concurrent
/// readers never observe a gap or duplicate position.
pub struct SqliteQueueRepository {
    pool: SqlitePool,
}

const ENTRY_COLUMNS: &str = "id, hub_id, professional_id, display_name, status, position, \
     entered_at, dispatched_at, returned_at, checkin_latitude, checkin_longitude, \
     single_ride, original_position, position_reason";

impl SqliteQueueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> DispatchResult<QueueEntry> {
        Ok(QueueEntry {
            id: row.try_get("id")?,
            hub_id: row.try_get("hub_id")?,
            professional_id: row.try_get("professional_id")?,
            display_name: row.try_get("display_name")?,
            status: row.try_get("status")?,
            position: row.try_get("position")?,
            entered_at: row.try_get("entered_at")?,
            dispatched_at: row.try_get("dispatched_at")?,
            returned_at: row.try_get("returned_at")?,
            checkin_latitude: row.try_get("checkin_latitude")?,
            checkin_longitude: row.try_get("checkin_longitude")?,
            single_ride: row.try_get("single_ride")?,
            original_position: row.try_get("original_position")?,
            position_reason: row.try_get("position_reason")?,
        })
    }

    async fn fetch_entry(
        tx: &mut Transaction<'_, Sqlite>,
        entry_id: i64,
    ) -> DispatchResult<QueueEntry> {
        let row = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM queue_entries WHERE id = $1",
        ))
        .bind(entry_id)
        .fetch_optional(&mut **tx)
        .await?;

        match row {
            Some(row) => Self::row_to_entry(&row),
            None => Err(DispatchError::database_error(format!(
                "queue entry {entry_id} not found"
            ))),
        }
    }

    async fn max_waiting_position(
        tx: &mut Transaction<'_, Sqlite>,
        hub_id: i64,
    ) -> DispatchResult<i32> {
        let row = sqlx::query(
            "SELECT COALESCE(MAX(position), 0) AS max_position
             FROM queue_entries WHERE hub_id = $1 AND status = 'WAITING'",
        )
        .bind(hub_id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row.try_get("max_position")?)
    }

    /// Closes the gap a waiting entry left at `old_position`.
    async fn shift_down_after(
        tx: &mut Transaction<'_, Sqlite>,
        hub_id: i64,
        old_position: i32,
    ) -> DispatchResult<()> {
        sqlx::query(
            "UPDATE queue_entries SET position = position - 1
             WHERE hub_id = $1 AND status = 'WAITING' AND position > $2",
        )
        .bind(hub_id)
        .bind(old_position)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl QueueRepository for SqliteQueueRepository {
    async fn find_by_professional(
        &self,
        professional_id: &str,
    ) -> DispatchResult<Option<QueueEntry>> {
        let row = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM queue_entries WHERE professional_id = $1",
        ))
        .bind(professional_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_entry).transpose()
    }

    async fn list_waiting(&self, hub_id: i64) -> DispatchResult<Vec<QueueEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM queue_entries
             WHERE hub_id = $1 AND status = 'WAITING' ORDER BY position",
        ))
        .bind(hub_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    async fn list_en_route(&self, hub_id: i64) -> DispatchResult<Vec<QueueEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM queue_entries
             WHERE hub_id = $1 AND status = 'EN_ROUTE' ORDER BY dispatched_at",
        ))
        .bind(hub_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    async fn list_by_hub(&self, hub_id: i64) -> DispatchResult<Vec<QueueEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM queue_entries
             WHERE hub_id = $1
             ORDER BY status = 'EN_ROUTE', position, dispatched_at",
        ))
        .bind(hub_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    async fn count_by_hub(&self, hub_id: i64) -> DispatchResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM queue_entries WHERE hub_id = $1")
            .bind(hub_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("total")?)
    }

    #[instrument(skip(self, entry), fields(
        hub_id = %entry.hub_id,
        professional_id = %entry.professional_id,
    ))]
    async fn insert_tail(&self, entry: &NewQueueEntry) -> DispatchResult<QueueEntry> {
        let mut tx = self.pool.begin().await?;

        let position = Self::max_waiting_position(&mut tx, entry.hub_id).await? + 1;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO queue_entries
                (hub_id, professional_id, display_name, status, position, entered_at,
                 checkin_latitude, checkin_longitude, single_ride)
            VALUES ($1, $2, $3, 'WAITING', $4, $5, $6, $7, 0)
            RETURNING {ENTRY_COLUMNS}
            "#,
        ))
        .bind(entry.hub_id)
        .bind(&entry.professional_id)
        .bind(&entry.display_name)
        .bind(position)
        .bind(entry.entered_at)
        .bind(entry.checkin.latitude)
        .bind(entry.checkin.longitude)
        .fetch_one(&mut *tx)
        .await?;

        let created = Self::row_to_entry(&row)?;
        tx.commit().await?;

        debug!("entered at position {position}");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn mark_en_route(
        &self,
        entry_id: i64,
        single_ride: bool,
        now: DateTime<Utc>,
    ) -> DispatchResult<QueueEntry> {
        let mut tx = self.pool.begin().await?;

        let entry = Self::fetch_entry(&mut tx, entry_id).await?;
        let old_position = match (entry.status, entry.position) {
            (EntryStatus::Waiting, Some(position)) => position,
            _ => return Err(DispatchError::not_in_queue(entry.professional_id)),
        };

        let original_position = single_ride.then_some(old_position);
        let row = sqlx::query(&format!(
            r#"
            UPDATE queue_entries
            SET status = 'EN_ROUTE', position = NULL, dispatched_at = $2,
                single_ride = $3, original_position = $4, position_reason = NULL
            WHERE id = $1
            RETURNING {ENTRY_COLUMNS}
            "#,
        ))
        .bind(entry_id)
        .bind(now)
        .bind(single_ride)
        .bind(original_position)
        .fetch_one(&mut *tx)
        .await?;

        Self::shift_down_after(&mut tx, entry.hub_id, old_position).await?;

        let updated = Self::row_to_entry(&row)?;
        tx.commit().await?;

        debug!("dispatched from position {old_position} (single_ride: {single_ride})");
        Ok(updated)
    }

    #[instrument(skip(self, checkin))]
    async fn reinsert_tail(
        &self,
        entry_id: i64,
        checkin: Coordinates,
        now: DateTime<Utc>,
    ) -> DispatchResult<QueueEntry> {
        let mut tx = self.pool.begin().await?;

        let entry = Self::fetch_entry(&mut tx, entry_id).await?;
        if !entry.is_en_route() {
            return Err(DispatchError::not_in_queue(entry.professional_id));
        }

        let position = Self::max_waiting_position(&mut tx, entry.hub_id).await? + 1;
        let row = sqlx::query(&format!(
            r#"
            UPDATE queue_entries
            SET status = 'WAITING', position = $2, returned_at = $3,
                checkin_latitude = $4, checkin_longitude = $5,
                single_ride = 0, original_position = NULL, position_reason = NULL
            WHERE id = $1
            RETURNING {ENTRY_COLUMNS}
            "#,
        ))
        .bind(entry_id)
        .bind(position)
        .bind(now)
        .bind(checkin.latitude)
        .bind(checkin.longitude)
        .fetch_one(&mut *tx)
        .await?;

        let updated = Self::row_to_entry(&row)?;
        tx.commit().await?;

        debug!("returned to tail position {position}");
        Ok(updated)
    }

    #[instrument(skip(self, checkin))]
    async fn reinsert_at(
        &self,
        entry_id: i64,
        target_position: i32,
        checkin: Coordinates,
        now: DateTime<Utc>,
    ) -> DispatchResult<QueueEntry> {
        let mut tx = self.pool.begin().await?;

        let entry = Self::fetch_entry(&mut tx, entry_id).await?;
        if !entry.is_en_route() {
            return Err(DispatchError::not_in_queue(entry.professional_id));
        }

        // Open the slot before occupying it.
        sqlx::query(
            "UPDATE queue_entries SET position = position + 1
             WHERE hub_id = $1 AND status = 'WAITING' AND position >= $2",
        )
        .bind(entry.hub_id)
        .bind(target_position)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE queue_entries
            SET status = 'WAITING', position = $2, returned_at = $3,
                checkin_latitude = $4, checkin_longitude = $5,
                single_ride = 0, original_position = NULL, position_reason = NULL
            WHERE id = $1
            RETURNING {ENTRY_COLUMNS}
            "#,
        ))
        .bind(entry_id)
        .bind(target_position)
        .bind(now)
        .bind(checkin.latitude)
        .bind(checkin.longitude)
        .fetch_one(&mut *tx)
        .await?;

        let updated = Self::row_to_entry(&row)?;
        tx.commit().await?;

        debug!("returned to priority position {target_position}");
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn move_to_back(&self, entry_id: i64) -> DispatchResult<QueueEntry> {
        let mut tx = self.pool.begin().await?;

        let entry = Self::fetch_entry(&mut tx, entry_id).await?;
        let old_position = match (entry.status, entry.position) {
            (EntryStatus::Waiting, Some(position)) => position,
            _ => return Err(DispatchError::not_in_queue(entry.professional_id)),
        };

        let max_position = Self::max_waiting_position(&mut tx, entry.hub_id).await?;
        if old_position == max_position {
            // Already last; nothing to reorder.
            return Ok(entry);
        }

        Self::shift_down_after(&mut tx, entry.hub_id, old_position).await?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE queue_entries
            SET position = $2, single_ride = 0, original_position = NULL,
                position_reason = $3
            WHERE id = $1
            RETURNING {ENTRY_COLUMNS}
            "#,
        ))
        .bind(entry_id)
        .bind(max_position)
        .bind(POSITION_REASON_MOVED_TO_BACK)
        .fetch_one(&mut *tx)
        .await?;

        let updated = Self::row_to_entry(&row)?;
        tx.commit().await?;

        debug!("moved from position {old_position} to {max_position}");
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete_entry(&self, entry_id: i64) -> DispatchResult<()> {
        let mut tx = self.pool.begin().await?;

        let entry = Self::fetch_entry(&mut tx, entry_id).await?;

        sqlx::query("DELETE FROM queue_entries WHERE id = $1")
            .bind(entry_id)
            .execute(&mut *tx)
            .await?;

        if let (EntryStatus::Waiting, Some(position)) = (entry.status, entry.position) {
            Self::shift_down_after(&mut tx, entry.hub_id, position).await?;
        }

        tx.commit().await?;
        debug!("deleted entry of {}", entry.professional_id);
        Ok(())
    }
}
