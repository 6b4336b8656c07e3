use async_trait::async_trait;
use despacho_domain::entities::{Hub, NewHub};
use despacho_domain::repositories::HubRepository;
use despacho_errors::{DispatchError, DispatchResult};
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

pub struct SqliteHubRepository {
    pool: SqlitePool,
}

impl SqliteHubRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_hub(row: &sqlx::sqlite::SqliteRow) -> DispatchResult<Hub> {
        Ok(Hub {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            address: row.try_get("address")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            radius_meters: row.try_get("radius_meters")?,
            active: row.try_get("active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

const HUB_COLUMNS: &str =
    "id, name, address, latitude, longitude, radius_meters, active, created_at, updated_at";

#[async_trait]
impl HubRepository for SqliteHubRepository {
    #[instrument(skip(self, hub), fields(hub_name = %hub.name))]
    async fn create(&self, hub: &NewHub) -> DispatchResult<Hub> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO hubs (name, address, latitude, longitude, radius_meters, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {HUB_COLUMNS}
            "#,
        ))
        .bind(&hub.name)
        .bind(&hub.address)
        .bind(hub.latitude)
        .bind(hub.longitude)
        .bind(hub.radius_meters)
        .bind(hub.active)
        .fetch_one(&self.pool)
        .await?;

        let created = Self::row_to_hub(&row)?;
        debug!("created {}", created.entity_description());
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: i64) -> DispatchResult<Option<Hub>> {
        let row = sqlx::query(&format!("SELECT {HUB_COLUMNS} FROM hubs WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_hub).transpose()
    }

    async fn list(&self) -> DispatchResult<Vec<Hub>> {
        let rows = sqlx::query(&format!("SELECT {HUB_COLUMNS} FROM hubs ORDER BY name"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_hub).collect()
    }

    #[instrument(skip(self, hub), fields(hub_id = %hub.id))]
    async fn update(&self, hub: &Hub) -> DispatchResult<Hub> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE hubs
            SET name = $2, address = $3, latitude = $4, longitude = $5,
                radius_meters = $6, active = $7, updated_at = datetime('now')
            WHERE id = $1
            RETURNING {HUB_COLUMNS}
            "#,
        ))
        .bind(hub.id)
        .bind(&hub.name)
        .bind(&hub.address)
        .bind(hub.latitude)
        .bind(hub.longitude)
        .bind(hub.radius_meters)
        .bind(hub.active)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_hub(&row),
            None => Err(DispatchError::hub_not_found(hub.id)),
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> DispatchResult<()> {
        let result = sqlx::query("DELETE FROM hubs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DispatchError::hub_not_found(id));
        }
        debug!("deleted hub {id}");
        Ok(())
    }
}
