use async_trait::async_trait;
use despacho_domain::entities::{Binding, NewBinding};
use despacho_domain::repositories::BindingRepository;
use despacho_errors::{DispatchError, DispatchResult};
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

pub struct SqliteBindingRepository {
    pool: SqlitePool,
}

impl SqliteBindingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_binding(row: &sqlx::sqlite::SqliteRow) -> DispatchResult<Binding> {
        Ok(Binding {
            id: row.try_get("id")?,
            hub_id: row.try_get("hub_id")?,
            professional_id: row.try_get("professional_id")?,
            display_name: row.try_get("display_name")?,
            active: row.try_get("active")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

const BINDING_COLUMNS: &str = "id, hub_id, professional_id, display_name, active, created_at";

#[async_trait]
impl BindingRepository for SqliteBindingRepository {
    #[instrument(skip(self, binding), fields(
        hub_id = %binding.hub_id,
        professional_id = %binding.professional_id,
    ))]
    async fn create(&self, binding: &NewBinding) -> DispatchResult<Binding> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO bindings (hub_id, professional_id, display_name, active)
            VALUES ($1, $2, $3, 1)
            RETURNING {BINDING_COLUMNS}
            "#,
        ))
        .bind(binding.hub_id)
        .bind(&binding.professional_id)
        .bind(&binding.display_name)
        .fetch_one(&self.pool)
        .await?;

        let created = Self::row_to_binding(&row)?;
        debug!(
            "bound {} to hub {}",
            created.professional_id, created.hub_id
        );
        Ok(created)
    }

    async fn find_active_by_professional(
        &self,
        professional_id: &str,
    ) -> DispatchResult<Option<Binding>> {
        let row = sqlx::query(&format!(
            "SELECT {BINDING_COLUMNS} FROM bindings WHERE professional_id = $1 AND active = 1",
        ))
        .bind(professional_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_binding).transpose()
    }

    async fn list_by_hub(&self, hub_id: i64) -> DispatchResult<Vec<Binding>> {
        let rows = sqlx::query(&format!(
            "SELECT {BINDING_COLUMNS} FROM bindings WHERE hub_id = $1 AND active = 1 ORDER BY display_name",
        ))
        .bind(hub_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_binding).collect()
    }

    #[instrument(skip(self))]
    async fn deactivate(&self, id: i64) -> DispatchResult<()> {
        let result = sqlx::query("UPDATE bindings SET active = 0 WHERE id = $1 AND active = 1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DispatchError::database_error(format!(
                "binding {id} not found or already inactive"
            )));
        }
        Ok(())
    }
}
