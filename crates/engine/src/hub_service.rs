use std::sync::Arc;

use despacho_domain::entities::{Hub, NewHub};
use despacho_domain::policy::{self, Action};
use despacho_domain::ports::AuditSink;
use despacho_domain::repositories::{HubRepository, QueueRepository};
use despacho_domain::value_objects::{ActorContext, Coordinates};
use despacho_errors::{DispatchError, DispatchResult};
use tracing::instrument;

/// Admin CRUD over hubs. The one domain rule beyond validation: a hub with
/// queue entries cannot be deleted.
pub struct HubService {
    hubs: Arc<dyn HubRepository>,
    queue: Arc<dyn QueueRepository>,
    audit: Arc<dyn AuditSink>,
}

impl HubService {
    pub fn new(
        hubs: Arc<dyn HubRepository>,
        queue: Arc<dyn QueueRepository>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self { hubs, queue, audit }
    }

    fn validate(name: &str, latitude: f64, longitude: f64, radius_meters: f64) -> DispatchResult<()> {
        if name.trim().is_empty() {
            return Err(DispatchError::validation_error("hub name must not be empty"));
        }
        Coordinates::new(latitude, longitude)?;
        if !radius_meters.is_finite() || radius_meters <= 0.0 {
            return Err(DispatchError::validation_error(
                "radius_meters must be a positive number",
            ));
        }
        Ok(())
    }

    #[instrument(skip(self, ctx, hub), fields(admin_id = %ctx.professional_id, hub_name = %hub.name))]
    pub async fn create(&self, ctx: &ActorContext, hub: NewHub) -> DispatchResult<Hub> {
        policy::ensure(ctx.role, Action::ManageHubs)?;
        Self::validate(&hub.name, hub.latitude, hub.longitude, hub.radius_meters)?;

        let created = self.hubs.create(&hub).await?;
        self.audit
            .record(
                "criar_central",
                "central",
                "hub",
                &created.id.to_string(),
                serde_json::json!({ "name": created.name }),
            )
            .await;
        Ok(created)
    }

    #[instrument(skip(self, ctx, hub), fields(admin_id = %ctx.professional_id, hub_id = %hub.id))]
    pub async fn update(&self, ctx: &ActorContext, hub: Hub) -> DispatchResult<Hub> {
        policy::ensure(ctx.role, Action::ManageHubs)?;
        Self::validate(&hub.name, hub.latitude, hub.longitude, hub.radius_meters)?;

        let updated = self.hubs.update(&hub).await?;
        self.audit
            .record(
                "editar_central",
                "central",
                "hub",
                &updated.id.to_string(),
                serde_json::json!({ "name": updated.name, "active": updated.active }),
            )
            .await;
        Ok(updated)
    }

    #[instrument(skip(self, ctx), fields(admin_id = %ctx.professional_id))]
    pub async fn delete(&self, ctx: &ActorContext, hub_id: i64) -> DispatchResult<()> {
        policy::ensure(ctx.role, Action::ManageHubs)?;

        let entries = self.queue.count_by_hub(hub_id).await?;
        if entries > 0 {
            return Err(DispatchError::HubHasActiveEntries { hub_id, entries });
        }

        self.hubs.delete(hub_id).await?;
        self.audit
            .record(
                "remover_central",
                "central",
                "hub",
                &hub_id.to_string(),
                serde_json::json!({}),
            )
            .await;
        Ok(())
    }

    pub async fn get(&self, ctx: &ActorContext, hub_id: i64) -> DispatchResult<Hub> {
        policy::ensure(ctx.role, Action::ManageHubs)?;
        self.hubs
            .get_by_id(hub_id)
            .await?
            .ok_or_else(|| DispatchError::hub_not_found(hub_id))
    }

    pub async fn list(&self, ctx: &ActorContext) -> DispatchResult<Vec<Hub>> {
        policy::ensure(ctx.role, Action::ManageHubs)?;
        self.hubs.list().await
    }
}
