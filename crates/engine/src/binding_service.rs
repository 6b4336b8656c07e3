use std::sync::Arc;

use chrono::Utc;
use despacho_domain::entities::{Binding, HistoryAction, NewBinding, NewHistoryEvent};
use despacho_domain::policy::{self, Action};
use despacho_domain::ports::AuditSink;
use despacho_domain::repositories::{
    BindingRepository, HistoryRepository, HubRepository, QueueRepository,
};
use despacho_domain::value_objects::ActorContext;
use despacho_errors::{DispatchError, DispatchResult};
use tracing::{instrument, warn};

use crate::hub_locks::HubLocks;

/// Admin management of professional↔hub bindings. A professional holds at
/// most one active binding; binding to a different hub requires an explicit
/// rebind, never an implicit replacement. Unbinding evicts any live queue
/// entry first.
pub struct BindingService {
    hubs: Arc<dyn HubRepository>,
    bindings: Arc<dyn BindingRepository>,
    queue: Arc<dyn QueueRepository>,
    history: Arc<dyn HistoryRepository>,
    audit: Arc<dyn AuditSink>,
    locks: Arc<HubLocks>,
}

impl BindingService {
    pub fn new(
        hubs: Arc<dyn HubRepository>,
        bindings: Arc<dyn BindingRepository>,
        queue: Arc<dyn QueueRepository>,
        history: Arc<dyn HistoryRepository>,
        audit: Arc<dyn AuditSink>,
        locks: Arc<HubLocks>,
    ) -> Self {
        Self {
            hubs,
            bindings,
            queue,
            history,
            audit,
            locks,
        }
    }

    #[instrument(skip(self, ctx, display_name), fields(admin_id = %ctx.professional_id))]
    pub async fn bind(
        &self,
        ctx: &ActorContext,
        professional_id: &str,
        display_name: &str,
        hub_id: i64,
    ) -> DispatchResult<Binding> {
        policy::ensure(ctx.role, Action::ManageBindings)?;

        self.hubs
            .get_by_id(hub_id)
            .await?
            .ok_or_else(|| DispatchError::hub_not_found(hub_id))?;

        if let Some(existing) = self
            .bindings
            .find_active_by_professional(professional_id)
            .await?
        {
            if existing.hub_id == hub_id {
                // Idempotent: already bound right here.
                return Ok(existing);
            }
            return Err(DispatchError::AlreadyBound {
                professional_id: professional_id.to_string(),
                hub_id: existing.hub_id,
            });
        }

        let binding = self
            .bindings
            .create(&NewBinding {
                hub_id,
                professional_id: professional_id.to_string(),
                display_name: display_name.to_string(),
            })
            .await?;

        self.audit
            .record(
                "vincular_profissional",
                "vinculo",
                "binding",
                professional_id,
                serde_json::json!({ "hub_id": hub_id }),
            )
            .await;
        Ok(binding)
    }

    /// Removes the professional's active binding, evicting any queue entry
    /// under the hub lock so positions stay contiguous.
    #[instrument(skip(self, ctx), fields(admin_id = %ctx.professional_id))]
    pub async fn unbind(&self, ctx: &ActorContext, professional_id: &str) -> DispatchResult<()> {
        policy::ensure(ctx.role, Action::ManageBindings)?;

        let binding = self
            .bindings
            .find_active_by_professional(professional_id)
            .await?
            .ok_or_else(|| DispatchError::not_bound(professional_id))?;

        let _guard = self.locks.acquire(binding.hub_id).await;

        if let Some(entry) = self.queue.find_by_professional(professional_id).await? {
            let now = Utc::now();
            let (wait_minutes, en_route_minutes) = if entry.is_waiting() {
                (Some(entry.wait_minutes(now)), None)
            } else {
                (None, entry.en_route_minutes(now))
            };

            self.queue.delete_entry(entry.id).await?;

            let hub_name = self
                .hubs
                .get_by_id(binding.hub_id)
                .await?
                .map(|hub| hub.name)
                .unwrap_or_default();
            let event = NewHistoryEvent {
                hub_id: binding.hub_id,
                hub_name,
                professional_id: entry.professional_id.clone(),
                display_name: entry.display_name.clone(),
                action: HistoryAction::Removed,
                wait_minutes,
                en_route_minutes,
                note: Some("vínculo com a central encerrado".to_string()),
                admin_id: Some(ctx.professional_id.clone()),
                occurred_at: now,
            };
            if let Err(error) = self.history.append(&event).await {
                warn!(%error, "history append failed during unbind");
            }
        }

        self.bindings.deactivate(binding.id).await?;
        self.audit
            .record(
                "desvincular_profissional",
                "vinculo",
                "binding",
                professional_id,
                serde_json::json!({ "hub_id": binding.hub_id }),
            )
            .await;
        Ok(())
    }

    /// Explicit move to another hub: unbind then bind, never implicit.
    pub async fn rebind(
        &self,
        ctx: &ActorContext,
        professional_id: &str,
        display_name: &str,
        hub_id: i64,
    ) -> DispatchResult<Binding> {
        policy::ensure(ctx.role, Action::ManageBindings)?;
        self.unbind(ctx, professional_id).await?;
        self.bind(ctx, professional_id, display_name, hub_id).await
    }

    pub async fn list_by_hub(&self, ctx: &ActorContext, hub_id: i64) -> DispatchResult<Vec<Binding>> {
        policy::ensure(ctx.role, Action::ManageBindings)?;
        self.bindings.list_by_hub(hub_id).await
    }
}
