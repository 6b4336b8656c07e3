use std::sync::Arc;

use chrono::Utc;
use despacho_domain::entities::{
    HistoryAction, Hub, NewHistoryEvent, NewNotification, NewQueueEntry, NotificationKind,
    QueueEntry,
};
use despacho_domain::events::{QueueEvent, QueueEventPublisher};
use despacho_domain::geo;
use despacho_domain::policy::{self, Action};
use despacho_domain::ports::AuditSink;
use despacho_domain::repositories::{
    BindingRepository, HistoryRepository, HubRepository, NotificationRepository, QueueRepository,
};
use despacho_domain::value_objects::{ActorContext, Coordinates, NotificationPayload};
use despacho_errors::{DispatchError, DispatchResult};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::hub_locks::HubLocks;
use crate::settings::QueueSettings;
use crate::views::{
    BindingStatus, EnterOutcome, OverdueAlert, PositionView, QueueNeighbor, QueueView,
};

/// The queue state machine. Owns every transition of a queue entry
/// (absent → waiting → en_route → waiting → … → absent) and keeps the
/// waiting positions of each hub a contiguous 1..=N range.
///
/// Mutations take the hub's lock for the whole read-check-mutate sequence;
/// the repository applies each structural change atomically. Ledger,
/// mailbox, audit and event side effects run after the mutation commits and
/// never roll it back.
pub struct QueueService {
    hubs: Arc<dyn HubRepository>,
    bindings: Arc<dyn BindingRepository>,
    queue: Arc<dyn QueueRepository>,
    history: Arc<dyn HistoryRepository>,
    notifications: Arc<dyn NotificationRepository>,
    audit: Arc<dyn AuditSink>,
    events: Arc<dyn QueueEventPublisher>,
    locks: Arc<HubLocks>,
    settings: QueueSettings,
}

impl QueueService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        hubs: Arc<dyn HubRepository>,
        bindings: Arc<dyn BindingRepository>,
        queue: Arc<dyn QueueRepository>,
        history: Arc<dyn HistoryRepository>,
        notifications: Arc<dyn NotificationRepository>,
        audit: Arc<dyn AuditSink>,
        events: Arc<dyn QueueEventPublisher>,
        locks: Arc<HubLocks>,
        settings: QueueSettings,
    ) -> Self {
        Self {
            hubs,
            bindings,
            queue,
            history,
            notifications,
            audit,
            events,
            locks,
            settings,
        }
    }

    /// Self check-in. Creates a waiting entry at the tail, or — when the
    /// professional is currently en route — runs the return flow instead.
    #[instrument(skip(self, ctx), fields(professional_id = %ctx.professional_id))]
    pub async fn enter(
        &self,
        ctx: &ActorContext,
        latitude: f64,
        longitude: f64,
    ) -> DispatchResult<EnterOutcome> {
        policy::ensure(ctx.role, Action::EnterQueue)?;
        let checkin = Coordinates::new(latitude, longitude)?;

        let binding = self
            .bindings
            .find_active_by_professional(&ctx.professional_id)
            .await?
            .ok_or_else(|| DispatchError::not_bound(&ctx.professional_id))?;
        let hub = self
            .hubs
            .get_by_id(binding.hub_id)
            .await?
            .filter(|hub| hub.active)
            .ok_or_else(|| DispatchError::not_bound(&ctx.professional_id))?;

        let check = geo::check_within_radius(checkin, &hub);
        if !check.within {
            return Err(DispatchError::DistanceExceeded {
                distance_meters: check.distance_meters,
                allowed_radius_meters: check.allowed_radius_meters,
            });
        }

        let _guard = self.locks.acquire(hub.id).await;

        match self.queue.find_by_professional(&ctx.professional_id).await? {
            None => self.first_entrance(ctx, &hub, checkin).await,
            Some(entry) if entry.is_waiting() => Err(DispatchError::AlreadyInQueue {
                professional_id: ctx.professional_id.clone(),
                position: entry.position.unwrap_or_default(),
            }),
            Some(entry) => self.handle_return(&hub, entry, checkin).await,
        }
    }

    async fn first_entrance(
        &self,
        ctx: &ActorContext,
        hub: &Hub,
        checkin: Coordinates,
    ) -> DispatchResult<EnterOutcome> {
        let now = Utc::now();
        let entry = self
            .queue
            .insert_tail(&NewQueueEntry {
                hub_id: hub.id,
                professional_id: ctx.professional_id.clone(),
                display_name: ctx.display_name.clone(),
                checkin,
                entered_at: now,
            })
            .await?;

        metrics::counter!("despacho_queue_entrances_total").increment(1);
        self.record_history(hub, &entry, HistoryAction::Entrance, None, None, None, None)
            .await;
        self.events.publish(QueueEvent::ProfessionalEntered {
            id: Uuid::new_v4(),
            hub_id: hub.id,
            professional_id: entry.professional_id.clone(),
            position: entry.position.unwrap_or_default(),
            occurred_at: now,
        });
        self.audit_entry("entrada_fila", &entry).await;

        Ok(EnterOutcome::Entered { entry })
    }

    /// Return from a route. Non-priority returns append to the tail;
    /// single-ride returns land back at the original slot, clamped to the
    /// contiguous range when the queue moved underneath them.
    async fn handle_return(
        &self,
        hub: &Hub,
        entry: QueueEntry,
        checkin: Coordinates,
    ) -> DispatchResult<EnterOutcome> {
        let now = Utc::now();
        let en_route_minutes = entry.en_route_minutes(now);
        let priority = entry.single_ride;

        let (updated, action, note) = if priority {
            let waiting = self.queue.list_waiting(hub.id).await?;
            let first = waiting
                .first()
                .and_then(|head| head.position)
                .unwrap_or(1);
            let tail = waiting
                .last()
                .and_then(|last| last.position)
                .unwrap_or(0);
            let original = entry.original_position.unwrap_or(tail + 1);
            // At or before the slot it would occupy had it never left:
            // never ahead of the current head, never past the tail slot.
            let target = original.clamp(first, tail + 1);

            let updated = self
                .queue
                .reinsert_at(entry.id, target, checkin, now)
                .await?;
            let note = format!("posição original {original}");
            (updated, HistoryAction::PriorityReturn, Some(note))
        } else {
            let updated = self.queue.reinsert_tail(entry.id, checkin, now).await?;
            (updated, HistoryAction::Return, None)
        };

        metrics::counter!("despacho_queue_returns_total").increment(1);
        self.record_history(hub, &updated, action, None, en_route_minutes, note, None)
            .await;
        self.events.publish(QueueEvent::ProfessionalReturned {
            id: Uuid::new_v4(),
            hub_id: hub.id,
            professional_id: updated.professional_id.clone(),
            position: updated.position.unwrap_or_default(),
            priority,
            occurred_at: now,
        });
        self.audit_entry("retorno_fila", &updated).await;

        Ok(EnterOutcome::Returned {
            entry: updated,
            priority,
        })
    }

    /// Sends the next professional to a route. Admin-only.
    pub async fn dispatch(
        &self,
        ctx: &ActorContext,
        hub_id: i64,
        professional_id: &str,
    ) -> DispatchResult<QueueEntry> {
        self.dispatch_inner(ctx, hub_id, professional_id, false)
            .await
    }

    /// Single-stop dispatch: the professional keeps a claim on their current
    /// slot and re-enters at (or before) it when they come back.
    pub async fn dispatch_priority(
        &self,
        ctx: &ActorContext,
        hub_id: i64,
        professional_id: &str,
    ) -> DispatchResult<QueueEntry> {
        self.dispatch_inner(ctx, hub_id, professional_id, true)
            .await
    }

    #[instrument(skip(self, ctx), fields(admin_id = %ctx.professional_id))]
    async fn dispatch_inner(
        &self,
        ctx: &ActorContext,
        hub_id: i64,
        professional_id: &str,
        single_ride: bool,
    ) -> DispatchResult<QueueEntry> {
        policy::ensure(ctx.role, Action::DispatchProfessional)?;
        let hub = self.require_hub(hub_id).await?;

        let _guard = self.locks.acquire(hub.id).await;

        let entry = self.require_entry_in_hub(professional_id, hub_id).await?;
        if !entry.is_waiting() {
            return Err(DispatchError::not_in_queue(professional_id));
        }

        let now = Utc::now();
        let wait_minutes = entry.wait_minutes(now);
        let original_position = entry.position;

        let updated = self.queue.mark_en_route(entry.id, single_ride, now).await?;

        let (action, kind, message, note) = if single_ride {
            (
                HistoryAction::DispatchedSingleRide,
                NotificationKind::SingleRide,
                "Corrida única: retorno com prioridade garantido e bônus na compensação."
                    .to_string(),
                original_position.map(|position| format!("posição original {position}")),
            )
        } else {
            (
                HistoryAction::Dispatched,
                NotificationKind::RouteDispatched,
                "Roteiro despachado. Sem novas coletas nesta rodada.".to_string(),
                None,
            )
        };

        metrics::counter!("despacho_queue_dispatches_total").increment(1);
        self.record_history(
            &hub,
            &updated,
            action,
            Some(wait_minutes),
            None,
            note,
            Some(ctx.professional_id.clone()),
        )
        .await;
        self.push_notification(&hub, &updated, kind, message).await;
        self.events.publish(QueueEvent::ProfessionalDispatched {
            id: Uuid::new_v4(),
            hub_id: hub.id,
            professional_id: updated.professional_id.clone(),
            single_ride,
            occurred_at: now,
        });
        self.audit_entry("despacho", &updated).await;

        Ok(updated)
    }

    /// Demotes a waiting professional to the tail. No-op when already last.
    #[instrument(skip(self, ctx), fields(admin_id = %ctx.professional_id))]
    pub async fn move_to_back(
        &self,
        ctx: &ActorContext,
        hub_id: i64,
        professional_id: &str,
    ) -> DispatchResult<QueueEntry> {
        policy::ensure(ctx.role, Action::MoveToBack)?;
        let hub = self.require_hub(hub_id).await?;

        let _guard = self.locks.acquire(hub.id).await;

        let entry = self.require_entry_in_hub(professional_id, hub_id).await?;
        if !entry.is_waiting() {
            return Err(DispatchError::not_in_queue(professional_id));
        }

        let old_position = entry.position;
        let updated = self.queue.move_to_back(entry.id).await?;
        if updated.position == old_position {
            return Ok(updated);
        }

        metrics::counter!("despacho_queue_moves_to_back_total").increment(1);
        self.record_history(
            &hub,
            &updated,
            HistoryAction::MovedToBack,
            None,
            None,
            None,
            Some(ctx.professional_id.clone()),
        )
        .await;
        self.events.publish(QueueEvent::ProfessionalMovedToBack {
            id: Uuid::new_v4(),
            hub_id: hub.id,
            professional_id: updated.professional_id.clone(),
            position: updated.position.unwrap_or_default(),
            occurred_at: Utc::now(),
        });
        self.audit_entry("movido_ultimo", &updated).await;

        Ok(updated)
    }

    /// Admin removal, with a note for the ledger.
    #[instrument(skip(self, ctx, note), fields(admin_id = %ctx.professional_id))]
    pub async fn remove(
        &self,
        ctx: &ActorContext,
        hub_id: i64,
        professional_id: &str,
        note: Option<String>,
    ) -> DispatchResult<()> {
        policy::ensure(ctx.role, Action::RemoveFromQueue)?;
        let hub = self.require_hub(hub_id).await?;

        let _guard = self.locks.acquire(hub.id).await;

        let entry = self.require_entry_in_hub(professional_id, hub_id).await?;
        self.delete_with_ledger(
            &hub,
            entry,
            HistoryAction::Removed,
            note,
            Some(ctx.professional_id.clone()),
        )
        .await
    }

    /// Voluntary exit by the professional.
    #[instrument(skip(self, ctx), fields(professional_id = %ctx.professional_id))]
    pub async fn exit(&self, ctx: &ActorContext) -> DispatchResult<()> {
        policy::ensure(ctx.role, Action::LeaveQueue)?;

        let entry = self
            .queue
            .find_by_professional(&ctx.professional_id)
            .await?
            .ok_or_else(|| DispatchError::not_in_queue(&ctx.professional_id))?;
        let hub = self.require_hub(entry.hub_id).await?;

        let _guard = self.locks.acquire(hub.id).await;

        // Re-read under the lock; the entry may have moved meanwhile.
        let entry = self
            .queue
            .find_by_professional(&ctx.professional_id)
            .await?
            .ok_or_else(|| DispatchError::not_in_queue(&ctx.professional_id))?;

        self.delete_with_ledger(&hub, entry, HistoryAction::VoluntaryExit, None, None)
            .await
    }

    async fn delete_with_ledger(
        &self,
        hub: &Hub,
        entry: QueueEntry,
        action: HistoryAction,
        note: Option<String>,
        admin_id: Option<String>,
    ) -> DispatchResult<()> {
        let now = Utc::now();
        let (wait_minutes, en_route_minutes) = if entry.is_waiting() {
            (Some(entry.wait_minutes(now)), None)
        } else {
            (None, entry.en_route_minutes(now))
        };
        let voluntary = matches!(action, HistoryAction::VoluntaryExit);

        self.queue.delete_entry(entry.id).await?;

        metrics::counter!("despacho_queue_removals_total").increment(1);
        self.record_history(hub, &entry, action, wait_minutes, en_route_minutes, note, admin_id)
            .await;
        self.events.publish(QueueEvent::ProfessionalRemoved {
            id: Uuid::new_v4(),
            hub_id: hub.id,
            professional_id: entry.professional_id.clone(),
            voluntary,
            occurred_at: now,
        });
        self.audit_entry("remocao_fila", &entry).await;

        Ok(())
    }

    /// Admin snapshot of one hub's queue, with overdue en-route alerts.
    pub async fn list_queue(&self, ctx: &ActorContext, hub_id: i64) -> DispatchResult<QueueView> {
        policy::ensure(ctx.role, Action::ViewQueue)?;
        self.require_hub(hub_id).await?;

        let now = Utc::now();
        let entries = self.queue.list_by_hub(hub_id).await?;
        let (waiting, en_route): (Vec<QueueEntry>, Vec<QueueEntry>) =
            entries.into_iter().partition(QueueEntry::is_waiting);

        let alerts = en_route
            .iter()
            .filter_map(|entry| {
                let minutes = entry.en_route_minutes(now)?;
                (minutes > self.settings.overdue_minutes).then(|| OverdueAlert {
                    professional_id: entry.professional_id.clone(),
                    display_name: entry.display_name.clone(),
                    minutes_en_route: minutes,
                })
            })
            .collect();

        Ok(QueueView {
            hub_id,
            waiting,
            en_route,
            alerts,
        })
    }

    /// Self-service: own position, up to `neighbor_span` neighbors each way,
    /// total waiting and elapsed wait.
    pub async fn my_position(&self, ctx: &ActorContext) -> DispatchResult<PositionView> {
        policy::ensure(ctx.role, Action::ViewOwnStatus)?;

        let entry = self
            .queue
            .find_by_professional(&ctx.professional_id)
            .await?
            .ok_or_else(|| DispatchError::not_in_queue(&ctx.professional_id))?;

        let now = Utc::now();
        let waiting = self.queue.list_waiting(entry.hub_id).await?;
        let total_waiting = waiting.len() as i64;

        let (ahead, behind) = match entry.position {
            Some(own) => {
                let span = self.settings.neighbor_span as i32;
                let neighbor = |other: &QueueEntry| QueueNeighbor {
                    position: other.position.unwrap_or_default(),
                    display_name: other.display_name.clone(),
                };
                let ahead = waiting
                    .iter()
                    .filter(|other| {
                        other.position.is_some_and(|p| p < own && p >= own - span)
                    })
                    .map(neighbor)
                    .collect();
                let behind = waiting
                    .iter()
                    .filter(|other| {
                        other.position.is_some_and(|p| p > own && p <= own + span)
                    })
                    .map(neighbor)
                    .collect();
                (ahead, behind)
            }
            None => (Vec::new(), Vec::new()),
        };

        Ok(PositionView {
            waited_minutes: entry.wait_minutes(now),
            en_route_minutes: entry.en_route_minutes(now),
            entry,
            total_waiting,
            ahead,
            behind,
        })
    }

    /// Self-service: active binding, its hub and the current entry, if any.
    pub async fn which_hub(&self, ctx: &ActorContext) -> DispatchResult<BindingStatus> {
        policy::ensure(ctx.role, Action::ViewOwnStatus)?;

        let binding = self
            .bindings
            .find_active_by_professional(&ctx.professional_id)
            .await?;
        let hub = match &binding {
            Some(binding) => self.hubs.get_by_id(binding.hub_id).await?,
            None => None,
        };
        let entry = self.queue.find_by_professional(&ctx.professional_id).await?;

        Ok(BindingStatus {
            binding,
            hub,
            entry,
        })
    }

    async fn require_hub(&self, hub_id: i64) -> DispatchResult<Hub> {
        self.hubs
            .get_by_id(hub_id)
            .await?
            .ok_or_else(|| DispatchError::hub_not_found(hub_id))
    }

    async fn require_entry_in_hub(
        &self,
        professional_id: &str,
        hub_id: i64,
    ) -> DispatchResult<QueueEntry> {
        self.queue
            .find_by_professional(professional_id)
            .await?
            .filter(|entry| entry.hub_id == hub_id)
            .ok_or_else(|| DispatchError::not_in_queue(professional_id))
    }

    /// Ledger write. Failures are logged and swallowed: the queue mutation
    /// has already committed and must not be undone by a reporting problem.
    #[allow(clippy::too_many_arguments)]
    async fn record_history(
        &self,
        hub: &Hub,
        entry: &QueueEntry,
        action: HistoryAction,
        wait_minutes: Option<i64>,
        en_route_minutes: Option<i64>,
        note: Option<String>,
        admin_id: Option<String>,
    ) {
        let event = NewHistoryEvent {
            hub_id: hub.id,
            hub_name: hub.name.clone(),
            professional_id: entry.professional_id.clone(),
            display_name: entry.display_name.clone(),
            action,
            wait_minutes,
            en_route_minutes,
            note,
            admin_id,
            occurred_at: Utc::now(),
        };
        if let Err(error) = self.history.append(&event).await {
            warn!(
                action = action.as_str(),
                professional_id = %entry.professional_id,
                %error,
                "history append failed; queue state is already committed"
            );
        }
    }

    /// Mailbox write, same failure policy as the ledger.
    async fn push_notification(
        &self,
        hub: &Hub,
        entry: &QueueEntry,
        kind: NotificationKind,
        message: String,
    ) {
        let notification = NewNotification {
            professional_id: entry.professional_id.clone(),
            kind,
            message,
            payload: NotificationPayload {
                hub_id: hub.id,
                hub_name: hub.name.clone(),
                single_ride: entry.single_ride,
                original_position: entry.original_position,
                dispatched_at: entry.dispatched_at.unwrap_or_else(Utc::now),
            },
        };
        if let Err(error) = self.notifications.upsert(&notification).await {
            warn!(
                kind = kind.as_str(),
                professional_id = %entry.professional_id,
                %error,
                "notification push failed"
            );
        }
    }

    async fn audit_entry(&self, action: &str, entry: &QueueEntry) {
        self.audit
            .record(
                action,
                "fila",
                "queue_entry",
                &entry.professional_id,
                serde_json::json!({
                    "hub_id": entry.hub_id,
                    "status": entry.status.as_str(),
                    "position": entry.position,
                }),
            )
            .await;
    }
}
