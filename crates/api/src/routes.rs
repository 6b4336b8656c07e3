use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use despacho_engine::{
    BindingService, HubService, MailboxService, QueueService, ReportsService,
};

use crate::handlers::{
    bindings::{bind_professional, list_bindings, rebind_professional, unbind_professional},
    health::health_check,
    hubs::{create_hub, delete_hub, get_hub, list_hubs, update_hub},
    metrics::render_metrics,
    notifications::{ack_notification, drain_notification},
    professional::{enter_queue, exit_queue, my_position, which_hub},
    queue::{dispatch, dispatch_priority, list_queue, move_to_back, remove_from_queue},
    reports::{hub_history, hub_stats},
};

#[derive(Clone)]
pub struct AppState {
    pub queue_service: Arc<QueueService>,
    pub hub_service: Arc<HubService>,
    pub binding_service: Arc<BindingService>,
    pub mailbox_service: Arc<MailboxService>,
    pub reports_service: Arc<ReportsService>,
    /// Absent when no Prometheus recorder is installed (tests, embedded use).
    pub prometheus: Option<PrometheusHandle>,
}

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(render_metrics))
        // hub administration
        .route("/api/hubs", get(list_hubs).post(create_hub))
        .route("/api/hubs/{id}", get(get_hub))
        .route("/api/hubs/{id}/update", post(update_hub))
        .route("/api/hubs/{id}/delete", post(delete_hub))
        .route("/api/hubs/{id}/bindings", get(list_bindings))
        // queue administration
        .route("/api/hubs/{id}/queue", get(list_queue))
        .route("/api/hubs/{id}/queue/dispatch", post(dispatch))
        .route(
            "/api/hubs/{id}/queue/dispatch-priority",
            post(dispatch_priority),
        )
        .route("/api/hubs/{id}/queue/move-to-back", post(move_to_back))
        .route("/api/hubs/{id}/queue/remove", post(remove_from_queue))
        // reporting
        .route("/api/hubs/{id}/stats", get(hub_stats))
        .route("/api/hubs/{id}/history", get(hub_history))
        // binding administration
        .route("/api/bindings", post(bind_professional))
        .route("/api/bindings/unbind", post(unbind_professional))
        .route("/api/bindings/rebind", post(rebind_professional))
        // professional self-service
        .route("/api/me/hub", get(which_hub))
        .route("/api/me/queue/enter", post(enter_queue))
        .route("/api/me/queue/exit", post(exit_queue))
        .route("/api/me/queue/position", get(my_position))
        .route("/api/me/notifications/drain", post(drain_notification))
        .route("/api/me/notifications/ack", post(ack_notification))
        .with_state(state)
}
