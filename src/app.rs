use std::sync::Arc;

use anyhow::{Context, Result};
use despacho_api::{create_app, AppState};
use despacho_engine::{
    BindingService, HubLocks, HubService, MailboxService, QueueService, ReportsService,
};
use despacho_infrastructure::{
    connect_embedded, BroadcastEventBus, SqliteBindingRepository, SqliteHistoryRepository,
    SqliteHubRepository, SqliteNotificationRepository, SqliteQueueRepository, TracingAuditSink,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::{net::TcpListener, sync::broadcast};
use tracing::info;

use crate::config::AppConfig;

/// Wires the repositories, services and HTTP router together.
pub struct Application {
    config: AppConfig,
    state: AppState,
}

impl Application {
    pub async fn new(config: AppConfig) -> Result<Self> {
        info!("connecting to database {}", config.database.url);
        let pool = connect_embedded(&config.database.url, config.database.max_connections)
            .await
            .context("failed to open the queue database")?;

        let hubs = Arc::new(SqliteHubRepository::new(pool.clone()));
        let bindings = Arc::new(SqliteBindingRepository::new(pool.clone()));
        let queue = Arc::new(SqliteQueueRepository::new(pool.clone()));
        let history = Arc::new(SqliteHistoryRepository::new(pool.clone()));
        let notifications = Arc::new(SqliteNotificationRepository::new(pool));

        let audit = Arc::new(TracingAuditSink);
        let events = Arc::new(BroadcastEventBus::new(config.api.event_bus_capacity));
        let locks = Arc::new(HubLocks::new());

        let prometheus = PrometheusBuilder::new()
            .install_recorder()
            .context("failed to install the metrics recorder")?;

        let state = AppState {
            queue_service: Arc::new(QueueService::new(
                hubs.clone(),
                bindings.clone(),
                queue.clone(),
                history.clone(),
                notifications.clone(),
                audit.clone(),
                events,
                locks.clone(),
                config.queue.clone(),
            )),
            hub_service: Arc::new(HubService::new(hubs.clone(), queue.clone(), audit.clone())),
            binding_service: Arc::new(BindingService::new(
                hubs.clone(),
                bindings,
                queue,
                history.clone(),
                audit,
                locks,
            )),
            mailbox_service: Arc::new(MailboxService::new(notifications)),
            reports_service: Arc::new(ReportsService::new(hubs, history)),
            prometheus: Some(prometheus),
        };

        Ok(Self { config, state })
    }

    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&self.config.api.bind_address)
            .await
            .with_context(|| format!("failed to bind {}", self.config.api.bind_address))?;
        info!("listening on {}", self.config.api.bind_address);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await
            .context("server terminated unexpectedly")?;

        info!("server stopped");
        Ok(())
    }
}
