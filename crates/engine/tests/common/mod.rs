//! Shared fixture: a queue service wired to in-memory mocks, one active hub
//! and helpers to bind/check-in professionals at the hub's center.
#![allow(dead_code)]

use std::sync::Arc;

use despacho_domain::entities::{Hub, NewHub};
use despacho_domain::repositories::{BindingRepository, HubRepository};
use despacho_domain::value_objects::{ActorContext, Role};
use despacho_engine::{
    BindingService, HubLocks, HubService, MailboxService, QueueService, QueueSettings,
    ReportsService,
};
use despacho_testing_utils::{
    MockAuditSink, MockBindingRepository, MockEventPublisher, MockHistoryRepository,
    MockHubRepository, MockNotificationRepository, MockQueueRepository,
};

pub const HUB_LAT: f64 = -23.5505;
pub const HUB_LON: f64 = -46.6333;
// ~1000 m north of the hub center.
pub const FAR_LAT: f64 = -23.54151;

pub struct World {
    pub hubs: Arc<MockHubRepository>,
    pub bindings: Arc<MockBindingRepository>,
    pub queue: Arc<MockQueueRepository>,
    pub history: Arc<MockHistoryRepository>,
    pub notifications: Arc<MockNotificationRepository>,
    pub audit: Arc<MockAuditSink>,
    pub events: Arc<MockEventPublisher>,
    pub queue_service: QueueService,
    pub hub_service: HubService,
    pub binding_service: BindingService,
    pub mailbox_service: MailboxService,
    pub reports_service: ReportsService,
}

impl World {
    pub fn new() -> Self {
        Self::with_settings(QueueSettings::default())
    }

    pub fn with_settings(settings: QueueSettings) -> Self {
        let hubs = Arc::new(MockHubRepository::new());
        let bindings = Arc::new(MockBindingRepository::new());
        let queue = Arc::new(MockQueueRepository::new());
        let history = Arc::new(MockHistoryRepository::new());
        let notifications = Arc::new(MockNotificationRepository::new());
        let audit = Arc::new(MockAuditSink::new());
        let events = Arc::new(MockEventPublisher::new());
        let locks = Arc::new(HubLocks::new());

        let queue_service = QueueService::new(
            hubs.clone(),
            bindings.clone(),
            queue.clone(),
            history.clone(),
            notifications.clone(),
            audit.clone(),
            events.clone(),
            locks.clone(),
            settings,
        );
        let hub_service = HubService::new(hubs.clone(), queue.clone(), audit.clone());
        let binding_service = BindingService::new(
            hubs.clone(),
            bindings.clone(),
            queue.clone(),
            history.clone(),
            audit.clone(),
            locks,
        );
        let mailbox_service = MailboxService::new(notifications.clone());
        let reports_service = ReportsService::new(hubs.clone(), history.clone());

        Self {
            hubs,
            bindings,
            queue,
            history,
            notifications,
            audit,
            events,
            queue_service,
            hub_service,
            binding_service,
            mailbox_service,
            reports_service,
        }
    }

    pub async fn seed_hub(&self) -> Hub {
        self.hubs
            .create(&NewHub {
                name: "Central Norte".to_string(),
                address: "Av. das Entregas, 100".to_string(),
                latitude: HUB_LAT,
                longitude: HUB_LON,
                radius_meters: 900.0,
                active: true,
            })
            .await
            .expect("seed hub")
    }

    pub async fn bind(&self, professional_id: &str, hub_id: i64) {
        self.bindings
            .create(&despacho_domain::entities::NewBinding {
                hub_id,
                professional_id: professional_id.to_string(),
                display_name: professional_id.to_uppercase(),
            })
            .await
            .expect("seed binding");
    }

    /// Binds and checks the professional in at the hub center.
    pub async fn bind_and_enter(&self, professional_id: &str, hub_id: i64) {
        self.bind(professional_id, hub_id).await;
        self.queue_service
            .enter(&professional(professional_id), HUB_LAT, HUB_LON)
            .await
            .expect("enter queue");
    }

    pub async fn waiting_names(&self, hub_id: i64) -> Vec<(String, i32)> {
        use despacho_domain::repositories::QueueRepository;
        self.queue
            .list_waiting(hub_id)
            .await
            .unwrap()
            .into_iter()
            .map(|e| (e.professional_id, e.position.unwrap()))
            .collect()
    }
}

pub fn professional(id: &str) -> ActorContext {
    ActorContext {
        professional_id: id.to_string(),
        display_name: id.to_uppercase(),
        role: Role::Professional,
    }
}

pub fn admin() -> ActorContext {
    ActorContext {
        professional_id: "admin-1".to_string(),
        display_name: "Admin".to_string(),
        role: Role::Admin,
    }
}
