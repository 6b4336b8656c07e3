use despacho_domain::events::{DomainEvent, QueueEvent, QueueEventPublisher};
use tokio::sync::broadcast;
use tracing::debug;

/// Queue event fan-out over a tokio broadcast channel. Injected into the
/// engine; subscribers (websocket bridges, projections) attach and detach
/// freely without the engine knowing about them.
pub struct BroadcastEventBus {
    sender: broadcast::Sender<QueueEvent>,
}

impl BroadcastEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl QueueEventPublisher for BroadcastEventBus {
    fn publish(&self, event: QueueEvent) {
        debug!(
            event_type = event.event_type(),
            hub_id = %event.aggregate_id(),
            "publishing queue event"
        );
        // send only fails when nobody is subscribed; that's fine.
        let _ = self.sender.send(event);
    }
}
