use tokio::sync::broadcast;

/// Fan-out for the shutdown signal: every long-lived task subscribes and
/// drains when `shutdown` fires.
pub struct ShutdownManager {
    sender: broadcast::Sender<()>,
}

impl ShutdownManager {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    pub fn shutdown(&self) {
        // Fails only when nothing is listening anymore.
        let _ = self.sender.send(());
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}
