use serde::{Deserialize, Serialize};

/// Tunables of the queue engine, loaded from the application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueSettings {
    /// Minutes en route after which an entry shows up in overdue alerts.
    pub overdue_minutes: i64,
    /// Neighbors shown ahead and behind in the self-service position view.
    pub neighbor_span: usize,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            overdue_minutes: 90,
            neighbor_span: 3,
        }
    }
}
