//! Read models returned by the engine services.

use despacho_domain::entities::{Binding, Hub, QueueEntry};
use serde::Serialize;

/// Result of an Enter call: a fresh entrance or, when the professional was
/// en route, a return with the re-insertion mode that applied.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EnterOutcome {
    Entered { entry: QueueEntry },
    Returned { entry: QueueEntry, priority: bool },
}

impl EnterOutcome {
    pub fn entry(&self) -> &QueueEntry {
        match self {
            EnterOutcome::Entered { entry } => entry,
            EnterOutcome::Returned { entry, .. } => entry,
        }
    }
}

/// Self-service view of a professional's own place in the queue.
#[derive(Debug, Clone, Serialize)]
pub struct PositionView {
    pub entry: QueueEntry,
    pub total_waiting: i64,
    pub ahead: Vec<QueueNeighbor>,
    pub behind: Vec<QueueNeighbor>,
    pub waited_minutes: i64,
    pub en_route_minutes: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueNeighbor {
    pub position: i32,
    pub display_name: String,
}

/// Admin view of one hub's queue.
#[derive(Debug, Clone, Serialize)]
pub struct QueueView {
    pub hub_id: i64,
    pub waiting: Vec<QueueEntry>,
    pub en_route: Vec<QueueEntry>,
    pub alerts: Vec<OverdueAlert>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverdueAlert {
    pub professional_id: String,
    pub display_name: String,
    pub minutes_en_route: i64,
}

/// Answer to "which hub am I bound to, and where am I in its queue?".
#[derive(Debug, Clone, Serialize)]
pub struct BindingStatus {
    pub binding: Option<Binding>,
    pub hub: Option<Hub>,
    pub entry: Option<QueueEntry>,
}
