//! Queue domain events, announced through an injected publisher so the core
//! never reaches into process-wide broadcast state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub trait DomainEvent: Send + Sync {
    fn event_id(&self) -> Uuid;
    fn event_type(&self) -> &str;
    fn occurred_at(&self) -> DateTime<Utc>;
    fn aggregate_id(&self) -> String;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum QueueEvent {
    ProfessionalEntered {
        id: Uuid,
        hub_id: i64,
        professional_id: String,
        position: i32,
        occurred_at: DateTime<Utc>,
    },
    ProfessionalReturned {
        id: Uuid,
        hub_id: i64,
        professional_id: String,
        position: i32,
        priority: bool,
        occurred_at: DateTime<Utc>,
    },
    ProfessionalDispatched {
        id: Uuid,
        hub_id: i64,
        professional_id: String,
        single_ride: bool,
        occurred_at: DateTime<Utc>,
    },
    ProfessionalMovedToBack {
        id: Uuid,
        hub_id: i64,
        professional_id: String,
        position: i32,
        occurred_at: DateTime<Utc>,
    },
    ProfessionalRemoved {
        id: Uuid,
        hub_id: i64,
        professional_id: String,
        voluntary: bool,
        occurred_at: DateTime<Utc>,
    },
}

impl DomainEvent for QueueEvent {
    fn event_id(&self) -> Uuid {
        match self {
            QueueEvent::ProfessionalEntered { id, .. } => *id,
            QueueEvent::ProfessionalReturned { id, .. } => *id,
            QueueEvent::ProfessionalDispatched { id, .. } => *id,
            QueueEvent::ProfessionalMovedToBack { id, .. } => *id,
            QueueEvent::ProfessionalRemoved { id, .. } => *id,
        }
    }

    fn event_type(&self) -> &str {
        match self {
            QueueEvent::ProfessionalEntered { .. } => "ProfessionalEntered",
            QueueEvent::ProfessionalReturned { .. } => "ProfessionalReturned",
            QueueEvent::ProfessionalDispatched { .. } => "ProfessionalDispatched",
            QueueEvent::ProfessionalMovedToBack { .. } => "ProfessionalMovedToBack",
            QueueEvent::ProfessionalRemoved { .. } => "ProfessionalRemoved",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            QueueEvent::ProfessionalEntered { occurred_at, .. } => *occurred_at,
            QueueEvent::ProfessionalReturned { occurred_at, .. } => *occurred_at,
            QueueEvent::ProfessionalDispatched { occurred_at, .. } => *occurred_at,
            QueueEvent::ProfessionalMovedToBack { occurred_at, .. } => *occurred_at,
            QueueEvent::ProfessionalRemoved { occurred_at, .. } => *occurred_at,
        }
    }

    fn aggregate_id(&self) -> String {
        match self {
            QueueEvent::ProfessionalEntered { hub_id, .. } => hub_id.to_string(),
            QueueEvent::ProfessionalReturned { hub_id, .. } => hub_id.to_string(),
            QueueEvent::ProfessionalDispatched { hub_id, .. } => hub_id.to_string(),
            QueueEvent::ProfessionalMovedToBack { hub_id, .. } => hub_id.to_string(),
            QueueEvent::ProfessionalRemoved { hub_id, .. } => hub_id.to_string(),
        }
    }
}

/// Publish side of the queue event bus. Publishing is best-effort: listeners
/// coming and going must never affect the queue mutation that emitted the
/// event.
pub trait QueueEventPublisher: Send + Sync {
    fn publish(&self, event: QueueEvent);
}
