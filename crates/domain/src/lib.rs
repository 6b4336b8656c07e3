//! Domain layer of the dispatch-queue service: entities, value objects,
//! geofence math, authorization policy, domain events and the repository
//! abstractions implemented by the infrastructure crate.

pub mod entities;
pub mod events;
pub mod geo;
pub mod policy;
pub mod ports;
pub mod repositories;
pub mod value_objects;

pub use entities::{
    Binding, EntryStatus, HistoryAction, HistoryEvent, Hub, Notification, NotificationKind,
    QueueEntry, POSITION_REASON_MOVED_TO_BACK,
};
pub use value_objects::{ActorContext, Coordinates, GeofenceCheck, NotificationPayload, Role};
