//! Infrastructure implementations: SQLite repositories over sqlx, the
//! broadcast event bus and the tracing audit sink.

pub mod audit;
pub mod database;
pub mod event_bus;

pub use audit::TracingAuditSink;
pub use database::sqlite::{
    SqliteBindingRepository, SqliteHistoryRepository, SqliteHubRepository,
    SqliteNotificationRepository, SqliteQueueRepository,
};
pub use database::{connect_embedded, run_migrations};
pub use event_bus::BroadcastEventBus;
