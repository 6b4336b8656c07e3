mod sqlite_binding_repository;
mod sqlite_history_repository;
mod sqlite_hub_repository;
mod sqlite_notification_repository;
mod sqlite_queue_repository;

pub use sqlite_binding_repository::SqliteBindingRepository;
pub use sqlite_history_repository::SqliteHistoryRepository;
pub use sqlite_hub_repository::SqliteHubRepository;
pub use sqlite_notification_repository::SqliteNotificationRepository;
pub use sqlite_queue_repository::SqliteQueueRepository;
