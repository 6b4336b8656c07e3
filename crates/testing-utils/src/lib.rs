//! In-memory mock implementations and entity builders for unit tests that
//! don't want a real database behind the repositories.

pub mod builders;
pub mod mocks;

pub use builders::{BindingBuilder, HubBuilder, QueueEntryBuilder};
pub use mocks::{
    MockAuditSink, MockBindingRepository, MockEventPublisher, MockHistoryRepository,
    MockHubRepository, MockNotificationRepository, MockQueueRepository,
};
