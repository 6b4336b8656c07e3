//! The dispatch-queue engine: state machine and admin services built on the
//! domain repositories. All structural queue mutations are serialized per
//! hub through [`HubLocks`] and applied atomically by the repository layer.

pub mod binding_service;
pub mod hub_locks;
pub mod hub_service;
pub mod mailbox_service;
pub mod queue_service;
pub mod reports_service;
pub mod settings;
pub mod views;

pub use binding_service::BindingService;
pub use hub_locks::HubLocks;
pub use hub_service::HubService;
pub use mailbox_service::MailboxService;
pub use queue_service::QueueService;
pub use reports_service::{HistoryPage, ReportsService, StatsView};
pub use settings::QueueSettings;
pub use views::{BindingStatus, EnterOutcome, OverdueAlert, PositionView, QueueView};
