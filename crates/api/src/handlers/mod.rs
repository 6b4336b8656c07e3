pub mod bindings;
pub mod health;
pub mod hubs;
pub mod metrics;
pub mod notifications;
pub mod professional;
pub mod queue;
pub mod reports;
