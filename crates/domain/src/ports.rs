//! Outbound ports consumed by the engine and implemented by infrastructure.

use async_trait::async_trait;

/// Fire-and-forget audit trail. Implementations swallow their own failures;
/// the triggering operation never observes them.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(
        &self,
        action: &str,
        category: &str,
        entity_type: &str,
        entity_id: &str,
        metadata: serde_json::Value,
    );
}
