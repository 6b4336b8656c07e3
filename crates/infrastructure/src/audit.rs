use async_trait::async_trait;
use despacho_domain::ports::AuditSink;
use tracing::info;
use uuid::Uuid;

/// Audit sink that writes structured log lines. Stands in for the external
/// audit collector; the contract is fire-and-forget either way.
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(
        &self,
        action: &str,
        category: &str,
        entity_type: &str,
        entity_id: &str,
        metadata: serde_json::Value,
    ) {
        info!(
            audit_id = %Uuid::new_v4(),
            action,
            category,
            entity_type,
            entity_id,
            metadata = %metadata,
            "audit"
        );
    }
}
