use async_trait::async_trait;
use domain_archive::{
    model::{entity::AipEntity, vo::msg::ArchiveEvent},
    service::{EventPublisher, SessionNotifier},
};

/// Session metrics rendered as structured log lines.
pub struct TracingSessionNotifier;

#[async_trait]
impl SessionNotifier for TracingSessionNotifier {
    async fn increment_new_versions(
        &self,
        session_owner: &str,
        session: &str,
        count: usize,
    ) -> anyhow::Result<()> {
        tracing::info!(session_owner, session, count, "session metric: new versions");
        Ok(())
    }

    async fn increment_replaced(&self, session_owner: &str, session: &str) -> anyhow::Result<()> {
        tracing::info!(session_owner, session, "session metric: version replaced");
        Ok(())
    }

    async fn notify_aips_stored(&self, aips: &[AipEntity]) -> anyhow::Result<()> {
        tracing::info!(count = aips.len(), "session metric: aips stored");
        Ok(())
    }

    async fn notify_aips_deleted(
        &self,
        session_owner: &str,
        session: &str,
        count: usize,
    ) -> anyhow::Result<()> {
        tracing::info!(session_owner, session, count, "session metric: aips deleted");
        Ok(())
    }

    async fn notify_storage_failed(&self, aip: &AipEntity) -> anyhow::Result<()> {
        tracing::warn!(aip_id = %aip.aip_id, "session metric: storage failed");
        Ok(())
    }
}

/// Event sink rendered as structured log lines.
pub struct TracingEventPublisher;

#[async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, event: ArchiveEvent) -> anyhow::Result<()> {
        tracing::info!(?event, "archive event");
        Ok(())
    }
}
