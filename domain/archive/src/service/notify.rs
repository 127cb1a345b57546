use async_trait::async_trait;

use crate::model::{entity::AipEntity, vo::msg::ArchiveEvent};

/// Session metric counters, grouped by (session owner, session).
/// Purely observational.
#[async_trait]
pub trait SessionNotifier: Send + Sync {
    async fn increment_new_versions(&self, session_owner: &str, session: &str, count: usize)
        -> anyhow::Result<()>;
    async fn increment_replaced(&self, session_owner: &str, session: &str)
        -> anyhow::Result<()>;
    async fn notify_aips_stored(&self, aips: &[AipEntity]) -> anyhow::Result<()>;
    async fn notify_aips_deleted(&self, session_owner: &str, session: &str, count: usize)
        -> anyhow::Result<()>;
    async fn notify_storage_failed(&self, aip: &AipEntity) -> anyhow::Result<()>;
}

/// Fire-and-forget notification sink.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: ArchiveEvent) -> anyhow::Result<()>;
}
