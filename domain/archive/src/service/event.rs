use async_trait::async_trait;

use crate::model::vo::storage::StorageResultBatch;

/// Single reconciliation entrypoint for batched storage callbacks: resolves
/// the owning request by correlation id and routes to the matching handler.
#[async_trait]
pub trait StorageEventService: Send + Sync {
    async fn handle(&self, batch: StorageResultBatch) -> anyhow::Result<()>;
}
