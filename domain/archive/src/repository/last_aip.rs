use async_trait::async_trait;
use uuid::Uuid;

use crate::model::entity::LastAip;

#[async_trait]
pub trait LastAipRepo: Send + Sync {
    async fn find_by_provider_id(&self, provider_id: &str) -> anyhow::Result<Option<LastAip>>;
    async fn insert(&self, last: &LastAip) -> anyhow::Result<()>;
    /// Remove index rows pointing at any of the given internal aip ids.
    async fn delete_by_aip_ids(&self, aip_ids: &[Uuid]) -> anyhow::Result<()>;
}
