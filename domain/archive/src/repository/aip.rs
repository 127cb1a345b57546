use async_trait::async_trait;
use uuid::Uuid;

use crate::model::entity::AipEntity;

#[async_trait]
pub trait AipRepo: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<AipEntity>;
    /// Look up by public URN.
    async fn find_by_aip_id(&self, aip_id: &str) -> anyhow::Result<Option<AipEntity>>;
    /// All versions sharing a provider id, deleted ones included.
    async fn find_by_provider_id(&self, provider_id: &str) -> anyhow::Result<Vec<AipEntity>>;
    /// The entity currently flagged last for a provider id.
    async fn find_last_by_provider_id(&self, provider_id: &str)
        -> anyhow::Result<Option<AipEntity>>;
    /// All versions derived from one submission package.
    async fn find_by_sip_id(&self, sip_id: &str) -> anyhow::Result<Vec<AipEntity>>;
    async fn save(&self, aip: &AipEntity) -> anyhow::Result<()>;
    async fn save_all(&self, aips: &[AipEntity]) -> anyhow::Result<()>;
    async fn delete_all(&self, ids: &[Uuid]) -> anyhow::Result<()>;
}
