use async_trait::async_trait;

use crate::model::entity::ArchiveRequest;

/// Applies tag and category edits to the AIPs of an update request.
#[async_trait]
pub trait AipUpdateService: Send + Sync {
    async fn run_update(&self, request: &mut ArchiveRequest) -> anyhow::Result<()>;
}
