use async_trait::async_trait;

use crate::model::{entity::ArchiveRequest, vo::storage::FileResultInfo};

/// Re-saves AIP manifests after a content change.
#[async_trait]
pub trait AipSaveMetadataService: Send + Sync {
    /// Compute each referenced AIP's manifest checksum, submit the manifest
    /// storage requests and move the request to ToSchedule.
    async fn save_metadata(&self, request: &mut ArchiveRequest) -> anyhow::Result<()>;

    async fn handle_store_success(
        &self,
        group_id: &str,
        results: Vec<FileResultInfo>,
    ) -> anyhow::Result<()>;

    async fn handle_store_error(
        &self,
        group_id: &str,
        errors: Vec<FileResultInfo>,
    ) -> anyhow::Result<()>;
}
