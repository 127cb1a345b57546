use async_trait::async_trait;

use crate::model::{entity::ArchiveRequest, vo::storage::FileResultInfo};

/// Lifecycle of an ingest request: store files, then store manifests, then
/// finalize — advancing only when every outstanding correlation id of the
/// current step has resolved.
#[async_trait]
pub trait IngestRequestService: Send + Sync {
    /// Dispatch the request's AIPs, submit the store/reference batches and
    /// record the returned correlation ids.
    async fn store_files(&self, request: &mut ArchiveRequest) -> anyhow::Result<()>;

    async fn handle_remote_store_success(
        &self,
        group_id: &str,
        results: Vec<FileResultInfo>,
    ) -> anyhow::Result<()>;

    async fn handle_remote_store_error(
        &self,
        group_id: &str,
        success: Vec<FileResultInfo>,
        errors: Vec<FileResultInfo>,
    ) -> anyhow::Result<()>;

    async fn handle_remote_reference_success(
        &self,
        group_id: &str,
        results: Vec<FileResultInfo>,
    ) -> anyhow::Result<()>;

    async fn handle_remote_reference_error(
        &self,
        group_id: &str,
        success: Vec<FileResultInfo>,
        errors: Vec<FileResultInfo>,
    ) -> anyhow::Result<()>;

    /// The storage service refused the whole group.
    async fn handle_remote_request_denied(&self, group_id: &str) -> anyhow::Result<()>;
}
