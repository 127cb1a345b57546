use async_trait::async_trait;

use crate::model::{entity::ArchiveRequest, vo::storage::FileResultInfo};

/// Cascades AIP deletion: cancels in-flight storage requests, issues
/// file-deletion requests, removes entities, repairs the last-flag index.
#[async_trait]
pub trait DeletionService: Send + Sync {
    /// Delete every AIP version under a SIP. No version found is a no-op.
    /// Repairs the last-flag index afterwards and publishes one deleted
    /// notification per AIP.
    async fn process_deletion(&self, sip_id: &str, delete_irrevocably: bool)
        -> anyhow::Result<()>;

    /// One file-deletion request per distinct (checksum, storage) across all
    /// AIPs of the SIP; locations not yet stored are skipped. Records the
    /// correlation id and moves the request to ToSchedule. With nothing
    /// stored the request stays Running and the caller finishes the deletion
    /// synchronously.
    async fn schedule_linked_files_deletion(
        &self,
        request: &mut ArchiveRequest,
    ) -> anyhow::Result<()>;

    /// Storage-service confirmation of linked-files deletion. Once every
    /// correlation id of the request has resolved, the entities are removed
    /// and the request with them.
    async fn handle_files_deleted(
        &self,
        group_id: &str,
        results: Vec<FileResultInfo>,
    ) -> anyhow::Result<()>;

    /// Guard against scheduling the same deletion twice.
    async fn deletion_already_pending(&self, sip_id: &str) -> anyhow::Result<bool>;

    /// Cancel outstanding storage operations of superseded requests. Errors
    /// from the storage client propagate with no local change; on success
    /// each request loses its correlation ids and is flagged Error so none of
    /// them can linger as a stale Running row.
    async fn cancel_storage_requests(
        &self,
        requests: &mut [ArchiveRequest],
    ) -> anyhow::Result<()>;
}
