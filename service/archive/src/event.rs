use std::sync::Arc;

use async_trait::async_trait;
use domain_archive::{
    model::{
        entity::request::RequestKind,
        vo::storage::{StorageResultBatch, StorageResultKind},
    },
    repository::RequestRepo,
    service::{
        AipSaveMetadataService, DeletionService, IngestRequestService, StorageEventService,
    },
};
use typed_builder::TypedBuilder;

/// Routes one batched storage callback to the service owning the request
/// behind its correlation id.
#[derive(TypedBuilder)]
pub struct StorageEventServiceImpl {
    request_repo: Arc<dyn RequestRepo>,
    ingest_service: Arc<dyn IngestRequestService>,
    metadata_service: Arc<dyn AipSaveMetadataService>,
    deletion_service: Arc<dyn DeletionService>,
}

#[async_trait]
impl StorageEventService for StorageEventServiceImpl {
    async fn handle(&self, batch: StorageResultBatch) -> anyhow::Result<()> {
        let Some(request) =
            self.request_repo.find_by_remote_step_group_id(&batch.group_id).await?
        else {
            // Results can outlive a superseded request; that is not an error.
            tracing::debug!(
                group_id = %batch.group_id,
                "storage result does not match any pending request"
            );
            return Ok(());
        };

        let group_id = batch.group_id.as_str();
        match (request.kind(), batch.kind) {
            (RequestKind::Ingest, StorageResultKind::Store) => {
                if batch.errors.is_empty() {
                    self.ingest_service.handle_remote_store_success(group_id, batch.success).await
                } else {
                    self.ingest_service
                        .handle_remote_store_error(group_id, batch.success, batch.errors)
                        .await
                }
            }
            (RequestKind::Ingest, StorageResultKind::Reference) => {
                if batch.errors.is_empty() {
                    self.ingest_service
                        .handle_remote_reference_success(group_id, batch.success)
                        .await
                } else {
                    self.ingest_service
                        .handle_remote_reference_error(group_id, batch.success, batch.errors)
                        .await
                }
            }
            (RequestKind::Ingest, StorageResultKind::RequestDenied) => {
                self.ingest_service.handle_remote_request_denied(group_id).await
            }
            (RequestKind::SaveMetadata, StorageResultKind::Store) => {
                if batch.errors.is_empty() {
                    self.metadata_service.handle_store_success(group_id, batch.success).await
                } else {
                    self.metadata_service.handle_store_error(group_id, batch.errors).await
                }
            }
            (RequestKind::SaveMetadata, StorageResultKind::RequestDenied) => {
                self.metadata_service.handle_store_error(group_id, batch.errors).await
            }
            (RequestKind::Deletion, StorageResultKind::Deletion) => {
                self.deletion_service.handle_files_deleted(group_id, batch.success).await
            }
            (kind, result) => {
                tracing::warn!(?kind, ?result, "unexpected storage result for request");
                Ok(())
            }
        }
    }
}
