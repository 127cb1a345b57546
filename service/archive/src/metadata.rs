use std::sync::Arc;

use async_trait::async_trait;
use domain_archive::{
    exception::ArchiveException,
    model::{
        entity::{
            request::{RequestPayload, RequestState},
            ArchiveRequest,
        },
        vo::{msg::ArchiveEvent, storage::FileResultInfo},
    },
    repository::{AipRepo, RequestRepo},
    service::{AipSaveMetadataService, EventPublisher, StorageClient, StorageDispatchService},
};
use typed_builder::TypedBuilder;

#[derive(TypedBuilder)]
pub struct AipSaveMetadataServiceImpl {
    aip_repo: Arc<dyn AipRepo>,
    request_repo: Arc<dyn RequestRepo>,
    dispatcher: Arc<dyn StorageDispatchService>,
    storage_client: Arc<dyn StorageClient>,
    publisher: Arc<dyn EventPublisher>,
}

#[async_trait]
impl AipSaveMetadataService for AipSaveMetadataServiceImpl {
    async fn save_metadata(&self, request: &mut ArchiveRequest) -> anyhow::Result<()> {
        let RequestPayload::SaveMetadata { aip_ids, storages } = &request.payload else {
            return Err(ArchiveException::UnexpectedPayload {
                id: request.id,
                expected: "save metadata",
            }
            .into());
        };
        let (aip_ids, storages) = (aip_ids.to_owned(), storages.to_owned());

        let mut files = vec![];
        for id in &aip_ids {
            let mut aip = self.aip_repo.get_by_id(*id).await?;
            let manifest = serde_json::to_vec(&aip.aip)?;
            let checksum = blake3::hash(&manifest).to_string();
            aip.checksum = Some(checksum.to_owned());
            self.aip_repo.save(&aip).await?;
            files.extend(self.dispatcher.dispatch_manifest(&aip, &checksum, &storages)?);
        }

        if files.is_empty() {
            // Nowhere to put the manifests, the request is done.
            self.request_repo.delete(request.id).await?;
            return Ok(());
        }

        let group_id = self.storage_client.store(files).await?;
        request.remote_step_group_ids = vec![group_id];
        request.state = RequestState::ToSchedule;
        self.request_repo.save(request).await?;
        Ok(())
    }

    async fn handle_store_success(
        &self,
        group_id: &str,
        _results: Vec<FileResultInfo>,
    ) -> anyhow::Result<()> {
        let Some(mut request) =
            self.request_repo.find_by_remote_step_group_id(group_id).await?
        else {
            tracing::debug!(group_id, "metadata store result does not match any request");
            return Ok(());
        };
        if request.resolve_remote_step(group_id) > 0 {
            self.request_repo.save(&request).await?;
            return Ok(());
        }
        // All manifests stored, the request is fully processed.
        self.request_repo.delete(request.id).await?;
        Ok(())
    }

    async fn handle_store_error(
        &self,
        group_id: &str,
        errors: Vec<FileResultInfo>,
    ) -> anyhow::Result<()> {
        let Some(mut request) =
            self.request_repo.find_by_remote_step_group_id(group_id).await?
        else {
            return Ok(());
        };
        for error in &errors {
            if let Some(cause) = &error.error_cause {
                request.add_error(cause.to_owned());
            }
        }
        request.remote_step_group_ids.clear();
        request.state = RequestState::Error;
        request.add_error("Remote AIP metadata storage request error");
        self.request_repo.save(&request).await?;
        self.publisher
            .publish(ArchiveEvent::RequestFailed {
                request_id: request.id,
                errors: request.errors.to_owned(),
            })
            .await?;
        Ok(())
    }
}
