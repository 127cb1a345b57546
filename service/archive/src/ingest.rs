use std::sync::Arc;

use async_trait::async_trait;
use domain_archive::{
    exception::ArchiveException,
    model::{
        entity::{
            aip::AipState,
            request::{IngestStep, RequestPayload, RequestState},
            AipEntity, ArchiveRequest,
        },
        vo::{
            msg::ArchiveEvent,
            storage::{FileResultInfo, StorageMetadata},
        },
    },
    repository::{AipRepo, RequestRepo},
    service::{
        EventPublisher, IngestRequestService, SessionNotifier, StorageClient,
        StorageDispatchService, StorageReconcileService,
    },
};
use typed_builder::TypedBuilder;
use uuid::Uuid;

#[derive(TypedBuilder)]
pub struct IngestRequestServiceImpl {
    aip_repo: Arc<dyn AipRepo>,
    request_repo: Arc<dyn RequestRepo>,
    dispatcher: Arc<dyn StorageDispatchService>,
    reconciler: Arc<dyn StorageReconcileService>,
    storage_client: Arc<dyn StorageClient>,
    session_notifier: Arc<dyn SessionNotifier>,
    publisher: Arc<dyn EventPublisher>,
}

#[async_trait]
impl IngestRequestService for IngestRequestServiceImpl {
    async fn store_files(&self, request: &mut ArchiveRequest) -> anyhow::Result<()> {
        let (aip_ids, storages) = ingest_payload(request)?;
        let mut aips = self.load_aips(&aip_ids).await?;

        let mut to_store = vec![];
        let mut to_refer = vec![];
        for aip in &aips {
            match self.dispatcher.dispatch(aip, &storages) {
                Ok(plan) => {
                    to_store.extend(plan.files_to_store);
                    to_refer.extend(plan.files_to_reference);
                }
                Err(e) => {
                    // Validation failed before anything was submitted; the
                    // request carries the cause, the AIPs stay untouched.
                    return self.save_and_publish_error(request, &e.to_string()).await;
                }
            }
        }

        let mut group_ids = vec![];
        if !to_store.is_empty() {
            group_ids.push(self.storage_client.store(to_store).await?);
        }
        if !to_refer.is_empty() {
            group_ids.push(self.storage_client.reference(to_refer).await?);
        }
        if group_ids.is_empty() {
            // No file to move, go straight to manifest storage.
            return self.store_aips(request, &mut aips, &storages).await;
        }

        request.remote_step_group_ids = group_ids;
        request.state = RequestState::WaitingRemoteStorage;
        set_step(request, IngestStep::RemoteStorageRequested)?;
        self.request_repo.save(request).await?;
        Ok(())
    }

    async fn handle_remote_store_success(
        &self,
        group_id: &str,
        results: Vec<FileResultInfo>,
    ) -> anyhow::Result<()> {
        let Some(mut request) =
            self.request_repo.find_by_remote_step_group_id(group_id).await?
        else {
            tracing::debug!(group_id, "store result does not match any request");
            return Ok(());
        };
        let (aip_ids, storages) = ingest_payload(&request)?;
        match ingest_step(&request)? {
            IngestStep::RemoteStorageRequested => {
                let mut aips = self.load_aips(&aip_ids).await?;
                self.reconciler.apply_store_results(&mut aips, &results);
                self.aip_repo.save_all(&aips).await?;
                if request.resolve_remote_step(group_id) > 0 {
                    // Another storage request is still pending.
                    self.request_repo.save(&request).await?;
                    return Ok(());
                }
                self.store_aips(&mut request, &mut aips, &storages).await
            }
            IngestStep::RemoteAipStorageRequested => {
                if request.resolve_remote_step(group_id) > 0 {
                    self.request_repo.save(&request).await?;
                    return Ok(());
                }
                self.finalize_successful_request(&mut request, &aip_ids).await
            }
            step => {
                self.save_and_publish_error(&mut request, &format!("Unexpected step {step:?}"))
                    .await
            }
        }
    }

    async fn handle_remote_store_error(
        &self,
        group_id: &str,
        success: Vec<FileResultInfo>,
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
        let (aip_ids, _) = ingest_payload(&request)?;
        let message = match ingest_step(&request)? {
            IngestStep::RemoteStorageRequested => {
                let mut aips = self.load_aips(&aip_ids).await?;
                self.mark_aips_with_errors(
                    &mut aips,
                    &errors,
                    "Error occurred while storing AIP files",
                )
                .await?;
                // Keep whatever did succeed.
                self.reconciler.apply_store_results(&mut aips, &success);
                self.aip_repo.save_all(&aips).await?;
                "Remote file storage request error".to_owned()
            }
            IngestStep::RemoteAipStorageRequested => "Remote AIP storage request error".to_owned(),
            step => format!("Unexpected step {step:?}"),
        };
        // Clear the correlation bookkeeping so a retry can re-dispatch.
        request.remote_step_group_ids.clear();
        self.save_and_publish_error(&mut request, &message).await
    }

    async fn handle_remote_reference_success(
        &self,
        group_id: &str,
        results: Vec<FileResultInfo>,
    ) -> anyhow::Result<()> {
        let Some(mut request) =
            self.request_repo.find_by_remote_step_group_id(group_id).await?
        else {
            tracing::debug!(group_id, "reference result does not match any request");
            return Ok(());
        };
        let (aip_ids, storages) = ingest_payload(&request)?;
        match ingest_step(&request)? {
            IngestStep::RemoteStorageRequested => {
                let mut aips = self.load_aips(&aip_ids).await?;
                for aip in aips.iter_mut() {
                    let update = self.reconciler.add_locations(aip, &results);
                    if update.any() {
                        self.aip_repo.save(aip).await?;
                    }
                }
                if request.resolve_remote_step(group_id) > 0 {
                    self.request_repo.save(&request).await?;
                    return Ok(());
                }
                self.store_aips(&mut request, &mut aips, &storages).await
            }
            _ => Ok(()),
        }
    }

    async fn handle_remote_reference_error(
        &self,
        group_id: &str,
        _success: Vec<FileResultInfo>,
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
        let (aip_ids, _) = ingest_payload(&request)?;
        let mut aips = self.load_aips(&aip_ids).await?;
        self.mark_aips_with_errors(
            &mut aips,
            &errors,
            "Error occurred while referencing AIP files",
        )
        .await?;
        self.aip_repo.save_all(&aips).await?;
        request.remote_step_group_ids.clear();
        self.save_and_publish_error(&mut request, "Remote file reference request error").await
    }

    async fn handle_remote_request_denied(&self, group_id: &str) -> anyhow::Result<()> {
        let Some(mut request) =
            self.request_repo.find_by_remote_step_group_id(group_id).await?
        else {
            tracing::debug!(group_id, "denial does not match any request");
            return Ok(());
        };
        request.remote_step_group_ids.clear();
        self.save_and_publish_error(&mut request, "Remote storage request denied").await
    }
}

impl IngestRequestServiceImpl {
    async fn load_aips(&self, aip_ids: &[Uuid]) -> anyhow::Result<Vec<AipEntity>> {
        let mut aips = Vec::with_capacity(aip_ids.len());
        for id in aip_ids {
            aips.push(self.aip_repo.get_by_id(*id).await?);
        }
        Ok(aips)
    }

    /// Second remote step: persist each manifest checksum and request manifest
    /// storage for the whole request as one group.
    async fn store_aips(
        &self,
        request: &mut ArchiveRequest,
        aips: &mut [AipEntity],
        storages: &[StorageMetadata],
    ) -> anyhow::Result<()> {
        let mut files = vec![];
        for aip in aips.iter_mut() {
            let manifest = serde_json::to_vec(&aip.aip)?;
            let checksum = blake3::hash(&manifest).to_string();
            aip.checksum = Some(checksum.to_owned());
            self.aip_repo.save(aip).await?;
            match self.dispatcher.dispatch_manifest(aip, &checksum, storages) {
                Ok(requests) => files.extend(requests),
                Err(e) => {
                    return self
                        .save_and_publish_error(
                            request,
                            &format!("Cannot store AIP file for AIP {}: {e}", aip.aip_id),
                        )
                        .await;
                }
            }
        }

        let group_id = self.storage_client.store(files).await?;
        request.remote_step_group_ids = vec![group_id];
        request.state = RequestState::WaitingRemoteStorage;
        set_step(request, IngestStep::RemoteAipStorageRequested)?;
        self.request_repo.save(request).await?;
        Ok(())
    }

    async fn finalize_successful_request(
        &self,
        request: &mut ArchiveRequest,
        aip_ids: &[Uuid],
    ) -> anyhow::Result<()> {
        request.state = RequestState::Done;
        self.request_repo.delete(request.id).await?;

        let mut aips = self.load_aips(aip_ids).await?;
        for aip in aips.iter_mut() {
            aip.state = AipState::Stored;
        }
        self.aip_repo.save_all(&aips).await?;
        self.session_notifier.notify_aips_stored(&aips).await?;
        for aip in &aips {
            self.publisher
                .publish(ArchiveEvent::AipStored {
                    aip_id: aip.aip_id.to_owned(),
                    session_owner: aip.session_owner.to_owned(),
                    session: aip.session.to_owned(),
                })
                .await?;
        }
        Ok(())
    }

    /// Route a storage failure onto the AIPs owning the failed file.
    async fn mark_aips_with_errors(
        &self,
        aips: &mut [AipEntity],
        errors: &[FileResultInfo],
        cause: &str,
    ) -> anyhow::Result<()> {
        for aip in aips.iter_mut() {
            for error in errors {
                if !error.request_owners.contains(&aip.aip_id) {
                    continue;
                }
                let detail = error.error_cause.as_deref().unwrap_or("unknown error");
                aip.add_error(format!("{cause}: {detail}"));
                aip.state = AipState::Error;
                self.session_notifier.notify_storage_failed(aip).await?;
            }
        }
        Ok(())
    }

    async fn save_and_publish_error(
        &self,
        request: &mut ArchiveRequest,
        message: &str,
    ) -> anyhow::Result<()> {
        request.state = RequestState::Error;
        request.add_error(message.to_owned());
        self.request_repo.save(request).await?;
        self.publisher
            .publish(ArchiveEvent::RequestFailed {
                request_id: request.id,
                errors: request.errors.to_owned(),
            })
            .await?;
        Ok(())
    }
}

fn ingest_payload(request: &ArchiveRequest) -> anyhow::Result<(Vec<Uuid>, Vec<StorageMetadata>)> {
    match &request.payload {
        RequestPayload::Ingest {
            aip_ids, storages, ..
        } => Ok((aip_ids.to_owned(), storages.to_owned())),
        _ => Err(ArchiveException::UnexpectedPayload {
            id: request.id,
            expected: "ingest",
        }
        .into()),
    }
}

fn ingest_step(request: &ArchiveRequest) -> anyhow::Result<IngestStep> {
    match &request.payload {
        RequestPayload::Ingest { step, .. } => Ok(*step),
        _ => Err(ArchiveException::UnexpectedPayload {
            id: request.id,
            expected: "ingest",
        }
        .into()),
    }
}

fn set_step(request: &mut ArchiveRequest, new_step: IngestStep) -> anyhow::Result<()> {
    match &mut request.payload {
        RequestPayload::Ingest { step, .. } => {
            *step = new_step;
            Ok(())
        }
        _ => Err(ArchiveException::UnexpectedPayload {
            id: request.id,
            expected: "ingest",
        }
        .into()),
    }
}
