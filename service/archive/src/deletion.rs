use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use domain_archive::{
    exception::ArchiveException,
    model::{
        entity::{
            aip::AipState,
            request::{DeletionMode, RequestKind, RequestPayload, RequestState},
            AipEntity, ArchiveRequest, LastAip,
        },
        vo::{
            msg::ArchiveEvent,
            storage::{FileDeletionRequest, FileResultInfo},
        },
    },
    repository::{AipRepo, LastAipRepo, RequestRepo},
    service::{DeletionService, EventPublisher, SessionNotifier, StorageClient},
};
use typed_builder::TypedBuilder;
use uuid::Uuid;

#[derive(TypedBuilder)]
pub struct DeletionServiceImpl {
    aip_repo: Arc<dyn AipRepo>,
    last_aip_repo: Arc<dyn LastAipRepo>,
    request_repo: Arc<dyn RequestRepo>,
    storage_client: Arc<dyn StorageClient>,
    session_notifier: Arc<dyn SessionNotifier>,
    publisher: Arc<dyn EventPublisher>,
}

#[async_trait]
impl DeletionService for DeletionServiceImpl {
    async fn process_deletion(
        &self,
        sip_id: &str,
        delete_irrevocably: bool,
    ) -> anyhow::Result<()> {
        let mut aips = self.aip_repo.find_by_sip_id(sip_id).await?;
        if aips.is_empty() {
            return Ok(());
        }
        self.session_notifier
            .notify_aips_deleted(&aips[0].session_owner, &aips[0].session, aips.len())
            .await?;

        // Supersede whatever still works against these entities. Deletion
        // requests themselves are the orchestrators, not superseded work.
        for aip in &aips {
            let mut pending: Vec<ArchiveRequest> = self
                .request_repo
                .find_pending_by_aip_id(aip.id)
                .await?
                .into_iter()
                .filter(|r| r.kind() != RequestKind::Deletion)
                .collect();
            if pending.is_empty() {
                continue;
            }
            self.cancel_storage_requests(&mut pending).await?;
            for request in &pending {
                self.request_repo.delete(request.id).await?;
            }
        }

        let ids: Vec<Uuid> = aips.iter().map(|a| a.id).collect();
        for aip in aips.iter_mut() {
            aip.state = AipState::Deleted;
            aip.last = false;
            aip.last_update = Utc::now();
        }
        if delete_irrevocably {
            self.aip_repo.delete_all(&ids).await?;
        } else {
            self.aip_repo.save_all(&aips).await?;
        }

        self.manage_last_flag(&aips).await?;

        for aip in &aips {
            self.publisher
                .publish(ArchiveEvent::AipDeleted {
                    aip_id: aip.aip_id.to_owned(),
                    provider_id: aip.provider_id.to_owned(),
                    session_owner: aip.session_owner.to_owned(),
                    session: aip.session.to_owned(),
                })
                .await?;
        }
        Ok(())
    }

    async fn schedule_linked_files_deletion(
        &self,
        request: &mut ArchiveRequest,
    ) -> anyhow::Result<()> {
        let RequestPayload::Deletion { sip_id, .. } = &request.payload else {
            return Err(ArchiveException::UnexpectedPayload {
                id: request.id,
                expected: "deletion",
            }
            .into());
        };

        let aips = self.aip_repo.find_by_sip_id(sip_id).await?;
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut deletions = vec![];
        for aip in &aips {
            for ci in &aip.aip.content_informations {
                let object = &ci.data_object;
                for location in &object.locations {
                    // Not stored yet, nothing to delete remotely.
                    let Some(storage) = &location.storage else {
                        continue;
                    };
                    if seen.insert((object.checksum.to_owned(), storage.to_owned())) {
                        deletions.push(FileDeletionRequest {
                            owner: aip.aip_id.to_owned(),
                            checksum: object.checksum.to_owned(),
                            storage: storage.to_owned(),
                        });
                    }
                }
            }
        }

        if deletions.is_empty() {
            // Nothing ever reached a storage; the caller completes the
            // deletion synchronously.
            return Ok(());
        }

        let group_id = self.storage_client.delete(deletions).await?;
        request.remote_step_group_ids = vec![group_id];
        request.state = RequestState::ToSchedule;
        self.request_repo.save(request).await?;
        Ok(())
    }

    async fn handle_files_deleted(
        &self,
        group_id: &str,
        _results: Vec<FileResultInfo>,
    ) -> anyhow::Result<()> {
        let Some(mut request) =
            self.request_repo.find_by_remote_step_group_id(group_id).await?
        else {
            tracing::debug!(group_id, "file deletion result does not match any request");
            return Ok(());
        };
        if request.resolve_remote_step(group_id) > 0 {
            // Another deletion group is still pending.
            self.request_repo.save(&request).await?;
            return Ok(());
        }
        request.state = RequestState::Running;
        self.request_repo.save(&request).await?;

        let RequestPayload::Deletion {
            sip_id,
            deletion_mode,
            ..
        } = &request.payload
        else {
            return Err(ArchiveException::UnexpectedPayload {
                id: request.id,
                expected: "deletion",
            }
            .into());
        };
        self.process_deletion(sip_id, *deletion_mode == DeletionMode::Irrevocably).await?;
        self.request_repo.delete(request.id).await?;
        Ok(())
    }

    async fn deletion_already_pending(&self, sip_id: &str) -> anyhow::Result<bool> {
        self.request_repo.exists_deletion_pending(sip_id).await
    }

    async fn cancel_storage_requests(
        &self,
        requests: &mut [ArchiveRequest],
    ) -> anyhow::Result<()> {
        let group_ids: Vec<String> = requests
            .iter()
            .flat_map(|r| r.remote_step_group_ids.iter().cloned())
            .collect();
        if !group_ids.is_empty() {
            // A failed cancel propagates before any local change.
            self.storage_client.cancel(&group_ids).await?;
        }
        for request in requests.iter_mut() {
            // The post-cancel transition is part of the cancel itself, so no
            // call site can leave a stale Running request behind.
            request.remote_step_group_ids.clear();
            request.state = RequestState::Error;
            request.add_error("Outstanding storage requests cancelled before completion.");
            self.request_repo.save(request).await?;
        }
        Ok(())
    }
}

impl DeletionServiceImpl {
    /// Restore the one-last-per-provider-id invariant after entities vanished.
    async fn manage_last_flag(&self, deleted: &[AipEntity]) -> anyhow::Result<()> {
        let ids: Vec<Uuid> = deleted.iter().map(|a| a.id).collect();
        self.last_aip_repo.delete_by_aip_ids(&ids).await?;

        let provider_ids: HashSet<&str> =
            deleted.iter().map(|a| a.provider_id.as_str()).collect();
        for provider_id in provider_ids {
            let survivors = self.aip_repo.find_by_provider_id(provider_id).await?;
            let best = survivors
                .into_iter()
                .filter(|a| a.state != AipState::Deleted && !ids.contains(&a.id))
                .max_by_key(|a| a.version);
            let Some(mut best) = best else {
                continue;
            };
            if !best.last {
                best.last = true;
                self.aip_repo.save(&best).await?;
                self.last_aip_repo.insert(&LastAip::new(best.id, provider_id)).await?;
            }
        }
        Ok(())
    }
}
