use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use domain_archive::{
    command::{JobCommand, JobKind},
    model::{
        entity::{
            request::{RequestKind, RequestState},
            ArchiveRequest,
        },
        vo::msg::ArchiveEvent,
    },
    repository::RequestRepo,
    service::{EventPublisher, JobClient, RequestScheduleService},
};
use typed_builder::TypedBuilder;
use uuid::Uuid;

#[derive(TypedBuilder)]
pub struct RequestScheduleServiceImpl {
    request_repo: Arc<dyn RequestRepo>,
    job_client: Arc<dyn JobClient>,
    publisher: Arc<dyn EventPublisher>,
    #[builder(default = 200)]
    page_size: usize,
}

#[async_trait]
impl RequestScheduleService for RequestScheduleServiceImpl {
    async fn schedule_pending(&self) -> anyhow::Result<usize> {
        let page = self
            .request_repo
            .find_page_by_state(RequestState::Created, self.page_size)
            .await?;

        let mut batches: HashMap<JobKind, Vec<ArchiveRequest>> = HashMap::new();
        for mut request in page {
            if request.kind().is_blocking() && self.has_conflict(&request).await? {
                // Serialize conflicting mutations per AIP scope.
                request.state = RequestState::Blocked;
                self.request_repo.save(&request).await?;
                continue;
            }
            request.state = RequestState::Running;
            self.request_repo.save(&request).await?;
            batches.entry(job_kind(request.kind())).or_default().push(request);
        }

        let mut scheduled = 0;
        let mut pending_batches: Vec<(JobKind, Vec<ArchiveRequest>)> =
            batches.into_iter().collect();
        while let Some((kind, requests)) = pending_batches.pop() {
            let request_ids: Vec<Uuid> = requests.iter().map(|r| r.id).collect();
            if let Err(e) = self.job_client.submit(JobCommand { kind, request_ids }).await {
                // Nothing is in flight for the unsubmitted batches, so none of
                // their requests may stay Running.
                for mut request in requests {
                    request.state = RequestState::Created;
                    self.request_repo.save(&request).await?;
                }
                for (_, requests) in pending_batches {
                    for mut request in requests {
                        request.state = RequestState::Created;
                        self.request_repo.save(&request).await?;
                    }
                }
                return Err(e);
            }
            scheduled += requests.len();
        }
        Ok(scheduled)
    }

    async fn release_blocked(&self) -> anyhow::Result<usize> {
        let page = self
            .request_repo
            .find_page_by_state(RequestState::Blocked, self.page_size)
            .await?;
        let mut released = 0;
        for mut request in page {
            if self.has_conflict(&request).await? {
                continue;
            }
            request.state = RequestState::Created;
            self.request_repo.save(&request).await?;
            released += 1;
        }
        Ok(released)
    }

    async fn handle_job_error(&self, request_id: Uuid, cause: &str) -> anyhow::Result<()> {
        let mut request = self.request_repo.get_by_id(request_id).await?;
        request.state = RequestState::Error;
        request.add_error(cause.to_owned());
        // Clear the correlation bookkeeping so a retry can re-dispatch.
        request.remote_step_group_ids.clear();
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

impl RequestScheduleServiceImpl {
    /// Another mutating request on an overlapping AIP scope is either in
    /// flight, or queued ahead of this one.
    async fn has_conflict(&self, request: &ArchiveRequest) -> anyhow::Result<bool> {
        let others = self.request_repo.find_pending_by_aip_ids(request.aip_scope()).await?;
        Ok(others.into_iter().any(|other| {
            other.id != request.id
                && other.kind().is_blocking()
                && match other.state {
                    RequestState::Running
                    | RequestState::ToSchedule
                    | RequestState::WaitingRemoteStorage
                    | RequestState::WaitingNotifierResponse => true,
                    RequestState::Created => {
                        (other.creation_date, other.id) < (request.creation_date, request.id)
                    }
                    _ => false,
                }
        }))
    }
}

fn job_kind(kind: RequestKind) -> JobKind {
    match kind {
        RequestKind::Ingest => JobKind::IngestStorage,
        RequestKind::Update => JobKind::UpdateRunner,
        RequestKind::SaveMetadata => JobKind::SaveMetadata,
        RequestKind::Deletion => JobKind::DeletionRunner,
    }
}
