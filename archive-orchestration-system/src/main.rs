mod config;
mod infrastructure;

use std::{sync::Arc, time::Duration};

use domain_archive::{
    command::{JobCommand, JobKind},
    model::{
        entity::{
            request::{DeletionMode, IngestStep, RequestPayload, RequestState},
            AipEntity, ArchiveRequest,
        },
        vo::{
            oais::{
                ArchivalPackage, ContentInformation, DataObject, DataObjectLocation, DataType,
                RepresentationInformation,
            },
            storage::StorageMetadata,
            VersioningMode,
        },
    },
    repository::{AipRepo, RequestRepo},
    service::{
        AipSaveMetadataService, AipUpdateService, DeletionService, IngestRequestService,
        RequestScheduleService, StorageEventService, VersioningService,
    },
};
use service_archive::{
    AipSaveMetadataServiceImpl, AipUpdateServiceImpl, DeletionServiceImpl,
    IngestRequestServiceImpl, RequestScheduleServiceImpl, StorageDispatchServiceImpl,
    StorageEventServiceImpl, StorageReconcileServiceImpl, VersioningServiceImpl,
};
use tracing_subscriber::EnvFilter;

use crate::infrastructure::{
    job::ChannelJobClient,
    notify::{TracingEventPublisher, TracingSessionNotifier},
    repository::{DashMapAipRepo, DashMapLastAipRepo, DashMapRequestRepo},
    storage::SimulatedStorageClient,
};

/// Runs one job batch handed over by the scheduler.
struct JobRunner {
    request_repo: Arc<dyn RequestRepo>,
    ingest_service: Arc<dyn IngestRequestService>,
    update_service: Arc<dyn AipUpdateService>,
    metadata_service: Arc<dyn AipSaveMetadataService>,
    deletion_service: Arc<dyn DeletionService>,
    schedule_service: Arc<dyn RequestScheduleService>,
}

impl JobRunner {
    async fn run(&self, job: JobCommand) {
        for request_id in &job.request_ids {
            let result = self.run_request(job.kind, *request_id).await;
            if let Err(e) = result {
                tracing::error!(%request_id, error = %e, "job failed");
                if let Err(e) =
                    self.schedule_service.handle_job_error(*request_id, &e.to_string()).await
                {
                    tracing::error!(%request_id, error = %e, "could not record job failure");
                }
            }
        }
    }

    async fn run_request(&self, kind: JobKind, request_id: uuid::Uuid) -> anyhow::Result<()> {
        let mut request = self.request_repo.get_by_id(request_id).await?;
        match kind {
            JobKind::IngestStorage => self.ingest_service.store_files(&mut request).await,
            JobKind::UpdateRunner => self.update_service.run_update(&mut request).await,
            JobKind::SaveMetadata => self.metadata_service.save_metadata(&mut request).await,
            JobKind::DeletionRunner => {
                self.deletion_service.schedule_linked_files_deletion(&mut request).await?;
                if request.state == RequestState::Running {
                    // Nothing ever reached a storage, finish synchronously.
                    let RequestPayload::Deletion {
                        sip_id,
                        deletion_mode,
                        ..
                    } = &request.payload
                    else {
                        anyhow::bail!("deletion job over a non-deletion request: {request_id}");
                    };
                    self.deletion_service
                        .process_deletion(sip_id, *deletion_mode == DeletionMode::Irrevocably)
                        .await?;
                    self.request_repo.delete(request.id).await?;
                }
                Ok(())
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config::load()?;
    let storages: Vec<StorageMetadata> =
        config.storages.iter().cloned().map(Into::into).collect();
    tracing::info!(backends = storages.len(), "starting archive orchestration system");

    let (callback_tx, callback_rx) = flume::unbounded();
    let (job_tx, job_rx) = flume::unbounded();

    let aip_repo = Arc::new(DashMapAipRepo::default());
    let last_aip_repo = Arc::new(DashMapLastAipRepo::default());
    let request_repo = Arc::new(DashMapRequestRepo::default());
    let storage_client = Arc::new(SimulatedStorageClient::new(callback_tx));
    let session_notifier = Arc::new(TracingSessionNotifier);
    let publisher = Arc::new(TracingEventPublisher);

    let versioning_service = Arc::new(
        VersioningServiceImpl::builder()
            .aip_repo(aip_repo.clone())
            .last_aip_repo(last_aip_repo.clone())
            .session_notifier(session_notifier.clone())
            .build(),
    );
    let ingest_service = Arc::new(
        IngestRequestServiceImpl::builder()
            .aip_repo(aip_repo.clone())
            .request_repo(request_repo.clone())
            .dispatcher(Arc::new(StorageDispatchServiceImpl))
            .reconciler(Arc::new(StorageReconcileServiceImpl))
            .storage_client(storage_client.clone())
            .session_notifier(session_notifier.clone())
            .publisher(publisher.clone())
            .build(),
    );
    let update_service = Arc::new(
        AipUpdateServiceImpl::builder()
            .aip_repo(aip_repo.clone())
            .request_repo(request_repo.clone())
            .build(),
    );
    let metadata_service = Arc::new(
        AipSaveMetadataServiceImpl::builder()
            .aip_repo(aip_repo.clone())
            .request_repo(request_repo.clone())
            .dispatcher(Arc::new(StorageDispatchServiceImpl))
            .storage_client(storage_client.clone())
            .publisher(publisher.clone())
            .build(),
    );
    let deletion_service = Arc::new(
        DeletionServiceImpl::builder()
            .aip_repo(aip_repo.clone())
            .last_aip_repo(last_aip_repo.clone())
            .request_repo(request_repo.clone())
            .storage_client(storage_client.clone())
            .session_notifier(session_notifier.clone())
            .publisher(publisher.clone())
            .build(),
    );
    let schedule_service = Arc::new(
        RequestScheduleServiceImpl::builder()
            .request_repo(request_repo.clone())
            .job_client(Arc::new(ChannelJobClient::new(job_tx)))
            .publisher(publisher.clone())
            .page_size(config.scheduler.page_size)
            .build(),
    );
    let event_service = Arc::new(
        StorageEventServiceImpl::builder()
            .request_repo(request_repo.clone())
            .ingest_service(ingest_service.clone())
            .metadata_service(metadata_service.clone())
            .deletion_service(deletion_service.clone())
            .build(),
    );

    // Storage callback consumer: one task, so reconciliation of a given AIP
    // is never applied from two batches at once.
    {
        let event_service: Arc<dyn StorageEventService> = event_service;
        tokio::spawn(async move {
            while let Ok(batch) = callback_rx.recv_async().await {
                if let Err(e) = event_service.handle(batch).await {
                    tracing::error!(error = %e, "storage callback handling failed");
                }
            }
        });
    }

    // Job runner: drains what the scheduler submitted.
    {
        let runner = JobRunner {
            request_repo: request_repo.clone(),
            ingest_service,
            update_service,
            metadata_service,
            deletion_service: deletion_service.clone(),
            schedule_service: schedule_service.clone(),
        };
        tokio::spawn(async move {
            while let Ok(job) = job_rx.recv_async().await {
                runner.run(job).await;
            }
        });
    }

    // Cooperative batch scheduler.
    {
        let schedule_service = schedule_service.clone();
        let tick = Duration::from_millis(config.scheduler.tick_ms);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            loop {
                interval.tick().await;
                if let Err(e) = schedule_service.release_blocked().await {
                    tracing::error!(error = %e, "releasing blocked requests failed");
                }
                match schedule_service.schedule_pending().await {
                    Ok(0) => {}
                    Ok(scheduled) => tracing::info!(scheduled, "requests handed to jobs"),
                    Err(e) => tracing::error!(error = %e, "scheduling pass failed"),
                }
            }
        });
    }

    if config.seed_sample_data {
        let aip_repo = aip_repo.clone();
        let request_repo = request_repo.clone();
        let deletion_service = deletion_service.clone();
        // A bare start-up still gets one backend to exercise.
        let storages = if storages.is_empty() {
            vec![StorageMetadata::new("local-disk")]
        } else {
            storages.clone()
        };
        tokio::spawn(async move {
            if let Err(e) = seed_sample_data(
                aip_repo,
                request_repo,
                versioning_service,
                deletion_service,
                storages,
            )
            .await
            {
                tracing::error!(error = %e, "seeding sample data failed");
            }
        });
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    Ok(())
}

/// Walks one provider through the whole lifecycle: two ingested versions,
/// then deletion of the superseded one.
async fn seed_sample_data(
    aip_repo: Arc<dyn AipRepo>,
    request_repo: Arc<dyn RequestRepo>,
    versioning_service: Arc<VersioningServiceImpl>,
    deletion_service: Arc<DeletionServiceImpl>,
    storages: Vec<StorageMetadata>,
) -> anyhow::Result<()> {
    for version in 1..=2 {
        let sip_id = format!("sip-demo-{version}");
        let package = ArchivalPackage {
            provider_id: "demo-product-1".to_owned(),
            sip_id: sip_id.to_owned(),
            version,
            content_informations: vec![ContentInformation {
                representation: RepresentationInformation {
                    mime_type: Some("application/octet-stream".to_owned()),
                    height: None,
                    width: None,
                },
                data_object: DataObject {
                    data_type: DataType::RawData,
                    filename: format!("demo-product-1-v{version}.dat"),
                    checksum: format!("demo-checksum-{version}"),
                    algorithm: "MD5".to_owned(),
                    file_size: Some(1024 * version as u64),
                    locations: vec![DataObjectLocation::pending(&format!(
                        "file:///ingest/demo-product-1-v{version}.dat"
                    ))],
                },
            }],
            events: vec![],
            tags: vec!["demo".to_owned()],
            categories: Default::default(),
        };
        let mut aip = AipEntity::new(package, "demo", "session-demo");
        versioning_service.resolve(&mut aip, VersioningMode::IncVersion).await?;
        let request = ArchiveRequest::new(
            "demo",
            "session-demo",
            RequestPayload::Ingest {
                aip_ids: vec![aip.id],
                storages: storages.clone(),
                step: IngestStep::LocalScheduled,
            },
        );
        request_repo.save(&request).await?;
        tracing::info!(aip_id = %aip.aip_id, "seeded ingest request");
    }

    // Let the first two requests settle, then remove the superseded version.
    tokio::time::sleep(Duration::from_secs(3)).await;
    if !deletion_service.deletion_already_pending("sip-demo-1").await? {
        let aip_ids = aip_repo
            .find_by_sip_id("sip-demo-1")
            .await?
            .iter()
            .map(|a| a.id)
            .collect();
        let request = ArchiveRequest::new(
            "demo",
            "session-demo",
            RequestPayload::Deletion {
                sip_id: "sip-demo-1".to_owned(),
                aip_ids,
                deletion_mode: DeletionMode::Irrevocably,
            },
        );
        request_repo.save(&request).await?;
        tracing::info!("seeded deletion request for the superseded version");
    }
    Ok(())
}
