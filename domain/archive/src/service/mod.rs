mod deletion;
mod dispatch;
mod event;
mod ingest;
mod job;
mod metadata;
mod notify;
mod reconcile;
mod scheduling;
mod storage_client;
mod update;
mod versioning;

#[rustfmt::skip]
pub use {
    deletion::DeletionService,
    dispatch::StorageDispatchService,
    event::StorageEventService,
    ingest::IngestRequestService,
    job::JobClient,
    metadata::AipSaveMetadataService,
    notify::{EventPublisher, SessionNotifier},
    reconcile::StorageReconcileService,
    scheduling::RequestScheduleService,
    storage_client::StorageClient,
    update::AipUpdateService,
    versioning::VersioningService,
};
