mod deletion;
mod dispatch;
mod event;
mod ingest;
mod metadata;
mod reconcile;
mod scheduling;
mod update;
mod versioning;

#[rustfmt::skip]
pub use {
    deletion::DeletionServiceImpl,
    dispatch::StorageDispatchServiceImpl,
    event::StorageEventServiceImpl,
    ingest::IngestRequestServiceImpl,
    metadata::AipSaveMetadataServiceImpl,
    reconcile::StorageReconcileServiceImpl,
    scheduling::RequestScheduleServiceImpl,
    update::AipUpdateServiceImpl,
    versioning::VersioningServiceImpl,
};
