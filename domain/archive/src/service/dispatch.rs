use crate::{
    exception::ArchiveResult,
    model::{
        entity::AipEntity,
        vo::{
            storage::{FileResultInfo, FileStorageRequest, StorageMetadata},
            DispatchPlan,
        },
    },
};

/// Maps AIP data objects to store/reference requests per configured backend.
/// Builds the plan only; submitting it and recording correlation ids is the
/// caller's job.
pub trait StorageDispatchService: Send + Sync {
    /// One store request per distinct backend accepting the data object, one
    /// reference request per already-placed location.
    fn dispatch(
        &self,
        aip: &AipEntity,
        storages: &[StorageMetadata],
    ) -> ArchiveResult<DispatchPlan>;

    /// Retry path: redispatch only the data object named by the error, with
    /// its original store/refer semantics, only to the failed backend.
    fn dispatch_for_error(
        &self,
        error: &FileResultInfo,
        aip: &AipEntity,
        failed_storage: &StorageMetadata,
    ) -> ArchiveResult<DispatchPlan>;

    /// Storage requests for the package manifest itself.
    fn dispatch_manifest(
        &self,
        aip: &AipEntity,
        checksum: &str,
        storages: &[StorageMetadata],
    ) -> ArchiveResult<Vec<FileStorageRequest>>;
}
