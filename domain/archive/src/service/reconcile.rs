use crate::model::{
    entity::AipEntity,
    vo::{storage::FileResultInfo, UpdateResult},
};

/// Applies asynchronous storage results back onto AIP file locations and
/// storage sets. Pure mutations; callers persist what the returned
/// [`UpdateResult`] says changed. Events not matching any data-object
/// checksum are ignored. Applying the same event twice is a no-op.
pub trait StorageReconcileService: Send + Sync {
    /// Bulk variant used after full storage completion: overwrite file
    /// metadata from the authoritative result and resolve pending "to store"
    /// placeholders into concrete locations.
    fn apply_store_results(&self, aips: &mut [AipEntity], results: &[FileResultInfo]);

    /// Append the result locations that are not already known.
    fn add_locations(&self, aip: &mut AipEntity, results: &[FileResultInfo]) -> UpdateResult;

    /// Remove the matching locations; a storage id leaves the entity
    /// storage-set only once no data object references it anymore.
    fn remove_locations(&self, aip: &mut AipEntity, results: &[FileResultInfo]) -> UpdateResult;
}
