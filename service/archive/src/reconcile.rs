use std::collections::HashSet;

use domain_archive::{
    model::{
        entity::AipEntity,
        vo::{
            oais::DataObjectLocation,
            storage::FileResultInfo,
            UpdateResult,
        },
    },
    service::StorageReconcileService,
};

/// Pure mutations over the owned AIP aggregate; callers persist what the
/// returned result says changed. Results are matched to data objects by
/// exact checksum equality, anything else is ignored.
pub struct StorageReconcileServiceImpl;

impl StorageReconcileService for StorageReconcileServiceImpl {
    fn apply_store_results(&self, aips: &mut [AipEntity], results: &[FileResultInfo]) {
        for aip in aips.iter_mut() {
            let mut events = vec![];
            for ci in aip.aip.content_informations.iter_mut() {
                let object = &mut ci.data_object;
                let request_checksum = object.checksum.to_owned();
                let matching = results.iter().filter(|r| r.request_checksum == request_checksum);
                for info in matching {
                    let Some(result) = &info.result_file else {
                        continue;
                    };
                    // The storage result is authoritative for the file metadata.
                    object.file_size = result.file_size;
                    object.checksum = result.checksum.to_owned();
                    ci.representation.mime_type = result.mime_type.to_owned();
                    ci.representation.height = result.height;
                    ci.representation.width = result.width;
                    // Resolve the pending "to store" placeholder into the
                    // concrete location.
                    let stored = DataObjectLocation::stored(
                        &info.request_storage,
                        &result.url,
                        result.store_path.to_owned(),
                    );
                    object.locations.retain(|l| l.storage.is_some());
                    if !object.locations.contains(&stored) {
                        object.locations.push(stored);
                        events.push(format!(
                            "File {} is now stored on {} at {}.",
                            object.filename, info.request_storage, result.url
                        ));
                    }
                    aip.storages.insert(info.request_storage.to_owned());
                }
            }
            for event in events {
                aip.aip.add_event(event);
            }
        }
    }

    fn add_locations(&self, aip: &mut AipEntity, results: &[FileResultInfo]) -> UpdateResult {
        let mut update = UpdateResult::default();
        let mut events = vec![];
        for info in results {
            let Some(result) = &info.result_file else {
                continue;
            };
            let Some(ci) = aip.aip.content_by_checksum_mut(&info.request_checksum) else {
                continue;
            };
            let object = &mut ci.data_object;
            let known = object
                .locations
                .iter()
                .any(|l| l.storage.as_deref() == Some(info.request_storage.as_str()));
            if !known {
                object.locations.push(DataObjectLocation::stored(
                    &info.request_storage,
                    &result.url,
                    result.store_path.to_owned(),
                ));
                update.content_edited = true;
                events.push(format!(
                    "File {} is now stored on {} at {}.",
                    object.filename, info.request_storage, result.url
                ));
            }
            if aip.storages.insert(info.request_storage.to_owned()) {
                update.entity_edited = true;
            }
        }
        for event in events {
            aip.aip.add_event(event);
        }
        update
    }

    fn remove_locations(&self, aip: &mut AipEntity, results: &[FileResultInfo]) -> UpdateResult {
        let mut update = UpdateResult::default();
        let mut events = vec![];
        let mut touched: HashSet<String> = HashSet::new();
        for info in results {
            let Some(ci) = aip.aip.content_by_checksum_mut(&info.request_checksum) else {
                continue;
            };
            let object = &mut ci.data_object;
            let before = object.locations.len();
            object
                .locations
                .retain(|l| l.storage.as_deref() != Some(info.request_storage.as_str()));
            if object.locations.len() < before {
                update.content_edited = true;
                events.push(format!(
                    "File {} is not stored on {} anymore.",
                    object.filename, info.request_storage
                ));
            }
            touched.insert(info.request_storage.to_owned());
        }
        // A storage leaves the entity set only once no file lives there.
        for storage in touched {
            if !aip.storage_in_use(&storage) && aip.storages.remove(&storage) {
                update.entity_edited = true;
            }
        }
        for event in events {
            aip.aip.add_event(event);
        }
        update
    }
}
