use std::collections::HashSet;

use domain_archive::{
    exception::{ArchiveException, ArchiveResult},
    model::{
        entity::AipEntity,
        vo::{
            oais::{ContentInformation, DataObject, DataObjectLocation},
            storage::{FileReferenceRequest, FileResultInfo, FileStorageRequest, StorageMetadata},
            DispatchPlan,
        },
    },
    service::StorageDispatchService,
};

pub const MANIFEST_ALGORITHM: &str = "blake3";

/// Stateless: acceptance rules travel with the request metadata.
pub struct StorageDispatchServiceImpl;

impl StorageDispatchService for StorageDispatchServiceImpl {
    fn dispatch(
        &self,
        aip: &AipEntity,
        storages: &[StorageMetadata],
    ) -> ArchiveResult<DispatchPlan> {
        let mut plan = DispatchPlan::default();
        for ci in &aip.aip.content_informations {
            let object = &ci.data_object;
            if object.locations.is_empty() {
                return Err(ArchiveException::NoLocation {
                    checksum: object.checksum.to_owned(),
                });
            }
            let pending: Vec<&DataObjectLocation> =
                object.locations.iter().filter(|l| l.storage.is_none()).collect();
            if pending.len() > 1 {
                return Err(ArchiveException::AmbiguousStoreLocation {
                    checksum: object.checksum.to_owned(),
                });
            }

            // Locations already holding the bytes are referenced, never copied.
            for location in object.locations.iter().filter(|l| l.storage.is_some()) {
                plan.files_to_reference.push(reference_request(aip, ci, location)?);
            }

            // The pending location is stored on every distinct accepting backend.
            if let Some(origin) = pending.first() {
                let mut dispatched = HashSet::new();
                let mut matched = false;
                for storage in storages {
                    if !dispatched.insert(storage.storage.as_str()) {
                        continue;
                    }
                    if !match_storage(storage, object)? {
                        continue;
                    }
                    matched = true;
                    plan.files_to_store.push(storage_request(aip, ci, origin, storage));
                }
                if !matched {
                    return Err(ArchiveException::NoStorageMatch {
                        checksum: object.checksum.to_owned(),
                        filename: object.filename.to_owned(),
                    });
                }
            }
        }
        Ok(plan)
    }

    fn dispatch_for_error(
        &self,
        error: &FileResultInfo,
        aip: &AipEntity,
        failed_storage: &StorageMetadata,
    ) -> ArchiveResult<DispatchPlan> {
        let mut plan = DispatchPlan::default();
        // Only the data object named by the error is redispatched.
        let Some(ci) = aip
            .aip
            .content_informations
            .iter()
            .find(|ci| ci.data_object.checksum == error.request_checksum)
        else {
            return Ok(plan);
        };
        let object = &ci.data_object;

        match object
            .locations
            .iter()
            .find(|l| l.storage.as_deref() == Some(failed_storage.storage.as_str()))
        {
            // The failed file was a reference, reference it again.
            Some(location) => {
                plan.files_to_reference.push(reference_request(aip, ci, location)?);
            }
            // The failed file was a copy, store it again from its origin.
            None => {
                let origin =
                    object.locations.iter().find(|l| l.storage.is_none()).ok_or_else(|| {
                        ArchiveException::NoLocation {
                            checksum: object.checksum.to_owned(),
                        }
                    })?;
                plan.files_to_store.push(storage_request(aip, ci, origin, failed_storage));
            }
        }
        Ok(plan)
    }

    fn dispatch_manifest(
        &self,
        aip: &AipEntity,
        checksum: &str,
        storages: &[StorageMetadata],
    ) -> ArchiveResult<Vec<FileStorageRequest>> {
        let mut dispatched = HashSet::new();
        let mut files = vec![];
        // Manifests land on every requested backend, acceptance rules only
        // apply to data objects.
        for storage in storages {
            if !dispatched.insert(storage.storage.as_str()) {
                continue;
            }
            files.push(FileStorageRequest {
                owner: aip.aip_id.to_owned(),
                checksum: checksum.to_owned(),
                algorithm: MANIFEST_ALGORITHM.to_owned(),
                filename: format!("{}.json", aip.aip_id),
                mime_type: Some("application/json".to_owned()),
                file_size: None,
                origin_url: format!("aip:{}", aip.aip_id),
                storage: storage.storage.to_owned(),
                store_path: storage.store_path.to_owned(),
            });
        }
        Ok(files)
    }
}

/// A backend accepts a data object when its accepted-type set is empty or
/// contains the object's type, and the size bound, when configured, holds.
fn match_storage(storage: &StorageMetadata, object: &DataObject) -> ArchiveResult<bool> {
    if !storage.accepted_types.is_empty() && !storage.accepted_types.contains(&object.data_type) {
        return Ok(false);
    }
    if storage.size_min.is_some() || storage.size_max.is_some() {
        let size = object.file_size.ok_or_else(|| ArchiveException::MissingFileSize {
            checksum: object.checksum.to_owned(),
            storage: storage.storage.to_owned(),
        })?;
        if storage.size_min.is_some_and(|min| size < min)
            || storage.size_max.is_some_and(|max| size > max)
        {
            return Ok(false);
        }
    }
    Ok(true)
}

fn storage_request(
    aip: &AipEntity,
    ci: &ContentInformation,
    origin: &DataObjectLocation,
    storage: &StorageMetadata,
) -> FileStorageRequest {
    let object = &ci.data_object;
    FileStorageRequest {
        owner: aip.aip_id.to_owned(),
        checksum: object.checksum.to_owned(),
        algorithm: object.algorithm.to_owned(),
        filename: object.filename.to_owned(),
        mime_type: ci.representation.mime_type.to_owned(),
        file_size: object.file_size,
        origin_url: origin.url.to_owned(),
        storage: storage.storage.to_owned(),
        store_path: storage.store_path.to_owned(),
    }
}

fn reference_request(
    aip: &AipEntity,
    ci: &ContentInformation,
    location: &DataObjectLocation,
) -> ArchiveResult<FileReferenceRequest> {
    let object = validate_for_reference(&ci.data_object)?;
    Ok(FileReferenceRequest {
        owner: aip.aip_id.to_owned(),
        checksum: object.checksum.to_owned(),
        algorithm: object.algorithm.to_owned(),
        filename: object.filename.to_owned(),
        mime_type: ci.representation.mime_type.to_owned(),
        // Validation guarantees the size.
        file_size: object.file_size.unwrap_or_default(),
        storage: location.storage.to_owned().unwrap_or_default(),
        url: location.url.to_owned(),
    })
}

/// Referenced bytes are never owned by the system, so everything identifying
/// them must be present up front. All missing fields are reported at once.
fn validate_for_reference(object: &DataObject) -> ArchiveResult<&DataObject> {
    let mut missing = vec![];
    if object.checksum.is_empty() {
        missing.push("checksum");
    }
    if object.algorithm.is_empty() {
        missing.push("algorithm");
    }
    if object.filename.is_empty() {
        missing.push("filename");
    }
    if object.file_size.is_none() {
        missing.push("file size");
    }
    if !missing.is_empty() {
        return Err(ArchiveException::InvalidReferenceFile {
            filename: object.filename.to_owned(),
            missing: missing.join(", "),
        });
    }
    Ok(object)
}
