#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use domain_archive::{
    command::JobCommand,
    model::{
        entity::{
            request::{RequestPayload, RequestState},
            AipEntity, ArchiveRequest, LastAip,
        },
        vo::{
            msg::ArchiveEvent,
            oais::{
                ArchivalPackage, ContentInformation, DataObject, DataObjectLocation, DataType,
                RepresentationInformation,
            },
            storage::{
                FileDeletionRequest, FileReferenceRequest, FileResultInfo, FileStorageRequest,
                ResultFile,
            },
        },
    },
    repository::{AipRepo, LastAipRepo, RequestRepo},
    service::{EventPublisher, JobClient, SessionNotifier, StorageClient},
};
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryAipRepo {
    pub aips: Mutex<HashMap<Uuid, AipEntity>>,
}

#[async_trait]
impl AipRepo for InMemoryAipRepo {
    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<AipEntity> {
        self.aips
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no aip with id: {id}"))
    }

    async fn find_by_aip_id(&self, aip_id: &str) -> anyhow::Result<Option<AipEntity>> {
        Ok(self.aips.lock().unwrap().values().find(|a| a.aip_id == aip_id).cloned())
    }

    async fn find_by_provider_id(&self, provider_id: &str) -> anyhow::Result<Vec<AipEntity>> {
        Ok(self
            .aips
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.provider_id == provider_id)
            .cloned()
            .collect())
    }

    async fn find_last_by_provider_id(
        &self,
        provider_id: &str,
    ) -> anyhow::Result<Option<AipEntity>> {
        Ok(self
            .aips
            .lock()
            .unwrap()
            .values()
            .find(|a| a.provider_id == provider_id && a.last)
            .cloned())
    }

    async fn find_by_sip_id(&self, sip_id: &str) -> anyhow::Result<Vec<AipEntity>> {
        Ok(self
            .aips
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.aip.sip_id == sip_id)
            .cloned()
            .collect())
    }

    async fn save(&self, aip: &AipEntity) -> anyhow::Result<()> {
        self.aips.lock().unwrap().insert(aip.id, aip.clone());
        Ok(())
    }

    async fn save_all(&self, aips: &[AipEntity]) -> anyhow::Result<()> {
        let mut guard = self.aips.lock().unwrap();
        for aip in aips {
            guard.insert(aip.id, aip.clone());
        }
        Ok(())
    }

    async fn delete_all(&self, ids: &[Uuid]) -> anyhow::Result<()> {
        let mut guard = self.aips.lock().unwrap();
        for id in ids {
            guard.remove(id);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryLastAipRepo {
    pub rows: Mutex<Vec<LastAip>>,
}

#[async_trait]
impl LastAipRepo for InMemoryLastAipRepo {
    async fn find_by_provider_id(&self, provider_id: &str) -> anyhow::Result<Option<LastAip>> {
        Ok(self.rows.lock().unwrap().iter().find(|r| r.provider_id == provider_id).cloned())
    }

    async fn insert(&self, last: &LastAip) -> anyhow::Result<()> {
        self.rows.lock().unwrap().push(last.clone());
        Ok(())
    }

    async fn delete_by_aip_ids(&self, aip_ids: &[Uuid]) -> anyhow::Result<()> {
        self.rows.lock().unwrap().retain(|r| !aip_ids.contains(&r.aip_id));
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryRequestRepo {
    pub requests: Mutex<HashMap<Uuid, ArchiveRequest>>,
}

#[async_trait]
impl RequestRepo for InMemoryRequestRepo {
    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<ArchiveRequest> {
        self.requests
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no request with id: {id}"))
    }

    async fn find_by_remote_step_group_id(
        &self,
        group_id: &str,
    ) -> anyhow::Result<Option<ArchiveRequest>> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .values()
            .find(|r| r.remote_step_group_ids.iter().any(|g| g == group_id))
            .cloned())
    }

    async fn find_page_by_state(
        &self,
        state: RequestState,
        page_size: usize,
    ) -> anyhow::Result<Vec<ArchiveRequest>> {
        let mut page: Vec<ArchiveRequest> = self
            .requests
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.state == state)
            .cloned()
            .collect();
        page.sort_by_key(|r| (r.creation_date, r.id));
        page.truncate(page_size);
        Ok(page)
    }

    async fn find_pending_by_aip_id(&self, aip_id: Uuid) -> anyhow::Result<Vec<ArchiveRequest>> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.state.is_pending() && r.aip_scope().contains(&aip_id))
            .cloned()
            .collect())
    }

    async fn find_pending_by_aip_ids(
        &self,
        aip_ids: &[Uuid],
    ) -> anyhow::Result<Vec<ArchiveRequest>> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.state.is_pending() && r.overlaps(aip_ids))
            .cloned()
            .collect())
    }

    async fn exists_deletion_pending(&self, sip_id: &str) -> anyhow::Result<bool> {
        Ok(self.requests.lock().unwrap().values().any(|r| {
            matches!(
                r.state,
                RequestState::Created
                    | RequestState::Blocked
                    | RequestState::Running
                    | RequestState::ToSchedule
            ) && matches!(&r.payload, RequestPayload::Deletion { sip_id: s, .. } if s == sip_id)
        }))
    }

    async fn save(&self, request: &ArchiveRequest) -> anyhow::Result<()> {
        self.requests.lock().unwrap().insert(request.id, request.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        self.requests.lock().unwrap().remove(&id);
        Ok(())
    }
}

/// Records every submitted operation and answers with predictable group ids.
#[derive(Default)]
pub struct RecordingStorageClient {
    pub counter: AtomicUsize,
    pub stored: Mutex<Vec<(String, Vec<FileStorageRequest>)>>,
    pub referenced: Mutex<Vec<(String, Vec<FileReferenceRequest>)>>,
    pub deleted: Mutex<Vec<(String, Vec<FileDeletionRequest>)>>,
    pub cancelled: Mutex<Vec<String>>,
    pub fail_cancel: bool,
}

impl RecordingStorageClient {
    fn next_group(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.counter.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl StorageClient for RecordingStorageClient {
    async fn store(&self, requests: Vec<FileStorageRequest>) -> anyhow::Result<String> {
        let group_id = self.next_group("store");
        self.stored.lock().unwrap().push((group_id.clone(), requests));
        Ok(group_id)
    }

    async fn reference(&self, requests: Vec<FileReferenceRequest>) -> anyhow::Result<String> {
        let group_id = self.next_group("refer");
        self.referenced.lock().unwrap().push((group_id.clone(), requests));
        Ok(group_id)
    }

    async fn delete(&self, requests: Vec<FileDeletionRequest>) -> anyhow::Result<String> {
        let group_id = self.next_group("delete");
        self.deleted.lock().unwrap().push((group_id.clone(), requests));
        Ok(group_id)
    }

    async fn cancel(&self, group_ids: &[String]) -> anyhow::Result<()> {
        if self.fail_cancel {
            anyhow::bail!("storage service unavailable");
        }
        self.cancelled.lock().unwrap().extend(group_ids.iter().cloned());
        Ok(())
    }
}

#[derive(Default)]
pub struct CountingSessionNotifier {
    pub new_versions: AtomicUsize,
    pub replaced: AtomicUsize,
    pub stored: AtomicUsize,
    pub deleted: AtomicUsize,
    pub storage_failed: AtomicUsize,
}

#[async_trait]
impl SessionNotifier for CountingSessionNotifier {
    async fn increment_new_versions(
        &self,
        _session_owner: &str,
        _session: &str,
        count: usize,
    ) -> anyhow::Result<()> {
        self.new_versions.fetch_add(count, Ordering::SeqCst);
        Ok(())
    }

    async fn increment_replaced(&self, _session_owner: &str, _session: &str) -> anyhow::Result<()> {
        self.replaced.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn notify_aips_stored(&self, aips: &[AipEntity]) -> anyhow::Result<()> {
        self.stored.fetch_add(aips.len(), Ordering::SeqCst);
        Ok(())
    }

    async fn notify_aips_deleted(
        &self,
        _session_owner: &str,
        _session: &str,
        count: usize,
    ) -> anyhow::Result<()> {
        self.deleted.fetch_add(count, Ordering::SeqCst);
        Ok(())
    }

    async fn notify_storage_failed(&self, _aip: &AipEntity) -> anyhow::Result<()> {
        self.storage_failed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    pub events: Mutex<Vec<ArchiveEvent>>,
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: ArchiveEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingJobClient {
    pub jobs: Mutex<Vec<JobCommand>>,
}

#[async_trait]
impl JobClient for RecordingJobClient {
    async fn submit(&self, job: JobCommand) -> anyhow::Result<()> {
        self.jobs.lock().unwrap().push(job);
        Ok(())
    }
}

/// Builds one package version with a single raw-data object.
pub fn sample_aip(
    provider_id: &str,
    sip_id: &str,
    version: i32,
    checksum: &str,
    size: u64,
) -> AipEntity {
    let package = ArchivalPackage {
        provider_id: provider_id.to_owned(),
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
                filename: format!("{provider_id}.dat"),
                checksum: checksum.to_owned(),
                algorithm: "MD5".to_owned(),
                file_size: Some(size),
                locations: vec![DataObjectLocation::pending(&format!(
                    "file:///input/{provider_id}.dat"
                ))],
            },
        }],
        events: vec![],
        tags: vec![],
        categories: Default::default(),
    };
    AipEntity::new(package, "owner", "session-1")
}

pub fn success_result(group_id: &str, checksum: &str, storage: &str, url: &str) -> FileResultInfo {
    FileResultInfo {
        group_id: group_id.to_owned(),
        request_checksum: checksum.to_owned(),
        request_storage: storage.to_owned(),
        request_owners: vec![],
        result_file: Some(ResultFile {
            checksum: checksum.to_owned(),
            file_size: Some(100),
            mime_type: Some("application/octet-stream".to_owned()),
            height: None,
            width: None,
            storage: storage.to_owned(),
            url: url.to_owned(),
            store_path: None,
        }),
        error_cause: None,
    }
}

pub fn error_result(
    group_id: &str,
    checksum: &str,
    storage: &str,
    owner: &str,
    cause: &str,
) -> FileResultInfo {
    FileResultInfo {
        group_id: group_id.to_owned(),
        request_checksum: checksum.to_owned(),
        request_storage: storage.to_owned(),
        request_owners: vec![owner.to_owned()],
        result_file: None,
        error_cause: Some(cause.to_owned()),
    }
}
