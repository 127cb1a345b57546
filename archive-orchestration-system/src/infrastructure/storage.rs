use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use domain_archive::{
    model::vo::storage::{
        FileDeletionRequest, FileReferenceRequest, FileResultInfo, FileStorageRequest, ResultFile,
        StorageResultBatch, StorageResultKind,
    },
    service::StorageClient,
};

/// Storage service stand-in: every operation is acknowledged asynchronously
/// through the callback channel, the way the real service answers over the
/// message bus.
pub struct SimulatedStorageClient {
    callback_tx: flume::Sender<StorageResultBatch>,
    counter: AtomicUsize,
}

impl SimulatedStorageClient {
    pub fn new(callback_tx: flume::Sender<StorageResultBatch>) -> Self {
        Self {
            callback_tx,
            counter: AtomicUsize::new(0),
        }
    }

    fn next_group(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.counter.fetch_add(1, Ordering::SeqCst))
    }

    fn emit(&self, batch: StorageResultBatch) -> anyhow::Result<()> {
        self.callback_tx
            .send(batch)
            .map_err(|e| anyhow::anyhow!("callback channel closed: {e}"))
    }
}

#[async_trait]
impl StorageClient for SimulatedStorageClient {
    async fn store(&self, requests: Vec<FileStorageRequest>) -> anyhow::Result<String> {
        let group_id = self.next_group("store");
        let success = requests
            .iter()
            .map(|request| {
                let directory = request.store_path.as_deref().unwrap_or("");
                FileResultInfo {
                    group_id: group_id.to_owned(),
                    request_checksum: request.checksum.to_owned(),
                    request_storage: request.storage.to_owned(),
                    request_owners: vec![request.owner.to_owned()],
                    result_file: Some(ResultFile {
                        checksum: request.checksum.to_owned(),
                        file_size: request.file_size,
                        mime_type: request.mime_type.to_owned(),
                        height: None,
                        width: None,
                        storage: request.storage.to_owned(),
                        url: format!(
                            "file://{}/{directory}/{}",
                            request.storage, request.filename
                        ),
                        store_path: request.store_path.to_owned(),
                    }),
                    error_cause: None,
                }
            })
            .collect();
        self.emit(StorageResultBatch {
            group_id: group_id.to_owned(),
            kind: StorageResultKind::Store,
            success,
            errors: vec![],
        })?;
        Ok(group_id)
    }

    async fn reference(&self, requests: Vec<FileReferenceRequest>) -> anyhow::Result<String> {
        let group_id = self.next_group("refer");
        let success = requests
            .iter()
            .map(|request| FileResultInfo {
                group_id: group_id.to_owned(),
                request_checksum: request.checksum.to_owned(),
                request_storage: request.storage.to_owned(),
                request_owners: vec![request.owner.to_owned()],
                result_file: Some(ResultFile {
                    checksum: request.checksum.to_owned(),
                    file_size: Some(request.file_size),
                    mime_type: request.mime_type.to_owned(),
                    height: None,
                    width: None,
                    storage: request.storage.to_owned(),
                    url: request.url.to_owned(),
                    store_path: None,
                }),
                error_cause: None,
            })
            .collect();
        self.emit(StorageResultBatch {
            group_id: group_id.to_owned(),
            kind: StorageResultKind::Reference,
            success,
            errors: vec![],
        })?;
        Ok(group_id)
    }

    async fn delete(&self, requests: Vec<FileDeletionRequest>) -> anyhow::Result<String> {
        let group_id = self.next_group("delete");
        let success = requests
            .iter()
            .map(|request| FileResultInfo {
                group_id: group_id.to_owned(),
                request_checksum: request.checksum.to_owned(),
                request_storage: request.storage.to_owned(),
                request_owners: vec![request.owner.to_owned()],
                result_file: None,
                error_cause: None,
            })
            .collect();
        self.emit(StorageResultBatch {
            group_id: group_id.to_owned(),
            kind: StorageResultKind::Deletion,
            success,
            errors: vec![],
        })?;
        Ok(group_id)
    }

    async fn cancel(&self, group_ids: &[String]) -> anyhow::Result<()> {
        tracing::info!(?group_ids, "cancelled outstanding storage groups");
        Ok(())
    }
}
