use async_trait::async_trait;

use crate::model::vo::storage::{FileDeletionRequest, FileReferenceRequest, FileStorageRequest};

/// Asynchronous storage backend client. Every operation returns immediately
/// with a correlation id; results arrive later as [`StorageResultBatch`]
/// events.
///
/// [`StorageResultBatch`]: crate::model::vo::storage::StorageResultBatch
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn store(&self, requests: Vec<FileStorageRequest>) -> anyhow::Result<String>;
    async fn reference(&self, requests: Vec<FileReferenceRequest>) -> anyhow::Result<String>;
    async fn delete(&self, requests: Vec<FileDeletionRequest>) -> anyhow::Result<String>;
    /// Best effort; failures propagate to the caller.
    async fn cancel(&self, group_ids: &[String]) -> anyhow::Result<()>;
}
