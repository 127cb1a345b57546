use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::vo::oais::DataType;

/// One configured storage backend and its acceptance rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageMetadata {
    /// Backend business id.
    pub storage: String,
    /// Subdirectory files of this dispatch land in.
    pub store_path: Option<String>,
    /// Empty set accepts every data type.
    pub accepted_types: HashSet<DataType>,
    pub size_min: Option<u64>,
    pub size_max: Option<u64>,
}

/// Ask the storage service to copy and own the bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStorageRequest {
    /// Public id of the owning AIP.
    pub owner: String,
    pub checksum: String,
    pub algorithm: String,
    pub filename: String,
    pub mime_type: Option<String>,
    pub file_size: Option<u64>,
    /// Where the bytes currently are.
    pub origin_url: String,
    pub storage: String,
    pub store_path: Option<String>,
}

/// Ask the storage service to record a pointer to externally-owned bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReferenceRequest {
    pub owner: String,
    pub checksum: String,
    pub algorithm: String,
    pub filename: String,
    pub mime_type: Option<String>,
    pub file_size: u64,
    pub storage: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDeletionRequest {
    pub owner: String,
    pub checksum: String,
    pub storage: String,
}

/// One asynchronous storage result, matched back to a data object by
/// checksum and to a request by group id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResultInfo {
    pub group_id: String,
    pub request_checksum: String,
    pub request_storage: String,
    /// Public ids of the AIPs owning the file.
    pub request_owners: Vec<String>,
    pub result_file: Option<ResultFile>,
    pub error_cause: Option<String>,
}

/// Authoritative file description returned by the storage service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultFile {
    pub checksum: String,
    pub file_size: Option<u64>,
    pub mime_type: Option<String>,
    pub height: Option<u32>,
    pub width: Option<u32>,
    pub storage: String,
    pub url: String,
    pub store_path: Option<String>,
}

/// Batched callback envelope consumed by the reconciliation entrypoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageResultBatch {
    pub group_id: String,
    pub kind: StorageResultKind,
    pub success: Vec<FileResultInfo>,
    pub errors: Vec<FileResultInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageResultKind {
    Store,
    Reference,
    Deletion,
    RequestDenied,
}

impl StorageMetadata {
    pub fn new(storage: &str) -> Self {
        Self {
            storage: storage.to_owned(),
            ..Default::default()
        }
    }
}
