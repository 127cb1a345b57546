use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Job submitted to the execution substrate: a named job plus the requests
/// it must run. Fire-and-forget from the core's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCommand {
    pub kind: JobKind,
    pub request_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobKind {
    IngestStorage,
    UpdateRunner,
    SaveMetadata,
    DeletionRunner,
}
