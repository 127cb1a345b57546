use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::vo::storage::StorageMetadata;

/// Long-running unit of work referencing zero or more AIPs.
///
/// One variant per request kind, sharing the state machine core; the payload
/// carries the kind-specific data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveRequest {
    pub id: Uuid,
    pub state: RequestState,
    /// Correlation ids of outstanding remote storage operations. Must mirror
    /// exactly what the storage client returned for this request; state only
    /// advances once every id has resolved.
    pub remote_step_group_ids: Vec<String>,
    pub errors: Vec<String>,
    pub session_owner: String,
    pub session: String,
    pub creation_date: DateTime<Utc>,
    pub payload: RequestPayload,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestState {
    /// Queued, not yet scheduled.
    #[default]
    Created,
    /// A conflicting request already runs against the same AIPs.
    Blocked,
    /// Mid-flight, waiting on a remote step.
    ToSchedule,
    /// Claimed by a job.
    Running,
    WaitingRemoteStorage,
    WaitingNotifierResponse,
    Error,
    Done,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RequestPayload {
    /// Store files then manifests for freshly generated AIPs.
    Ingest {
        aip_ids: Vec<Uuid>,
        storages: Vec<StorageMetadata>,
        step: IngestStep,
    },
    /// Tag and category edits.
    Update {
        aip_ids: Vec<Uuid>,
        add_tags: Vec<String>,
        remove_tags: Vec<String>,
        add_categories: Vec<String>,
        remove_categories: Vec<String>,
    },
    /// Re-save AIP manifests after a content change.
    SaveMetadata {
        aip_ids: Vec<Uuid>,
        storages: Vec<StorageMetadata>,
    },
    /// Remove every version under a SIP.
    Deletion {
        sip_id: String,
        aip_ids: Vec<Uuid>,
        deletion_mode: DeletionMode,
    },
}

/// Remote step of an ingest request: files first, manifests second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IngestStep {
    #[default]
    LocalScheduled,
    RemoteStorageRequested,
    RemoteAipStorageRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeletionMode {
    /// Keep the rows, mark them deleted.
    ByState,
    /// Remove the rows for good.
    Irrevocably,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Ingest,
    Update,
    SaveMetadata,
    Deletion,
}

impl ArchiveRequest {
    pub fn new(session_owner: &str, session: &str, payload: RequestPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: RequestState::default(),
            remote_step_group_ids: vec![],
            errors: vec![],
            session_owner: session_owner.to_owned(),
            session: session.to_owned(),
            creation_date: Utc::now(),
            payload,
        }
    }

    pub fn kind(&self) -> RequestKind {
        match &self.payload {
            RequestPayload::Ingest { .. } => RequestKind::Ingest,
            RequestPayload::Update { .. } => RequestKind::Update,
            RequestPayload::SaveMetadata { .. } => RequestKind::SaveMetadata,
            RequestPayload::Deletion { .. } => RequestKind::Deletion,
        }
    }

    /// Internal ids of the AIPs this request works on.
    pub fn aip_scope(&self) -> &[Uuid] {
        match &self.payload {
            RequestPayload::Ingest { aip_ids, .. }
            | RequestPayload::Update { aip_ids, .. }
            | RequestPayload::SaveMetadata { aip_ids, .. }
            | RequestPayload::Deletion { aip_ids, .. } => aip_ids,
        }
    }

    pub fn add_error(&mut self, cause: impl Into<String>) {
        self.errors.push(cause.into());
    }

    /// Remove one resolved correlation id; returns how many are still pending.
    pub fn resolve_remote_step(&mut self, group_id: &str) -> usize {
        self.remote_step_group_ids.retain(|g| g != group_id);
        self.remote_step_group_ids.len()
    }

    pub fn overlaps(&self, aip_ids: &[Uuid]) -> bool {
        let scope: HashSet<&Uuid> = self.aip_scope().iter().collect();
        aip_ids.iter().any(|id| scope.contains(id))
    }
}

impl RequestKind {
    /// Kinds that mutate AIP content and must be serialized per AIP scope.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            RequestKind::Update | RequestKind::SaveMetadata | RequestKind::Deletion
        )
    }
}

impl RequestState {
    /// States counting as "in flight" for the blocking rule and the
    /// duplicate-deletion guard.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            RequestState::Created
                | RequestState::Blocked
                | RequestState::ToSchedule
                | RequestState::Running
                | RequestState::WaitingRemoteStorage
                | RequestState::WaitingNotifierResponse
        )
    }
}
