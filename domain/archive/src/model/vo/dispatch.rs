use crate::model::vo::storage::{FileReferenceRequest, FileStorageRequest};

/// What one dispatch pass wants the storage client to do. The caller submits
/// both collections and records the returned correlation ids.
#[derive(Debug, Clone, Default)]
pub struct DispatchPlan {
    pub files_to_store: Vec<FileStorageRequest>,
    pub files_to_reference: Vec<FileReferenceRequest>,
}

impl DispatchPlan {
    pub fn is_empty(&self) -> bool {
        self.files_to_store.is_empty() && self.files_to_reference.is_empty()
    }
}

/// What a reconciliation pass touched, so callers persist exactly what changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    /// AIP content changed, the manifest must be saved again.
    pub content_edited: bool,
    /// Entity-level fields changed, the entity row must be saved.
    pub entity_edited: bool,
}

impl UpdateResult {
    pub fn merge(&mut self, other: UpdateResult) {
        self.content_edited |= other.content_edited;
        self.entity_edited |= other.entity_edited;
    }

    pub fn any(&self) -> bool {
        self.content_edited || self.entity_edited
    }
}
