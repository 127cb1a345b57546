use async_trait::async_trait;
use uuid::Uuid;

use crate::model::entity::{request::RequestState, ArchiveRequest};

#[async_trait]
pub trait RequestRepo: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<ArchiveRequest>;
    /// The request owning an outstanding storage correlation id, if any.
    async fn find_by_remote_step_group_id(
        &self,
        group_id: &str,
    ) -> anyhow::Result<Option<ArchiveRequest>>;
    /// One page of requests in the given state, ordered by creation date then
    /// id so paging stays deterministic.
    async fn find_page_by_state(
        &self,
        state: RequestState,
        page_size: usize,
    ) -> anyhow::Result<Vec<ArchiveRequest>>;
    /// Pending requests whose scope contains the given internal aip id.
    async fn find_pending_by_aip_id(&self, aip_id: Uuid) -> anyhow::Result<Vec<ArchiveRequest>>;
    /// Pending requests whose scope overlaps the given ids, the caller applies
    /// the blocking rule.
    async fn find_pending_by_aip_ids(
        &self,
        aip_ids: &[Uuid],
    ) -> anyhow::Result<Vec<ArchiveRequest>>;
    /// Is a deletion of this SIP already created, blocked, running or waiting?
    async fn exists_deletion_pending(&self, sip_id: &str) -> anyhow::Result<bool>;
    async fn save(&self, request: &ArchiveRequest) -> anyhow::Result<()>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<()>;
}
