use async_trait::async_trait;
use dashmap::DashMap;
use domain_archive::{
    model::entity::{
        request::{RequestPayload, RequestState},
        ArchiveRequest,
    },
    repository::RequestRepo,
};
use uuid::Uuid;

#[derive(Default)]
pub struct DashMapRequestRepo {
    requests: DashMap<Uuid, ArchiveRequest>,
}

#[async_trait]
impl RequestRepo for DashMapRequestRepo {
    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<ArchiveRequest> {
        self.requests
            .get(&id)
            .map(|r| r.clone())
            .ok_or_else(|| anyhow::anyhow!("no request with id: {id}"))
    }

    async fn find_by_remote_step_group_id(
        &self,
        group_id: &str,
    ) -> anyhow::Result<Option<ArchiveRequest>> {
        Ok(self
            .requests
            .iter()
            .find(|r| r.remote_step_group_ids.iter().any(|g| g == group_id))
            .map(|r| r.clone()))
    }

    async fn find_page_by_state(
        &self,
        state: RequestState,
        page_size: usize,
    ) -> anyhow::Result<Vec<ArchiveRequest>> {
        let mut page: Vec<ArchiveRequest> = self
            .requests
            .iter()
            .filter(|r| r.state == state)
            .map(|r| r.clone())
            .collect();
        page.sort_by_key(|r| (r.creation_date, r.id));
        page.truncate(page_size);
        Ok(page)
    }

    async fn find_pending_by_aip_id(&self, aip_id: Uuid) -> anyhow::Result<Vec<ArchiveRequest>> {
        Ok(self
            .requests
            .iter()
            .filter(|r| r.state.is_pending() && r.aip_scope().contains(&aip_id))
            .map(|r| r.clone())
            .collect())
    }

    async fn find_pending_by_aip_ids(
        &self,
        aip_ids: &[Uuid],
    ) -> anyhow::Result<Vec<ArchiveRequest>> {
        Ok(self
            .requests
            .iter()
            .filter(|r| r.state.is_pending() && r.overlaps(aip_ids))
            .map(|r| r.clone())
            .collect())
    }

    async fn exists_deletion_pending(&self, sip_id: &str) -> anyhow::Result<bool> {
        Ok(self.requests.iter().any(|r| {
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
        self.requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        self.requests.remove(&id);
        Ok(())
    }
}
