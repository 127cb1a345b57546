use async_trait::async_trait;
use dashmap::DashMap;
use domain_archive::{model::entity::LastAip, repository::LastAipRepo};
use uuid::Uuid;

/// Last-version index keyed by provider id, one row per provider.
#[derive(Default)]
pub struct DashMapLastAipRepo {
    rows: DashMap<String, LastAip>,
}

#[async_trait]
impl LastAipRepo for DashMapLastAipRepo {
    async fn find_by_provider_id(&self, provider_id: &str) -> anyhow::Result<Option<LastAip>> {
        Ok(self.rows.get(provider_id).map(|r| r.clone()))
    }

    async fn insert(&self, last: &LastAip) -> anyhow::Result<()> {
        self.rows.insert(last.provider_id.to_owned(), last.clone());
        Ok(())
    }

    async fn delete_by_aip_ids(&self, aip_ids: &[Uuid]) -> anyhow::Result<()> {
        self.rows.retain(|_, row| !aip_ids.contains(&row.aip_id));
        Ok(())
    }
}
