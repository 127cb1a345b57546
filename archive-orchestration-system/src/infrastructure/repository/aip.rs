use async_trait::async_trait;
use dashmap::DashMap;
use domain_archive::{model::entity::AipEntity, repository::AipRepo};
use uuid::Uuid;

/// Process-local entity store. A relational adapter can replace it without
/// touching the services.
#[derive(Default)]
pub struct DashMapAipRepo {
    aips: DashMap<Uuid, AipEntity>,
}

#[async_trait]
impl AipRepo for DashMapAipRepo {
    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<AipEntity> {
        self.aips
            .get(&id)
            .map(|a| a.clone())
            .ok_or_else(|| anyhow::anyhow!("no aip with id: {id}"))
    }

    async fn find_by_aip_id(&self, aip_id: &str) -> anyhow::Result<Option<AipEntity>> {
        Ok(self
            .aips
            .iter()
            .find(|a| a.aip_id == aip_id)
            .map(|a| a.clone()))
    }

    async fn find_by_provider_id(&self, provider_id: &str) -> anyhow::Result<Vec<AipEntity>> {
        Ok(self
            .aips
            .iter()
            .filter(|a| a.provider_id == provider_id)
            .map(|a| a.clone())
            .collect())
    }

    async fn find_last_by_provider_id(
        &self,
        provider_id: &str,
    ) -> anyhow::Result<Option<AipEntity>> {
        Ok(self
            .aips
            .iter()
            .find(|a| a.provider_id == provider_id && a.last)
            .map(|a| a.clone()))
    }

    async fn find_by_sip_id(&self, sip_id: &str) -> anyhow::Result<Vec<AipEntity>> {
        Ok(self
            .aips
            .iter()
            .filter(|a| a.aip.sip_id == sip_id)
            .map(|a| a.clone())
            .collect())
    }

    async fn save(&self, aip: &AipEntity) -> anyhow::Result<()> {
        self.aips.insert(aip.id, aip.clone());
        Ok(())
    }

    async fn save_all(&self, aips: &[AipEntity]) -> anyhow::Result<()> {
        for aip in aips {
            self.aips.insert(aip.id, aip.clone());
        }
        Ok(())
    }

    async fn delete_all(&self, ids: &[Uuid]) -> anyhow::Result<()> {
        for id in ids {
            self.aips.remove(id);
        }
        Ok(())
    }
}
