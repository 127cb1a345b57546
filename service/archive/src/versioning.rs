use std::sync::Arc;

use async_trait::async_trait;
use domain_archive::{
    model::{
        entity::{AipEntity, LastAip},
        vo::VersioningMode,
    },
    repository::{AipRepo, LastAipRepo},
    service::{SessionNotifier, VersioningService},
};
use typed_builder::TypedBuilder;
use uuid::Uuid;

#[derive(TypedBuilder)]
pub struct VersioningServiceImpl {
    aip_repo: Arc<dyn AipRepo>,
    last_aip_repo: Arc<dyn LastAipRepo>,
    session_notifier: Arc<dyn SessionNotifier>,
}

#[async_trait]
impl VersioningService for VersioningServiceImpl {
    async fn resolve(
        &self,
        new_aip: &mut AipEntity,
        mode: VersioningMode,
    ) -> anyhow::Result<Option<Uuid>> {
        self.session_notifier
            .increment_new_versions(&new_aip.session_owner, &new_aip.session, 1)
            .await?;

        let Some(mut previous) =
            self.aip_repo.find_last_by_provider_id(&new_aip.provider_id).await?
        else {
            // First version for this provider id.
            new_aip.last = true;
            self.aip_repo.save(new_aip).await?;
            self.last_aip_repo
                .insert(&LastAip::new(new_aip.id, &new_aip.provider_id))
                .await?;
            return Ok(None);
        };

        if new_aip.version == previous.version {
            tracing::warn!(
                provider_id = %new_aip.provider_id,
                version = new_aip.version,
                "two entities share the same version number, keeping the existing last"
            );
        }

        if new_aip.version > previous.version {
            previous.last = false;
            new_aip.last = true;
            self.aip_repo.save(&previous).await?;
            self.aip_repo.save(new_aip).await?;
            // Flag and index always move together.
            self.last_aip_repo.delete_by_aip_ids(&[previous.id]).await?;
            self.last_aip_repo
                .insert(&LastAip::new(new_aip.id, &new_aip.provider_id))
                .await?;
        } else {
            // Ingested out of order, the new entity stays non-last.
            new_aip.last = false;
            self.aip_repo.save(new_aip).await?;
        }

        if mode != VersioningMode::Replace {
            return Ok(None);
        }

        self.session_notifier
            .increment_replaced(&new_aip.session_owner, &new_aip.session)
            .await?;
        // Under Replace the superseded entity goes to the deletion
        // orchestrator; the resolver only names it.
        Ok(Some(if new_aip.last { previous.id } else { new_aip.id }))
    }
}
