use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use domain_archive::{
    exception::ArchiveException,
    model::{
        entity::{
            request::{RequestPayload, RequestState},
            ArchiveRequest,
        },
        vo::storage::StorageMetadata,
    },
    repository::{AipRepo, RequestRepo},
    service::AipUpdateService,
};
use typed_builder::TypedBuilder;

#[derive(TypedBuilder)]
pub struct AipUpdateServiceImpl {
    aip_repo: Arc<dyn AipRepo>,
    request_repo: Arc<dyn RequestRepo>,
}

#[async_trait]
impl AipUpdateService for AipUpdateServiceImpl {
    async fn run_update(&self, request: &mut ArchiveRequest) -> anyhow::Result<()> {
        let RequestPayload::Update {
            aip_ids,
            add_tags,
            remove_tags,
            add_categories,
            remove_categories,
        } = &request.payload
        else {
            return Err(ArchiveException::UnexpectedPayload {
                id: request.id,
                expected: "update",
            }
            .into());
        };

        let mut content_edited = false;
        let mut edited_scope = vec![];
        for id in aip_ids {
            let mut aip = self.aip_repo.get_by_id(*id).await?;
            let mut edited = false;

            aip.aip.tags.retain(|t| {
                let keep = !remove_tags.contains(t);
                edited |= !keep;
                keep
            });
            for tag in add_tags {
                if !aip.aip.tags.contains(tag) {
                    aip.aip.tags.push(tag.to_owned());
                    edited = true;
                }
            }
            for category in remove_categories {
                edited |= aip.aip.categories.remove(category);
            }
            for category in add_categories {
                edited |= aip.aip.categories.insert(category.to_owned());
            }

            if edited {
                aip.aip.add_event("Package tags and categories updated.");
                aip.last_update = Utc::now();
                self.aip_repo.save(&aip).await?;
                edited_scope.push((aip.id, aip.storages.clone()));
                content_edited = true;
            }
        }

        // Content changed, so the stored manifests are stale: chain a
        // metadata-save request over the same scope.
        if content_edited {
            let aip_ids = edited_scope.iter().map(|(id, _)| *id).collect();
            let storages = edited_scope
                .iter()
                .flat_map(|(_, storages)| storages.iter())
                .map(|s| StorageMetadata::new(s))
                .collect();
            let follow_up = ArchiveRequest::new(
                &request.session_owner,
                &request.session,
                RequestPayload::SaveMetadata { aip_ids, storages },
            );
            self.request_repo.save(&follow_up).await?;
        }

        request.state = RequestState::Done;
        self.request_repo.delete(request.id).await?;
        Ok(())
    }
}
