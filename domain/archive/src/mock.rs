use async_trait::async_trait;
use mockall::mock;
use uuid::Uuid;

use crate::{
    command::JobCommand,
    model::{
        entity::{request::RequestState, AipEntity, ArchiveRequest, LastAip},
        vo::msg::ArchiveEvent,
        vo::storage::{FileDeletionRequest, FileReferenceRequest, FileStorageRequest},
    },
    repository::{AipRepo, LastAipRepo, RequestRepo},
    service::{EventPublisher, JobClient, SessionNotifier, StorageClient},
};

mock! {
    pub AipRepo {}
    #[async_trait]
    impl AipRepo for AipRepo {
        async fn get_by_id(&self, id: Uuid) -> anyhow::Result<AipEntity>;
        async fn find_by_aip_id(&self, aip_id: &str) -> anyhow::Result<Option<AipEntity>>;
        async fn find_by_provider_id(&self, provider_id: &str) -> anyhow::Result<Vec<AipEntity>>;
        async fn find_last_by_provider_id(
            &self,
            provider_id: &str,
        ) -> anyhow::Result<Option<AipEntity>>;
        async fn find_by_sip_id(&self, sip_id: &str) -> anyhow::Result<Vec<AipEntity>>;
        async fn save(&self, aip: &AipEntity) -> anyhow::Result<()>;
        async fn save_all(&self, aips: &[AipEntity]) -> anyhow::Result<()>;
        async fn delete_all(&self, ids: &[Uuid]) -> anyhow::Result<()>;
    }
}

mock! {
    pub LastAipRepo {}
    #[async_trait]
    impl LastAipRepo for LastAipRepo {
        async fn find_by_provider_id(&self, provider_id: &str) -> anyhow::Result<Option<LastAip>>;
        async fn insert(&self, last: &LastAip) -> anyhow::Result<()>;
        async fn delete_by_aip_ids(&self, aip_ids: &[Uuid]) -> anyhow::Result<()>;
    }
}

mock! {
    pub RequestRepo {}
    #[async_trait]
    impl RequestRepo for RequestRepo {
        async fn get_by_id(&self, id: Uuid) -> anyhow::Result<ArchiveRequest>;
        async fn find_by_remote_step_group_id(
            &self,
            group_id: &str,
        ) -> anyhow::Result<Option<ArchiveRequest>>;
        async fn find_page_by_state(
            &self,
            state: RequestState,
            page_size: usize,
        ) -> anyhow::Result<Vec<ArchiveRequest>>;
        async fn find_pending_by_aip_id(&self, aip_id: Uuid) -> anyhow::Result<Vec<ArchiveRequest>>;
        async fn find_pending_by_aip_ids(
            &self,
            aip_ids: &[Uuid],
        ) -> anyhow::Result<Vec<ArchiveRequest>>;
        async fn exists_deletion_pending(&self, sip_id: &str) -> anyhow::Result<bool>;
        async fn save(&self, request: &ArchiveRequest) -> anyhow::Result<()>;
        async fn delete(&self, id: Uuid) -> anyhow::Result<()>;
    }
}

mock! {
    pub StorageClient {}
    #[async_trait]
    impl StorageClient for StorageClient {
        async fn store(&self, requests: Vec<FileStorageRequest>) -> anyhow::Result<String>;
        async fn reference(&self, requests: Vec<FileReferenceRequest>) -> anyhow::Result<String>;
        async fn delete(&self, requests: Vec<FileDeletionRequest>) -> anyhow::Result<String>;
        async fn cancel(&self, group_ids: &[String]) -> anyhow::Result<()>;
    }
}

mock! {
    pub SessionNotifier {}
    #[async_trait]
    impl SessionNotifier for SessionNotifier {
        async fn increment_new_versions(
            &self,
            session_owner: &str,
            session: &str,
            count: usize,
        ) -> anyhow::Result<()>;
        async fn increment_replaced(&self, session_owner: &str, session: &str) -> anyhow::Result<()>;
        async fn notify_aips_stored(&self, aips: &[AipEntity]) -> anyhow::Result<()>;
        async fn notify_aips_deleted(
            &self,
            session_owner: &str,
            session: &str,
            count: usize,
        ) -> anyhow::Result<()>;
        async fn notify_storage_failed(&self, aip: &AipEntity) -> anyhow::Result<()>;
    }
}

mock! {
    pub EventPublisher {}
    #[async_trait]
    impl EventPublisher for EventPublisher {
        async fn publish(&self, event: ArchiveEvent) -> anyhow::Result<()>;
    }
}

mock! {
    pub JobClient {}
    #[async_trait]
    impl JobClient for JobClient {
        async fn submit(&self, job: JobCommand) -> anyhow::Result<()>;
    }
}
