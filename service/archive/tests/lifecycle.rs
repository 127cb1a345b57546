mod common;

use std::sync::Arc;

use domain_archive::repository::{AipRepo, RequestRepo};
use common::{
    sample_aip, success_result, CountingSessionNotifier, InMemoryAipRepo, InMemoryLastAipRepo,
    InMemoryRequestRepo, RecordingPublisher, RecordingStorageClient,
};
use domain_archive::{
    model::{
        entity::{
            aip::AipState,
            request::{IngestStep, RequestPayload, RequestState},
            ArchiveRequest,
        },
        vo::{
            storage::{StorageMetadata, StorageResultBatch, StorageResultKind},
            VersioningMode,
        },
    },
    service::{
        DeletionService, StorageEventService, IngestRequestService, VersioningService,
    },
};
use service_archive::{
    DeletionServiceImpl, IngestRequestServiceImpl, StorageDispatchServiceImpl,
    StorageEventServiceImpl, StorageReconcileServiceImpl, VersioningServiceImpl,
    AipSaveMetadataServiceImpl,
};

/// Full pass over one package: ingest, store, reconcile, delete.
#[tokio::test]
async fn ingest_store_and_delete_one_package() {
    let aip_repo = Arc::new(InMemoryAipRepo::default());
    let last_repo = Arc::new(InMemoryLastAipRepo::default());
    let request_repo = Arc::new(InMemoryRequestRepo::default());
    let storage_client = Arc::new(RecordingStorageClient::default());
    let notifier = Arc::new(CountingSessionNotifier::default());
    let publisher = Arc::new(RecordingPublisher::default());

    let versioning = VersioningServiceImpl::builder()
        .aip_repo(aip_repo.clone())
        .last_aip_repo(last_repo.clone())
        .session_notifier(notifier.clone())
        .build();
    let ingest = Arc::new(
        IngestRequestServiceImpl::builder()
            .aip_repo(aip_repo.clone())
            .request_repo(request_repo.clone())
            .dispatcher(Arc::new(StorageDispatchServiceImpl))
            .reconciler(Arc::new(StorageReconcileServiceImpl))
            .storage_client(storage_client.clone())
            .session_notifier(notifier.clone())
            .publisher(publisher.clone())
            .build(),
    );
    let deletion = Arc::new(
        DeletionServiceImpl::builder()
            .aip_repo(aip_repo.clone())
            .last_aip_repo(last_repo.clone())
            .request_repo(request_repo.clone())
            .storage_client(storage_client.clone())
            .session_notifier(notifier.clone())
            .publisher(publisher.clone())
            .build(),
    );
    let metadata = Arc::new(
        AipSaveMetadataServiceImpl::builder()
            .aip_repo(aip_repo.clone())
            .request_repo(request_repo.clone())
            .dispatcher(Arc::new(StorageDispatchServiceImpl))
            .storage_client(storage_client.clone())
            .publisher(publisher.clone())
            .build(),
    );
    let events = StorageEventServiceImpl::builder()
        .request_repo(request_repo.clone())
        .ingest_service(ingest.clone())
        .metadata_service(metadata)
        .deletion_service(deletion.clone())
        .build();

    // Ingestion produced one fresh version.
    let mut aip = sample_aip("doc-1", "sip-1", 1, "abc123", 100);
    versioning.resolve(&mut aip, VersioningMode::IncVersion).await.unwrap();
    assert!(aip.last);

    // The scheduler hands the ingest request to its job.
    let mut request = ArchiveRequest::new(
        "owner",
        "session-1",
        RequestPayload::Ingest {
            aip_ids: vec![aip.id],
            storages: vec![StorageMetadata::new("local-disk")],
            step: IngestStep::LocalScheduled,
        },
    );
    request.state = RequestState::Running;
    request_repo.save(&request).await.unwrap();
    ingest.store_files(&mut request).await.unwrap();

    let (file_group, stored_requests) = storage_client.stored.lock().unwrap()[0].clone();
    assert_eq!(stored_requests.len(), 1);
    assert_eq!(stored_requests[0].storage, "local-disk");
    assert_eq!(request.state, RequestState::WaitingRemoteStorage);

    // Storage confirms the file copy.
    events
        .handle(StorageResultBatch {
            group_id: file_group.clone(),
            kind: StorageResultKind::Store,
            success: vec![success_result(&file_group, "abc123", "local-disk", "file:///x")],
            errors: vec![],
        })
        .await
        .unwrap();

    let stored = aip_repo.get_by_id(aip.id).await.unwrap();
    let object = &stored.aip.content_informations[0].data_object;
    assert_eq!(object.locations.len(), 1);
    assert_eq!(object.locations[0].storage.as_deref(), Some("local-disk"));
    assert_eq!(object.locations[0].url, "file:///x");
    assert_eq!(stored.storages.iter().collect::<Vec<_>>(), vec!["local-disk"]);
    assert!(stored.checksum.is_some());

    // Storage confirms the manifest copy, the request finalizes.
    let (manifest_group, manifest_requests) = storage_client.stored.lock().unwrap()[1].clone();
    assert_eq!(manifest_requests.len(), 1);
    events
        .handle(StorageResultBatch {
            group_id: manifest_group,
            kind: StorageResultKind::Store,
            success: vec![],
            errors: vec![],
        })
        .await
        .unwrap();

    let stored = aip_repo.get_by_id(aip.id).await.unwrap();
    assert_eq!(stored.state, AipState::Stored);
    assert!(request_repo.get_by_id(request.id).await.is_err());
    assert_eq!(notifier.stored.load(std::sync::atomic::Ordering::SeqCst), 1);

    // Administrative deletion reverses everything.
    deletion.process_deletion("sip-1", true).await.unwrap();

    assert!(aip_repo.get_by_id(aip.id).await.is_err());
    assert!(last_repo.rows.lock().unwrap().is_empty());
    assert!(aip_repo.find_by_provider_id("doc-1").await.unwrap().is_empty());
}

/// A storage failure routes the error onto the owning AIP and the request.
#[tokio::test]
async fn store_error_marks_request_and_aip() {
    let aip_repo = Arc::new(InMemoryAipRepo::default());
    let request_repo = Arc::new(InMemoryRequestRepo::default());
    let storage_client = Arc::new(RecordingStorageClient::default());
    let notifier = Arc::new(CountingSessionNotifier::default());
    let publisher = Arc::new(RecordingPublisher::default());
    let ingest = IngestRequestServiceImpl::builder()
        .aip_repo(aip_repo.clone())
        .request_repo(request_repo.clone())
        .dispatcher(Arc::new(StorageDispatchServiceImpl))
        .reconciler(Arc::new(StorageReconcileServiceImpl))
        .storage_client(storage_client.clone())
        .session_notifier(notifier.clone())
        .publisher(publisher.clone())
        .build();

    let aip = sample_aip("doc-1", "sip-1", 1, "abc123", 100);
    aip_repo.save(&aip).await.unwrap();
    let mut request = ArchiveRequest::new(
        "owner",
        "session-1",
        RequestPayload::Ingest {
            aip_ids: vec![aip.id],
            storages: vec![StorageMetadata::new("local-disk")],
            step: IngestStep::LocalScheduled,
        },
    );
    request.state = RequestState::Running;
    request_repo.save(&request).await.unwrap();
    ingest.store_files(&mut request).await.unwrap();
    let (group_id, _) = storage_client.stored.lock().unwrap()[0].clone();

    ingest
        .handle_remote_store_error(
            &group_id,
            vec![],
            vec![common::error_result(
                &group_id,
                "abc123",
                "local-disk",
                &aip.aip_id,
                "disk full",
            )],
        )
        .await
        .unwrap();

    let stored_request = request_repo.get_by_id(request.id).await.unwrap();
    assert_eq!(stored_request.state, RequestState::Error);
    assert!(stored_request.errors.iter().any(|e| e.contains("disk full")));
    assert!(stored_request.remote_step_group_ids.is_empty());

    let stored_aip = aip_repo.get_by_id(aip.id).await.unwrap();
    assert_eq!(stored_aip.state, AipState::Error);
    assert!(stored_aip.errors.iter().any(|e| e.contains("disk full")));
    assert_eq!(
        notifier.storage_failed.load(std::sync::atomic::Ordering::SeqCst),
        1
    );
}
