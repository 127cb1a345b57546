mod common;

use std::sync::Arc;

use domain_archive::repository::AipRepo;
use common::{sample_aip, CountingSessionNotifier, InMemoryAipRepo, InMemoryLastAipRepo};
use domain_archive::{
    model::vo::VersioningMode,
    service::VersioningService,
};
use service_archive::VersioningServiceImpl;

fn service(
    aip_repo: Arc<InMemoryAipRepo>,
    last_repo: Arc<InMemoryLastAipRepo>,
    notifier: Arc<CountingSessionNotifier>,
) -> VersioningServiceImpl {
    VersioningServiceImpl::builder()
        .aip_repo(aip_repo)
        .last_aip_repo(last_repo)
        .session_notifier(notifier)
        .build()
}

#[tokio::test]
async fn first_version_becomes_last_and_indexed() {
    let aip_repo = Arc::new(InMemoryAipRepo::default());
    let last_repo = Arc::new(InMemoryLastAipRepo::default());
    let notifier = Arc::new(CountingSessionNotifier::default());
    let service = service(aip_repo.clone(), last_repo.clone(), notifier.clone());

    let mut v1 = sample_aip("doc-1", "sip-1", 1, "abc123", 100);
    let to_delete = service.resolve(&mut v1, VersioningMode::IncVersion).await.unwrap();

    assert!(to_delete.is_none());
    assert!(v1.last);
    let rows = last_repo.rows.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].aip_id, v1.id);
    assert_eq!(rows[0].provider_id, "doc-1");
    assert_eq!(
        notifier.new_versions.load(std::sync::atomic::Ordering::SeqCst),
        1
    );
}

#[tokio::test]
async fn newer_version_takes_over_the_last_flag() {
    let aip_repo = Arc::new(InMemoryAipRepo::default());
    let last_repo = Arc::new(InMemoryLastAipRepo::default());
    let notifier = Arc::new(CountingSessionNotifier::default());
    let service = service(aip_repo.clone(), last_repo.clone(), notifier);

    let mut v2 = sample_aip("doc-1", "sip-1", 2, "abc123", 100);
    service.resolve(&mut v2, VersioningMode::IncVersion).await.unwrap();
    let mut v3 = sample_aip("doc-1", "sip-2", 3, "def456", 100);
    let to_delete = service.resolve(&mut v3, VersioningMode::IncVersion).await.unwrap();

    assert!(to_delete.is_none());
    assert!(v3.last);
    let stored_v2 = aip_repo.get_by_id(v2.id).await.unwrap();
    assert!(!stored_v2.last);
    // The index points at the new last version only.
    let rows = last_repo.rows.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].aip_id, v3.id);
}

#[tokio::test]
async fn older_version_arriving_late_stays_non_last() {
    let aip_repo = Arc::new(InMemoryAipRepo::default());
    let last_repo = Arc::new(InMemoryLastAipRepo::default());
    let notifier = Arc::new(CountingSessionNotifier::default());
    let service = service(aip_repo.clone(), last_repo.clone(), notifier);

    let mut v3 = sample_aip("doc-1", "sip-2", 3, "def456", 100);
    service.resolve(&mut v3, VersioningMode::IncVersion).await.unwrap();
    let mut v2 = sample_aip("doc-1", "sip-1", 2, "abc123", 100);
    let to_delete = service.resolve(&mut v2, VersioningMode::IncVersion).await.unwrap();

    assert!(to_delete.is_none());
    assert!(!v2.last);
    let stored_v3 = aip_repo.get_by_id(v3.id).await.unwrap();
    assert!(stored_v3.last);
    assert_eq!(last_repo.rows.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn equal_version_is_not_a_promotion() {
    let aip_repo = Arc::new(InMemoryAipRepo::default());
    let last_repo = Arc::new(InMemoryLastAipRepo::default());
    let notifier = Arc::new(CountingSessionNotifier::default());
    let service = service(aip_repo.clone(), last_repo.clone(), notifier);

    let mut first = sample_aip("doc-1", "sip-1", 2, "abc123", 100);
    service.resolve(&mut first, VersioningMode::IncVersion).await.unwrap();
    let mut duplicate = sample_aip("doc-1", "sip-2", 2, "def456", 100);
    service.resolve(&mut duplicate, VersioningMode::IncVersion).await.unwrap();

    assert!(!duplicate.last);
    let rows = last_repo.rows.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].aip_id, first.id);
}

#[tokio::test]
async fn replace_mode_names_the_superseded_version() {
    let aip_repo = Arc::new(InMemoryAipRepo::default());
    let last_repo = Arc::new(InMemoryLastAipRepo::default());
    let notifier = Arc::new(CountingSessionNotifier::default());
    let service = service(aip_repo.clone(), last_repo.clone(), notifier.clone());

    let mut v2 = sample_aip("doc-1", "sip-1", 2, "abc123", 100);
    service.resolve(&mut v2, VersioningMode::Replace).await.unwrap();
    let mut v3 = sample_aip("doc-1", "sip-2", 3, "def456", 100);
    let to_delete = service.resolve(&mut v3, VersioningMode::Replace).await.unwrap();

    // The new version won, the old one goes to the deletion orchestrator.
    assert_eq!(to_delete, Some(v2.id));
    assert_eq!(notifier.replaced.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn replace_mode_out_of_order_names_the_new_version() {
    let aip_repo = Arc::new(InMemoryAipRepo::default());
    let last_repo = Arc::new(InMemoryLastAipRepo::default());
    let notifier = Arc::new(CountingSessionNotifier::default());
    let service = service(aip_repo.clone(), last_repo.clone(), notifier);

    let mut v3 = sample_aip("doc-1", "sip-2", 3, "def456", 100);
    service.resolve(&mut v3, VersioningMode::Replace).await.unwrap();
    let mut v2 = sample_aip("doc-1", "sip-1", 2, "abc123", 100);
    let to_delete = service.resolve(&mut v2, VersioningMode::Replace).await.unwrap();

    // Ingested out of order: the late arrival itself is disposable.
    assert_eq!(to_delete, Some(v2.id));
    let stored_v3 = aip_repo.get_by_id(v3.id).await.unwrap();
    assert!(stored_v3.last);
}
