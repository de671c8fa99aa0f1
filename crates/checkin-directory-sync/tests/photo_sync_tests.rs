//! Photo sync against in-memory directory and store.

mod common;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use checkin_directory_sync::{
    DirectorySyncError, PhotoSync, PhotoSyncOutcome, PhotoSyncReport, PhotoTarget, StoreCall,
};
use checkin_graph::InMemoryDirectorySource;
use common::{local_user, store_with, token};
use std::sync::Arc;

fn report(outcome: PhotoSyncOutcome) -> PhotoSyncReport {
    match outcome {
        PhotoSyncOutcome::Completed(report) => report,
        PhotoSyncOutcome::NothingToSync => panic!("expected a photo sync"),
    }
}

fn source_with_photos(mails: &[&str]) -> Arc<InMemoryDirectorySource> {
    let source = InMemoryDirectorySource::default();
    for mail in mails {
        source.add_photo(mail, mail.as_bytes().to_vec());
    }
    Arc::new(source)
}

#[tokio::test]
async fn test_one_failure_does_not_affect_siblings() {
    let store = store_with(vec![
        local_user(Some("a@example.com"), "A"),
        local_user(Some("b@example.com"), "B"),
        local_user(Some("c@example.com"), "C"),
    ]);
    let source = source_with_photos(&["a@example.com", "c@example.com"]);
    source.fail_photo("b@example.com");
    let sync = PhotoSync::new(source, store.clone());

    let report = report(sync.run(&token(), PhotoTarget::MissingPhoto).await.unwrap());

    assert_eq!(report.successful_updates, 2);
    assert_eq!(report.failed_updates, 1);
    let mails: Vec<_> = report.details.iter().map(|d| d.mail.as_deref()).collect();
    assert_eq!(
        mails,
        vec![Some("a@example.com"), Some("b@example.com"), Some("c@example.com")]
    );
    assert!(!report.details[1].success);
    assert!(report.details[1].error.is_some());
    assert_eq!(
        store.get_by_mail("c@example.com").unwrap().photo,
        Some(STANDARD.encode("c@example.com"))
    );
    assert!(store.get_by_mail("b@example.com").unwrap().photo.is_none());
}

#[tokio::test]
async fn test_nothing_to_sync_when_all_have_photos() {
    let mut user = local_user(Some("a@example.com"), "A");
    user.photo = Some("eA==".to_string());
    let store = store_with(vec![user]);
    let source = source_with_photos(&[]);
    let sync = PhotoSync::new(source.clone(), store);

    let outcome = sync.run(&token(), PhotoTarget::MissingPhoto).await.unwrap();

    assert_eq!(outcome, PhotoSyncOutcome::NothingToSync);
    assert_eq!(source.photo_requests(), 0);
}

#[tokio::test]
async fn test_explicit_ids_include_users_with_photos() {
    let mut user = local_user(Some("a@example.com"), "A");
    user.photo = Some("b2xk".to_string());
    let id = user.id;
    let store = store_with(vec![user, local_user(Some("b@example.com"), "B")]);
    let source = source_with_photos(&["a@example.com", "b@example.com"]);
    let sync = PhotoSync::new(source.clone(), store.clone());

    let report = report(sync.run(&token(), PhotoTarget::Ids(vec![id])).await.unwrap());

    assert_eq!(report.successful_updates, 1);
    assert_eq!(source.photo_requests(), 1);
    assert_eq!(
        store.get_by_mail("a@example.com").unwrap().photo,
        Some(STANDARD.encode("a@example.com"))
    );
}

#[tokio::test]
async fn test_user_without_mail_fails_without_fetch() {
    let store = store_with(vec![local_user(None, "Nobody")]);
    let source = source_with_photos(&[]);
    let sync = PhotoSync::new(source.clone(), store);

    let report = report(sync.run(&token(), PhotoTarget::MissingPhoto).await.unwrap());

    assert_eq!(report.failed_updates, 1);
    assert!(report.details[0].mail.is_none());
    assert_eq!(source.photo_requests(), 0);
}

#[tokio::test]
async fn test_store_failure_is_isolated() {
    let store = store_with(vec![
        local_user(Some("a@example.com"), "A"),
        local_user(Some("b@example.com"), "B"),
    ]);
    store.fail_writes_for("a@example.com");
    let source = source_with_photos(&["a@example.com", "b@example.com"]);
    let sync = PhotoSync::new(source, store.clone());

    let report = report(sync.run(&token(), PhotoTarget::MissingPhoto).await.unwrap());

    assert_eq!(report.successful_updates, 1);
    assert_eq!(report.failed_updates, 1);
    assert!(store
        .calls()
        .contains(&StoreCall::UpdatePhoto("b@example.com".to_string())));
}

#[tokio::test]
async fn test_fan_out_is_bounded() {
    let users = (0..20)
        .map(|i| local_user(Some(&format!("user{i}@example.com")), "U"))
        .collect();
    let store = store_with(users);
    let mails: Vec<String> = (0..20).map(|i| format!("user{i}@example.com")).collect();
    let source = InMemoryDirectorySource::default();
    for mail in &mails {
        source.add_photo(mail, vec![1, 2, 3]);
    }
    let source = Arc::new(source);
    let sync = PhotoSync::new(source.clone(), store).with_concurrency(4);

    let report = report(sync.run(&token(), PhotoTarget::MissingPhoto).await.unwrap());

    assert_eq!(report.successful_updates, 20);
    assert!(source.peak_photos_in_flight() <= 4);
    assert!(source.peak_photos_in_flight() > 1);
}

#[tokio::test]
async fn test_blank_token_is_rejected() {
    let store = store_with(vec![local_user(Some("a@example.com"), "A")]);
    let sync = PhotoSync::new(source_with_photos(&[]), store.clone());

    let err = sync
        .run(&secrecy::SecretString::from(" ".to_string()), PhotoTarget::MissingPhoto)
        .await
        .unwrap_err();

    assert!(matches!(err, DirectorySyncError::MissingAccessToken));
    assert!(store.calls().is_empty());
}
