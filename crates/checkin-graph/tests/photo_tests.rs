//! Avatar download tests.

mod common;

use checkin_graph::{DirectorySource, GraphError};
use common::*;

#[tokio::test]
async fn test_fetch_photo_returns_raw_bytes() {
    let mock = MockGraphServer::new().await;
    let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    mock.mock_photo("jane%40example.com", jpeg.clone()).await;

    let client = mock.client();
    let bytes = client
        .fetch_photo(&token(), "jane@example.com")
        .await
        .unwrap();

    assert_eq!(bytes, jpeg);
}

#[tokio::test]
async fn test_fetch_photo_not_found() {
    let mock = MockGraphServer::new().await;
    mock.mock_photo_missing("ghost%40example.com").await;

    let client = mock.client();
    let result = client.fetch_photo(&token(), "ghost@example.com").await;

    match result {
        Err(err @ GraphError::NotFound(_)) => {
            assert!(err.to_string().contains("ImageNotFound"));
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}
