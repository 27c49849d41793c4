//! File-backed persistence

mod common;

use tempfile::TempDir;

use common::fixtures::{draft, test_config};
use toby_core::{AutoConfirm, CollectionStore, JsonFileGateway, NullChannel, PersistenceGateway};

#[tokio::test]
async fn test_store_state_survives_reopen() {
    let dir = TempDir::new().unwrap();

    let mut store = CollectionStore::open(
        JsonFileGateway::new(dir.path()),
        NullChannel,
        AutoConfirm,
        test_config(),
    )
    .await;
    let collection = store.create_collection("Reading").await.unwrap();
    store
        .add_item(&collection.id, draft("https://tokio.rs"), true)
        .await
        .unwrap();
    store.toggle_collapsed(&collection.id).await;
    assert!(!store.is_unsynced());

    assert!(dir.path().join("collections.json").exists());
    assert!(dir.path().join("collapsedCollections.json").exists());

    let reopened = CollectionStore::open(
        JsonFileGateway::new(dir.path()),
        NullChannel,
        AutoConfirm,
        test_config(),
    )
    .await;
    assert_eq!(reopened.collections(), store.collections());
    assert!(reopened.is_collapsed(&collection.id));
}

#[tokio::test]
async fn test_missing_directory_is_an_empty_store() {
    let dir = TempDir::new().unwrap();
    let gateway = JsonFileGateway::new(dir.path().join("not-yet-created"));
    assert_eq!(gateway.load("collections").await.unwrap(), None);

    let store = CollectionStore::open(gateway, NullChannel, AutoConfirm, test_config()).await;
    assert!(store.collections().is_empty());
}

#[tokio::test]
async fn test_corrupt_file_is_logged_and_ignored() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("collections.json"), "{ not json").unwrap();

    let gateway = JsonFileGateway::new(dir.path());
    assert!(gateway.load("collections").await.is_err());

    let store = CollectionStore::open(gateway, NullChannel, AutoConfirm, test_config()).await;
    assert!(store.collections().is_empty());
}
