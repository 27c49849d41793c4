//! Shared fixtures for the integration tests

use std::path::PathBuf;
use std::sync::Arc;

use toby_core::{
    AutoConfirm, CollectionStore, Interaction, ItemDraft, MemoryGateway, NullChannel,
    RecordingInteraction, SyncChannel, TobyConfig,
};

/// Get the path to a fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_fixtures")
        .join(name)
}

/// Load a fixture file as a string
pub fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", name))
}

/// Load an import payload fixture
#[allow(dead_code)]
pub fn load_import_fixture(name: &str) -> String {
    load_fixture(&format!("import/{}", name))
}

/// Defaults with the reorder animation switched off
pub fn test_config() -> TobyConfig {
    let mut config = TobyConfig::default();
    config.reorder.animation_ms = 0;
    config
}

/// Store over a fresh memory gateway that confirms everything
#[allow(dead_code)]
pub fn memory_store() -> CollectionStore<MemoryGateway> {
    CollectionStore::new(MemoryGateway::new(), NullChannel, AutoConfirm, test_config())
}

/// Store over the given gateway and channel
#[allow(dead_code)]
pub async fn open_store(
    gateway: MemoryGateway,
    channel: impl SyncChannel + 'static,
    interaction: impl Interaction + 'static,
) -> CollectionStore<MemoryGateway> {
    CollectionStore::open(gateway, channel, interaction, test_config()).await
}

/// Store that records prompts and notifications
#[allow(dead_code)]
pub fn recording_store() -> (CollectionStore<MemoryGateway>, Arc<RecordingInteraction>) {
    let recorder = Arc::new(RecordingInteraction::new(true));
    let store = CollectionStore::new(
        MemoryGateway::new(),
        NullChannel,
        recorder.clone(),
        test_config(),
    );
    (store, recorder)
}

/// Draft whose title is derived from the URL
#[allow(dead_code)]
pub fn draft(url: &str) -> ItemDraft {
    ItemDraft::new(format!("Title of {}", url), url)
}
