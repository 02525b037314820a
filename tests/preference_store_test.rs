//! Preference store persistence and preferred-source selection

use source_resolver_lib::modules::provider::domain::StreamSource;
use source_resolver_lib::{
    select_preferred, AppError, InMemoryPreferenceStore, JsonFilePreferenceStore, PreferenceStore,
    SourceResult,
};
use std::path::PathBuf;
use tokio_test::{assert_err, assert_ok};

fn temp_file(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("source-resolver-{}", std::process::id()));
    let path = dir.join(name);
    let _ = std::fs::remove_file(&path);
    path
}

fn result(id: &str) -> SourceResult {
    SourceResult::from_sources(
        id,
        "Naruto",
        "gogoanime",
        &[StreamSource::new(&format!("http://x/{}.mp4", id), Some("720p"))],
    )
}

#[tokio::test]
async fn file_store_survives_reopen() {
    let path = temp_file("reopen.json");

    let store = assert_ok!(JsonFilePreferenceStore::open(&path).await);
    assert_eq!(store.get("Naruto").await, None);
    assert_ok!(store.set("Naruto", "naruto-2").await);
    assert_ok!(store.set("Naruto", "naruto-2").await);
    drop(store);

    let reopened = assert_ok!(JsonFilePreferenceStore::open(&path).await);
    assert_eq!(reopened.get("Naruto").await.as_deref(), Some("naruto-2"));

    let on_disk: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk["alisa_src_naruto"], "naruto-2");

    assert_ok!(reopened.clear("Naruto").await);
    assert_eq!(reopened.get("Naruto").await, None);

    let cleared = assert_ok!(JsonFilePreferenceStore::open(&path).await);
    assert_eq!(cleared.get("Naruto").await, None);
}

#[tokio::test]
async fn corrupt_file_is_reported() {
    let path = temp_file("corrupt.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{not json").unwrap();

    let error = assert_err!(JsonFilePreferenceStore::open(&path).await);
    assert!(matches!(error, AppError::SerializationError(_)));
}

#[tokio::test]
async fn preferred_result_is_selected_when_present() {
    let store = InMemoryPreferenceStore::new();
    let results = vec![result("naruto-1"), result("naruto-2")];

    let selected = select_preferred(&results, &store, "Naruto").await.unwrap();
    assert_eq!(selected.id, "naruto-1");

    assert_ok!(store.set("Naruto", "naruto-2").await);
    let selected = select_preferred(&results, &store, "Naruto").await.unwrap();
    assert_eq!(selected.id, "naruto-2");

    assert_ok!(store.set("Naruto", "gone").await);
    let selected = select_preferred(&results, &store, "Naruto").await.unwrap();
    assert_eq!(selected.id, "naruto-1");

    assert!(select_preferred(&[], &store, "Naruto").await.is_none());
}
