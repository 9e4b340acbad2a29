use jonah_game::{
    ChapterId, INTRO_SEEN_KEY, JourneyController, KeyValueStore, PROGRESS_KEY, Progress,
};
use jonah_web::dom;
use jonah_web::storage::BrowserStore;
use wasm_bindgen_test::*;

fn clear() {
    let store = BrowserStore;
    store.remove_item(PROGRESS_KEY).expect("remove progress");
    store.remove_item(INTRO_SEEN_KEY).expect("remove intro flag");
}

#[wasm_bindgen_test]
fn browser_store_roundtrips_values() {
    clear();
    let store = BrowserStore;
    assert_eq!(store.get_item(PROGRESS_KEY).expect("read"), None);
    store.set_item(PROGRESS_KEY, "{}").expect("write");
    assert_eq!(store.get_item(PROGRESS_KEY).expect("read").as_deref(), Some("{}"));
    store.remove_item(PROGRESS_KEY).expect("remove");
    assert_eq!(store.get_item(PROGRESS_KEY).expect("read"), None);
}

#[wasm_bindgen_test]
fn journey_progress_lands_in_local_storage() {
    clear();
    let mut journey = JourneyController::with_bundled_assets(BrowserStore);
    journey.finish_intro();
    journey.chapter_completed(1).expect("complete chapter 1");
    journey.flush().expect("flush");

    let storage = dom::local_storage().expect("localStorage");
    let raw = storage
        .get_item(PROGRESS_KEY)
        .expect("read progress")
        .expect("progress stored");
    let stored = Progress::from_json(&raw).expect("valid progress");
    assert!(stored.is_completed(ChapterId::FIRST));
    assert_eq!(
        storage.get_item(INTRO_SEEN_KEY).expect("read flag").as_deref(),
        Some("true")
    );

    journey.restart();
    assert_eq!(storage.get_item(PROGRESS_KEY).expect("read"), None);
    assert_eq!(storage.get_item(INTRO_SEEN_KEY).expect("read"), None);
}
