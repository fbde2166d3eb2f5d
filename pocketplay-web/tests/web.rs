//! Browser-backed storage and pipeline checks, run under wasm-bindgen-test.

#![cfg(target_arch = "wasm32")]

use pocketplay_web::{
    ProgressStore, STATS_KEY, StatsSnapshot, WebProgressStore, create_web_engine,
};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn clear_progress_keys() {
    let store = WebProgressStore;
    for key in [pocketplay_web::STATS_KEY, pocketplay_web::EARNED_KEY] {
        store.remove(key).unwrap();
    }
}

#[wasm_bindgen_test]
fn local_storage_roundtrip() {
    let store = WebProgressStore;
    store.set("pocketplay.test", r#"{"a":1}"#).unwrap();
    assert_eq!(
        store.get("pocketplay.test").unwrap().as_deref(),
        Some(r#"{"a":1}"#)
    );
    store.remove("pocketplay.test").unwrap();
    assert_eq!(store.get("pocketplay.test").unwrap(), None);
}

#[wasm_bindgen_test]
fn corrupt_stats_document_reads_as_default() {
    clear_progress_keys();
    let store = WebProgressStore;
    store.set(STATS_KEY, "{broken").unwrap();

    let (engine, _bridge) = create_web_engine();
    assert_eq!(engine.stats().read(), StatsSnapshot::default());
    clear_progress_keys();
}

#[wasm_bindgen_test]
fn end_report_persists_and_unlocks() {
    clear_progress_keys();
    let (engine, _bridge) = create_web_engine();

    engine.report_start("snake");
    engine.report_end("snake", 30, true, None);

    assert!(engine.earned_count() >= 3);
    let raw = WebProgressStore.get(STATS_KEY).unwrap();
    assert!(raw.is_some_and(|doc| doc.contains("snake")));
    clear_progress_keys();
}
