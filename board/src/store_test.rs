use std::path::PathBuf;

use super::*;
use crate::doc::{Note, NoteColor, Placement, Point};

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("board-store-{}", uuid::Uuid::new_v4()))
}

fn sample_doc() -> BoardDocument {
    let mut doc = BoardDocument::new();
    let mut placement = Placement::new("note-1", Point::new(1.0, 2.0), 0.0);
    placement.z_index = 1;
    doc.notes.push(Note { placement, content: "Hello".into(), color: NoteColor::Green });
    doc.unlocked = true;
    doc
}

// =============================================================
// Memory store
// =============================================================

#[test]
fn empty_store_is_missing() {
    assert_eq!(load_document(&MemoryStore::new()), LoadOutcome::Missing);
}

#[test]
fn save_then_load_restores() {
    let mut store = MemoryStore::new();
    save_document(&mut store, &sample_doc()).unwrap();
    assert!(store.get(STORAGE_KEY).is_some());
    assert_eq!(load_document(&store), LoadOutcome::Restored(sample_doc()));
}

#[test]
fn malformed_json_is_corrupt() {
    let store = MemoryStore::with_entry(STORAGE_KEY, "{not json");
    assert_eq!(load_document(&store), LoadOutcome::Corrupt);
}

#[test]
fn wrong_shape_is_corrupt() {
    let store = MemoryStore::with_entry(STORAGE_KEY, r#"{"notes": 7}"#);
    assert_eq!(load_document(&store), LoadOutcome::Corrupt);
}

#[test]
fn duplicate_ids_are_corrupt() {
    let raw = r#"{"notes":[
        {"id":"x","position":{"x":0,"y":0},"rotation":0,"zIndex":1,"content":"a","color":"pink"},
        {"id":"x","position":{"x":0,"y":0},"rotation":0,"zIndex":2,"content":"b","color":"pink"}
    ]}"#;
    let store = MemoryStore::with_entry(STORAGE_KEY, raw);
    assert_eq!(load_document(&store), LoadOutcome::Corrupt);
}

#[test]
fn partial_document_restores_with_defaults() {
    let store = MemoryStore::with_entry(STORAGE_KEY, r#"{"unlocked":true}"#);
    let LoadOutcome::Restored(doc) = load_document(&store) else {
        panic!("expected a restored document");
    };
    assert!(doc.unlocked);
    assert!(doc.is_empty());
}

#[test]
fn null_rotation_is_corrupt() {
    let raw = r#"{"stickers":[
        {"id":"s","position":{"x":0,"y":0},"rotation":null,"zIndex":1,"kind":"heart"}
    ]}"#;
    let store = MemoryStore::with_entry(STORAGE_KEY, raw);
    assert_eq!(load_document(&store), LoadOutcome::Corrupt);
}

// =============================================================
// File store
// =============================================================

#[test]
fn file_store_missing_dir_reads_none() {
    let store = FileStore::new(scratch_dir());
    assert!(store.read(STORAGE_KEY).unwrap().is_none());
}

#[test]
fn file_store_round_trip() {
    let dir = scratch_dir();
    let mut store = FileStore::new(&dir);
    save_document(&mut store, &sample_doc()).unwrap();

    assert!(store.path_for(STORAGE_KEY).ends_with("scrapbookData.json"));
    assert!(!store.path_for(STORAGE_KEY).with_extension("json.tmp").exists());

    let reopened = FileStore::new(&dir);
    assert_eq!(load_document(&reopened), LoadOutcome::Restored(sample_doc()));
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn file_store_overwrites_whole_document() {
    let dir = scratch_dir();
    let mut store = FileStore::new(&dir);
    save_document(&mut store, &sample_doc()).unwrap();
    save_document(&mut store, &BoardDocument::new()).unwrap();
    assert_eq!(load_document(&store), LoadOutcome::Restored(BoardDocument::new()));
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn file_store_unreadable_entry_is_corrupt() {
    let dir = scratch_dir();
    let store = FileStore::new(&dir);
    // A directory where the file should be makes the read fail.
    fs::create_dir_all(store.path_for(STORAGE_KEY)).unwrap();
    assert_eq!(load_document(&store), LoadOutcome::Corrupt);
    fs::remove_dir_all(dir).unwrap();
}
