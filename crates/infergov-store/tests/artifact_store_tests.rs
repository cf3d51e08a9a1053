#![allow(clippy::unwrap_used, clippy::expect_used)]

// Artifact Store: idempotency, conflict detection and atomicity.

use infergov_core::model::ArtifactKind;
use infergov_core::GovErrorKind;
use infergov_store::{ArtifactStore, WriteMeta, WriteOutcome};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn setup_store() -> (ArtifactStore, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp store directory");
    let store = ArtifactStore::open(dir.path()).unwrap();
    (store, dir)
}

fn meta(parents: &[&str]) -> WriteMeta {
    WriteMeta::new(
        Some("2026-01-15T10:00:00Z".to_string()),
        parents.iter().map(|p| p.to_string()).collect(),
    )
}

fn count_tmp_files(dir: &Path) -> usize {
    let mut count = 0;
    for entry in fs::read_dir(dir).unwrap().filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_dir() {
            count += count_tmp_files(&path);
        } else if path.to_string_lossy().ends_with(".tmp") {
            count += 1;
        }
    }
    count
}

#[test]
fn test_same_content_twice_is_one_entry() {
    // Given a store
    let (store, _dir) = setup_store();
    let bytes = br#"{"kind":"inference.request","x":1}"#;

    // When the same bytes are written twice under the same id
    let first = store
        .write(ArtifactKind::Request, "req-1", bytes, &meta(&[]))
        .unwrap();
    let second = store
        .write(ArtifactKind::Request, "req-1", bytes, &meta(&[]))
        .unwrap();

    // Then the outcomes are created / already_exists with identical hashes
    assert_eq!(first.outcome, WriteOutcome::Created);
    assert_eq!(second.outcome, WriteOutcome::AlreadyExists);
    assert_eq!(first.sha256, second.sha256);
    assert_eq!(first.seq, second.seq);

    // And the registry holds exactly one entry
    assert_eq!(store.registry().len().unwrap(), 1);
}

#[test]
fn test_different_content_same_id_conflicts() {
    let (store, _dir) = setup_store();
    store
        .write(ArtifactKind::Response, "req-1--response", b"{\"t\":\"a\"}", &meta(&["req-1"]))
        .unwrap();

    let err = store
        .write(ArtifactKind::Response, "req-1--response", b"{\"t\":\"b\"}", &meta(&["req-1"]))
        .unwrap_err();

    assert!(err.is(GovErrorKind::ArtifactConflict));
    assert_eq!(err.artifact_id(), Some("req-1--response"));
    // original bytes untouched, registry unchanged
    assert_eq!(
        store.read(ArtifactKind::Response, "req-1--response").unwrap(),
        b"{\"t\":\"a\"}"
    );
    assert_eq!(store.registry().len().unwrap(), 1);
    assert_eq!(count_tmp_files(store.root()), 0);
}

#[test]
fn test_registry_entry_matches_bytes() {
    let (store, _dir) = setup_store();
    let bytes = b"{\"hello\":\"world\"}";
    store
        .write(ArtifactKind::Error, "e1", bytes, &meta(&["req-9"]))
        .unwrap();

    let entry = store.entry(ArtifactKind::Error, "e1").unwrap().unwrap();
    assert_eq!(entry.sha256, infergov_core::codec::hash_hex(bytes));
    assert_eq!(entry.byte_size, bytes.len() as u64);
    assert_eq!(entry.parent_artifact_ids, vec!["req-9".to_string()]);
    assert_eq!(entry.created_at_utc.as_deref(), Some("2026-01-15T10:00:00Z"));
}

#[test]
fn test_write_record_is_canonical() {
    let (store, _dir) = setup_store();
    let record = serde_json::json!({"b": 2, "a": 1});
    store
        .write_record(ArtifactKind::Request, "r", &record, &meta(&[]))
        .unwrap();
    assert_eq!(
        store.read(ArtifactKind::Request, "r").unwrap(),
        br#"{"a":1,"b":2}"#.to_vec()
    );
    let back: serde_json::Value = store.read_record(ArtifactKind::Request, "r").unwrap();
    assert_eq!(back, record);
}

#[test]
fn test_reopen_sees_previous_writes() {
    let dir = TempDir::new().unwrap();
    {
        let store = ArtifactStore::open(dir.path()).unwrap();
        store
            .write(ArtifactKind::Request, "persisted", b"{}", &meta(&[]))
            .unwrap();
    }
    let store = ArtifactStore::open(dir.path()).unwrap();
    assert!(store.exists(ArtifactKind::Request, "persisted").unwrap());
    let again = store
        .write(ArtifactKind::Request, "persisted", b"{}", &meta(&[]))
        .unwrap();
    assert_eq!(again.outcome, WriteOutcome::AlreadyExists);
}

#[test]
fn test_stray_file_without_registry_entry_is_invisible() {
    let (store, _dir) = setup_store();
    let path = store.path_of(ArtifactKind::Receipt, "ghost--receipt");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, b"{}").unwrap();

    assert!(!store.exists(ArtifactKind::Receipt, "ghost--receipt").unwrap());
    let err = store.read(ArtifactKind::Receipt, "ghost--receipt").unwrap_err();
    assert!(err.is(GovErrorKind::NotFound));
}
