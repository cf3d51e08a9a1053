#![allow(clippy::unwrap_used, clippy::expect_used)]

// The registry is an append-only log; the database itself refuses edits.

use infergov_core::model::ArtifactKind;
use infergov_store::artifact::ArtifactStore;
use infergov_store::WriteMeta;
use rusqlite::Connection;
use tempfile::TempDir;

fn store_with_entries(n: usize) -> (ArtifactStore, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::open(dir.path()).unwrap();
    for i in 0..n {
        store
            .write(
                ArtifactKind::Request,
                &format!("req-{}", i),
                format!("{{\"i\":{}}}", i).as_bytes(),
                &WriteMeta::default(),
            )
            .unwrap();
    }
    (store, dir)
}

fn raw_connection(dir: &TempDir) -> Connection {
    Connection::open(dir.path().join("registry.sqlite3")).unwrap()
}

#[test]
fn test_update_is_refused() {
    let (_store, dir) = store_with_entries(2);
    let conn = raw_connection(&dir);

    let result = conn.execute(
        "UPDATE registry_entries SET sha256 = ?1 WHERE artifact_id = 'req-0'",
        [&"f".repeat(64)],
    );
    assert!(result.is_err());
}

#[test]
fn test_delete_is_refused() {
    let (store, dir) = store_with_entries(3);
    let conn = raw_connection(&dir);

    assert!(conn.execute("DELETE FROM registry_entries", []).is_err());
    assert_eq!(store.registry().len().unwrap(), 3);
}

#[test]
fn test_order_is_write_order() {
    let (store, _dir) = store_with_entries(5);
    let ids: Vec<String> = store
        .registry()
        .list()
        .unwrap()
        .into_iter()
        .map(|e| e.artifact_id)
        .collect();
    assert_eq!(ids, vec!["req-0", "req-1", "req-2", "req-3", "req-4"]);

    let seqs: Vec<i64> = store.registry().list().unwrap().iter().map(|e| e.seq).collect();
    assert!(seqs.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_listing_is_restartable() {
    let (store, _dir) = store_with_entries(5);
    let mut seen = Vec::new();
    let mut cursor = 0;
    loop {
        let page = store.registry().list_after(cursor, 2).unwrap();
        if page.is_empty() {
            break;
        }
        cursor = page.last().unwrap().seq;
        seen.extend(page.into_iter().map(|e| e.artifact_id));
    }
    assert_eq!(seen.len(), 5);
}

#[test]
fn test_length_only_grows() {
    let (store, _dir) = store_with_entries(1);
    let mut last = store.registry().len().unwrap();
    for i in 0..4 {
        // repeats must not grow the registry, new ids must
        store
            .write(ArtifactKind::Request, "req-0", b"{\"i\":0}", &WriteMeta::default())
            .unwrap();
        store
            .write(
                ArtifactKind::Error,
                &format!("err-{}", i),
                b"{}",
                &WriteMeta::default(),
            )
            .unwrap();
        let now = store.registry().len().unwrap();
        assert_eq!(now, last + 1);
        last = now;
    }
}
