//! Store engine tests over temporary sled databases.

use std::collections::HashSet;

use shortpool::errors::ShortpoolError;
use shortpool::storage::{MAX_KEY_LEN, UrlStore};
use tempfile::TempDir;

fn temp_store() -> (UrlStore, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let store = UrlStore::open(dir.path()).expect("open store");
    (store, dir)
}

#[test]
fn test_round_trip() {
    let (store, _dir) = temp_store();

    let key = store.store("http://example.com").unwrap();
    assert!((1..=MAX_KEY_LEN).contains(&key.len()));
    assert!(key.bytes().all(|b| b.is_ascii_alphanumeric()));

    assert_eq!(store.query(&key).unwrap(), "http://example.com");
    assert!(matches!(
        store.query("doesnotexist"),
        Err(ShortpoolError::NotFound(_))
    ));
}

#[test]
fn test_concurrent_store_uniqueness() {
    let (store, _dir) = temp_store();

    let mut handles = Vec::new();
    for t in 0..8 {
        let store = store.clone();
        handles.push(std::thread::spawn(move || {
            (0..25)
                .map(|i| {
                    store
                        .store(&format!("http://example.com/{}/{}", t, i))
                        .unwrap()
                })
                .collect::<Vec<_>>()
        }));
    }

    let keys: Vec<String> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    assert_eq!(keys.len(), 200);
    let distinct: HashSet<_> = keys.iter().collect();
    assert_eq!(distinct.len(), 200, "concurrent stores must never collide");
}

#[test]
fn test_concurrent_store_and_reserve_uniqueness() {
    let (store, _dir) = temp_store();

    let mut handles = Vec::new();
    for t in 0..4 {
        let store = store.clone();
        handles.push(std::thread::spawn(move || {
            let mut keys = Vec::new();
            for i in 0..10 {
                keys.push(store.store(&format!("http://example.com/{}/{}", t, i)).unwrap());
                keys.extend(store.reserve(5).unwrap());
            }
            keys
        }));
    }

    let keys: Vec<String> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    let distinct: HashSet<_> = keys.iter().collect();
    assert_eq!(
        distinct.len(),
        keys.len(),
        "stores and reserves share one keyspace and must never collide"
    );
}

#[test]
fn test_reserve_contract() {
    let (store, _dir) = temp_store();

    let keys = store.reserve(5).unwrap();
    assert_eq!(keys.len(), 5);
    let distinct: HashSet<_> = keys.iter().collect();
    assert_eq!(distinct.len(), 5);

    for key in &keys {
        let err = store.query(key).unwrap_err();
        // distinct internally, but still a not-found to the outside world
        assert!(matches!(err, ShortpoolError::ReservedNotYetResolved(_)));
        assert!(err.is_not_found());
    }
}

#[test]
fn test_commit_once() {
    let (store, _dir) = temp_store();

    let keys = store.reserve(1).unwrap();
    store.commit(&keys[0], "http://first.example.com").unwrap();

    assert!(matches!(
        store.commit(&keys[0], "http://second.example.com"),
        Err(ShortpoolError::Conflict(_))
    ));
    assert_eq!(store.query(&keys[0]).unwrap(), "http://first.example.com");
}

#[test]
fn test_reserve_then_commit_scenario() {
    let (store, _dir) = temp_store();

    let keys = store.reserve(5).unwrap();
    store.commit(&keys[4], "http://foo.com").unwrap();

    assert_eq!(store.query(&keys[4]).unwrap(), "http://foo.com");
    for key in &keys[..4] {
        assert!(store.query(key).unwrap_err().is_not_found());
    }
}

#[test]
fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let key = {
        let store = UrlStore::open(dir.path()).unwrap();
        store.store("http://example.com").unwrap()
    };

    let store = UrlStore::open(dir.path()).unwrap();
    assert_eq!(store.query(&key).unwrap(), "http://example.com");
}
