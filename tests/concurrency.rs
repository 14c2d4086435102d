//! Concurrency scenarios: parallel writers and excluders on shared stores
//!
//! The conservation law under test: with N threads adding distinct values
//! while M threads concurrently empty the store, the union of everything the
//! excluders returned plus whatever is left at the end equals exactly the
//! set of added values - no duplicates, no losses.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use rand::Rng;

use litestore::{DurableStore, VolatileStore};

const WRITERS: u64 = 4;
const PER_WRITER: u64 = 200;
const EXCLUDERS: u64 = 3;

/// Distinct payload for writer `w`, item `i`.
fn payload(w: u64, i: u64) -> u64 {
    w * 1_000_000 + i
}

fn expected_payloads() -> HashSet<u64> {
    (0..WRITERS)
        .flat_map(|w| (0..PER_WRITER).map(move |i| payload(w, i)))
        .collect()
}

#[test]
fn volatile_conservation_under_contention() {
    let store = Arc::new(VolatileStore::new());

    let mut writers = Vec::new();
    for w in 0..WRITERS {
        let store = Arc::clone(&store);
        writers.push(thread::spawn(move || {
            let mut rng = rand::thread_rng();
            let mut i = 0;
            while i < PER_WRITER {
                // Vary batch sizes to shake out batching assumptions.
                let batch = rng.gen_range(1..=5).min(PER_WRITER - i);
                store
                    .add((i..i + batch).map(|n| payload(w, n)))
                    .unwrap();
                i += batch;
            }
        }));
    }

    let mut excluders = Vec::new();
    for _ in 0..EXCLUDERS {
        let store = Arc::clone(&store);
        excluders.push(thread::spawn(move || {
            let mut taken = Vec::new();
            for _ in 0..40 {
                taken.extend(store.drain().unwrap());
            }
            taken
        }));
    }

    for handle in writers {
        handle.join().unwrap();
    }
    let mut collected = Vec::new();
    for handle in excluders {
        collected.extend(handle.join().unwrap());
    }
    collected.extend(store.drain().unwrap());

    let unique: HashSet<u64> = collected.iter().copied().collect();
    assert_eq!(unique.len(), collected.len(), "a record was duplicated");
    assert_eq!(unique, expected_payloads(), "a record was lost");
}

#[test]
fn durable_conservation_under_contention() {
    let store: Arc<DurableStore<u64>> = Arc::new(DurableStore::in_memory().unwrap());

    let mut writers = Vec::new();
    for w in 0..WRITERS {
        let store = Arc::clone(&store);
        writers.push(thread::spawn(move || {
            let mut rng = rand::thread_rng();
            let mut i = 0;
            while i < PER_WRITER {
                let batch = rng.gen_range(1..=5).min(PER_WRITER - i);
                store
                    .add((i..i + batch).map(|n| payload(w, n)))
                    .unwrap();
                i += batch;
            }
        }));
    }

    let mut excluders = Vec::new();
    for _ in 0..EXCLUDERS {
        let store = Arc::clone(&store);
        excluders.push(thread::spawn(move || {
            let mut taken = Vec::new();
            for _ in 0..20 {
                taken.extend(store.drain().unwrap());
            }
            taken
        }));
    }

    for handle in writers {
        handle.join().unwrap();
    }
    let mut collected = Vec::new();
    for handle in excluders {
        collected.extend(handle.join().unwrap());
    }
    collected.extend(store.drain().unwrap());

    let unique: HashSet<u64> = collected.iter().copied().collect();
    assert_eq!(unique.len(), collected.len(), "a record was duplicated");
    assert_eq!(unique, expected_payloads(), "a record was lost");
}

#[test]
fn durable_file_backed_concurrent_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contention.db");
    let store: Arc<DurableStore<u64>> = Arc::new(DurableStore::open(&path).unwrap());

    let mut writers = Vec::new();
    for w in 0..WRITERS {
        let store = Arc::clone(&store);
        writers.push(thread::spawn(move || {
            for i in 0..50 {
                store.add([payload(w, i)]).unwrap();
            }
        }));
    }
    for handle in writers {
        handle.join().unwrap();
    }
    drop(store);

    // Every committed write is visible after reopening the file.
    let reopened: DurableStore<u64> = DurableStore::open(&path).unwrap();
    assert_eq!(reopened.len().unwrap(), WRITERS * 50);
}

#[test]
fn readers_observe_consistent_snapshots() {
    let store = Arc::new(VolatileStore::new());
    store.add((0..100u64).map(|i| (i, i * 2))).unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..50 {
                    // Pairs are written atomically, so a snapshot never
                    // observes a half-consistent record.
                    for (k, v) in store.records().unwrap() {
                        assert_eq!(v, k * 2);
                    }
                }
            })
        })
        .collect();

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 100..200u64 {
                store.add([(i, i * 2)]).unwrap();
            }
        })
    };

    for handle in readers {
        handle.join().unwrap();
    }
    writer.join().unwrap();
}
