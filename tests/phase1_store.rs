//! Phase 1 tests: extent codec, persistent store lifecycle, and bookkeeping.

use std::collections::HashMap;

use rand::Rng;
use tempfile::TempDir;

use temporal_index::format::{decode, encode, literal};
use temporal_index::graph::Triple;
use temporal_index::index::{Bounds, PersistentTemporalIndex, INDEX_DIR};
use temporal_index::types::{
    Extent, IndexConfig, IndexType, Node, Record, TemporalError, TemporalResult, PT_NS,
};

// ==================== Helpers ====================

fn open_temp() -> (TempDir, PersistentTemporalIndex) {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let mut index = PersistentTemporalIndex::new(dir.path(), IndexConfig::default()).unwrap();
    index.open().unwrap();
    (dir, index)
}

fn iv(start: i64, end: i64) -> Extent {
    Extent::from_millis(start, end).unwrap()
}

fn rec(name: &str, extent: Extent) -> Record {
    Record::new(Node::uri(format!("urn:test:{}", name)), extent)
}

fn random_extent(rng: &mut impl Rng, lo: i64, hi: i64) -> Extent {
    let a = rng.gen_range(lo..hi);
    if rng.gen_bool(0.3) {
        Extent::instant(a)
    } else {
        let b = rng.gen_range(lo..hi);
        iv(a.min(b), a.max(b))
    }
}

fn scan_all(index: &PersistentTemporalIndex) -> Vec<Record> {
    index
        .iterator()
        .unwrap()
        .collect::<TemporalResult<Vec<_>>>()
        .unwrap()
}

// ==================== Codec ====================

#[test]
fn test_codec_roundtrip_random() {
    let mut rng = rand::thread_rng();
    for _ in 0..1000 {
        let e = random_extent(&mut rng, i64::MIN / 2, i64::MAX / 2);
        let bytes = encode(&e);
        assert_eq!(bytes.len(), 16);
        assert_eq!(decode(&bytes), e);
    }
}

#[test]
fn test_codec_degenerate_interval_decodes_as_instant() {
    let mut bytes = [0u8; 16];
    bytes[..8].copy_from_slice(&7i64.to_be_bytes());
    bytes[8..].copy_from_slice(&7i64.to_be_bytes());
    assert_eq!(decode(&bytes), Extent::instant(7));
}

// ==================== Lifecycle ====================

#[test]
fn test_open_and_close_are_idempotent() {
    let (_dir, mut index) = open_temp();
    index.open().unwrap();
    assert!(!index.is_closed());
    index.close();
    index.close();
    assert!(index.is_closed());
    index.open().unwrap();
    assert!(!index.is_closed());
}

#[test]
fn test_closed_index_rejects_operations() {
    let (_dir, mut index) = open_temp();
    index.add(&rec("a", iv(1, 2))).unwrap();
    index.close();

    assert_eq!(index.size(), 0);
    assert!(matches!(index.iterator(), Err(TemporalError::IndexClosed)));
    assert!(matches!(
        index.add(&rec("b", iv(1, 2))),
        Err(TemporalError::IndexClosed)
    ));
    assert!(matches!(
        index.find(&Node::uri("urn:test:a")),
        Err(TemporalError::IndexClosed)
    ));
    assert!(matches!(index.clear(), Err(TemporalError::IndexClosed)));
}

#[test]
fn test_delete_requires_closed() {
    let (dir, mut index) = open_temp();
    index.add(&rec("a", iv(1, 2))).unwrap();
    assert!(matches!(index.delete(), Err(TemporalError::IndexOpen)));

    index.close();
    assert!(dir.path().join(INDEX_DIR).exists());
    index.delete().unwrap();
    assert!(!dir.path().join(INDEX_DIR).exists());

    index.open().unwrap();
    assert_eq!(index.size(), 0);
    assert!(index.find(&Node::uri("urn:test:a")).unwrap().is_none());
}

#[test]
fn test_reopen_restores_size_and_bounds() {
    let (dir, mut index) = open_temp();
    index.add(&rec("a", iv(-50, 10))).unwrap();
    index.add(&rec("b", iv(5, 500))).unwrap();
    index.add(&rec("c", Extent::instant(42))).unwrap();
    index.close();

    let mut reopened = PersistentTemporalIndex::new(dir.path(), IndexConfig::default()).unwrap();
    reopened.open().unwrap();
    assert_eq!(reopened.size(), 3);
    let b = reopened.bounds();
    assert_eq!((b.min_start, b.max_start), (-50, 42));
    assert_eq!((b.min_end, b.max_end), (10, 500));
    assert_eq!(
        reopened.find(&Node::uri("urn:test:b")).unwrap(),
        Some(rec("b", iv(5, 500)))
    );
}

#[test]
fn test_config_validation() {
    let dir = tempfile::tempdir().unwrap();
    let memory = IndexConfig {
        index_type: IndexType::Memory,
        ..IndexConfig::default()
    };
    assert!(matches!(
        PersistentTemporalIndex::new(dir.path(), memory),
        Err(TemporalError::UnsupportedIndexType(_))
    ));

    let props: HashMap<String, String> = HashMap::new();
    assert!(matches!(
        PersistentTemporalIndex::from_properties(dir.path(), &props),
        Err(TemporalError::InvalidConfig(_))
    ));

    let props: HashMap<String, String> = [("indexType", "persistent"), ("alwaysUseFirst", "true")]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let index = PersistentTemporalIndex::from_properties(dir.path(), &props).unwrap();
    assert!(index.config().always_use_first);
}

// ==================== Records ====================

#[test]
fn test_add_find_remove() {
    let (_dir, mut index) = open_temp();
    let a = rec("a", iv(100, 200));
    assert!(index.add(&a).unwrap());
    assert_eq!(index.size(), 1);
    assert_eq!(index.find(&a.node).unwrap(), Some(a.clone()));

    assert!(index.remove(&a).unwrap());
    assert_eq!(index.size(), 0);
    assert!(index.find(&a.node).unwrap().is_none());
    assert!(!index.remove(&a).unwrap());
    assert_eq!(index.size(), 0);
}

#[test]
fn test_duplicate_add_is_noop() {
    let (_dir, mut index) = open_temp();
    let a = rec("a", iv(1, 2));
    assert!(index.add(&a).unwrap());
    assert!(!index.add(&a).unwrap());
    assert_eq!(index.size(), 1);
    assert_eq!(scan_all(&index).len(), 1);
}

#[test]
fn test_overwrite_replaces_derived_entries() {
    let (_dir, mut index) = open_temp();
    index.add(&rec("a", iv(1, 2))).unwrap();
    assert!(index.add(&rec("a", iv(5, 6))).unwrap());

    assert_eq!(index.size(), 1);
    assert_eq!(scan_all(&index), vec![rec("a", iv(5, 6))]);
    assert_eq!(index.query(&iv(1, 2)).unwrap().count(), 0);
    assert_eq!(index.query(&iv(5, 6)).unwrap().count(), 1);
}

#[test]
fn test_blank_and_uri_nodes_stay_distinct() {
    let (_dir, mut index) = open_temp();
    let blank = Record::new(Node::blank("n1"), iv(1, 2));
    let uri = Record::new(Node::uri("n1"), iv(3, 4));
    index.add(&blank).unwrap();
    index.add(&uri).unwrap();

    assert_eq!(index.find(&Node::blank("n1")).unwrap(), Some(blank.clone()));
    assert_eq!(index.find(&Node::uri("n1")).unwrap(), Some(uri.clone()));
    let all = scan_all(&index);
    assert!(all.contains(&blank));
    assert!(all.contains(&uri));
}

#[test]
fn test_duplicate_endpoints_are_kept() {
    let (_dir, mut index) = open_temp();
    for i in 0..10 {
        index.add(&rec(&format!("n{}", i), iv(100, 200))).unwrap();
    }
    assert_eq!(index.size(), 10);
    assert_eq!(index.query(&iv(100, 200)).unwrap().count(), 10);
}

#[test]
fn test_bounds_only_widen() {
    let (_dir, mut index) = open_temp();
    let mut rng = rand::thread_rng();
    let mut records = Vec::new();
    for i in 0..200 {
        let r = rec(&format!("n{}", i), random_extent(&mut rng, -10_000, 10_000));
        index.add(&r).unwrap();
        records.push(r);
    }
    let b = index.bounds();
    for r in &records {
        assert!(b.contains(&r.extent), "{:?} outside {:?}", r.extent, b);
    }

    for r in &records[..100] {
        index.remove(r).unwrap();
    }
    assert_eq!(index.bounds(), b);
    assert_eq!(index.size(), 100);
}

#[test]
fn test_clear_behaves_like_fresh_store() {
    let (_dir, mut index) = open_temp();
    for i in 0..50 {
        index.add(&rec(&format!("n{}", i), iv(i, i + 10))).unwrap();
    }
    index.clear().unwrap();

    assert_eq!(index.size(), 0);
    assert!(scan_all(&index).is_empty());
    assert_eq!(index.bounds(), Bounds::empty());

    let a = rec("a", iv(1, 2));
    assert!(index.add(&a).unwrap());
    assert_eq!(index.find(&a.node).unwrap(), Some(a.clone()));
    assert_eq!(index.size(), 1);
    assert_eq!(scan_all(&index), vec![a]);
}

#[test]
fn test_triples_drive_add_and_remove() {
    let (_dir, mut index) = open_temp();
    let t = Triple::new(
        Node::uri("urn:test:e"),
        Node::uri(format!("{}asInterval", PT_NS)),
        Node::literal(
            "1970-01-01T00:00:01Z, 1970-01-01T00:00:03Z",
            &literal::pt_interval_literal(),
        ),
    );
    assert!(index.add_triple(&t).unwrap());
    assert_eq!(
        index.find(&Node::uri("urn:test:e")).unwrap(),
        Some(rec("e", iv(1000, 3000)))
    );

    let unrelated = Triple::new(
        Node::uri("urn:test:e"),
        Node::uri("urn:test:label"),
        Node::literal("x", "urn:test:string"),
    );
    assert!(!index.add_triple(&unrelated).unwrap());

    assert!(index.remove_triple(&t).unwrap());
    assert_eq!(index.size(), 0);
}
