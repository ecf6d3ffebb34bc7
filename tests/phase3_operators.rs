//! Phase 3 tests: interval-algebra operators, nested-loop joins, and estimates.

use std::collections::HashSet;

use rand::Rng;
use tempfile::TempDir;

use temporal_index::engine::{Operand, TemporalMatch, RELATIONS};
use temporal_index::index::PersistentTemporalIndex;
use temporal_index::types::{
    Extent, IndexConfig, Node, Record, TemporalError, TemporalResult, MAX_TIME, MIN_TIME,
    TIME_NS,
};

// ==================== Helpers ====================

fn open_temp(config: IndexConfig) -> (TempDir, PersistentTemporalIndex) {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let mut index = PersistentTemporalIndex::new(dir.path(), config).unwrap();
    index.open().unwrap();
    index.register();
    (dir, index)
}

fn iv(start: i64, end: i64) -> Extent {
    Extent::from_millis(start, end).unwrap()
}

fn node(name: &str) -> Node {
    Node::uri(format!("urn:test:{}", name))
}

fn rec(name: &str, extent: Extent) -> Record {
    Record::new(node(name), extent)
}

fn random_extent(rng: &mut impl Rng, instants: bool) -> Extent {
    let a = rng.gen_range(0..100);
    if instants && rng.gen_bool(0.3) {
        Extent::instant(a)
    } else {
        iv(a, a + rng.gen_range(1..30))
    }
}

fn populate(index: &mut PersistentTemporalIndex, n: usize, instants: bool) -> Vec<Record> {
    let mut rng = rand::thread_rng();
    (0..n)
        .map(|i| {
            let r = rec(&format!("n{}", i), random_extent(&mut rng, instants));
            index.add(&r).unwrap();
            r
        })
        .collect()
}

fn pairs(matches: impl Iterator<Item = TemporalResult<TemporalMatch>>) -> HashSet<(Node, Node)> {
    matches
        .map(|m| {
            let m = m.unwrap();
            (m.first.node, m.second.node)
        })
        .collect()
}

fn nodes(records: impl Iterator<Item = TemporalResult<Record>>) -> HashSet<Node> {
    records.map(|r| r.unwrap().node).collect()
}

fn unbound(name: &str) -> Operand {
    Operand::new(Node::var(name))
}

fn bound(r: &Record) -> Operand {
    Operand::bound(r.node.clone(), r.extent)
}

// ==================== Scenarios ====================

#[test]
fn test_overlapping_intervals() {
    let (_dir, mut index) = open_temp(IndexConfig::default());
    let a = rec("A", iv(100, 200));
    let b = rec("B", iv(150, 250));
    index.add(&a).unwrap();
    index.add(&b).unwrap();

    let overlaps = index.operator("intervalOverlaps").unwrap();
    let hits: Vec<_> = overlaps.evaluate(&bound(&a), &bound(&b)).unwrap().collect();
    assert_eq!(hits.len(), 1);

    let before = index.operator("before").unwrap();
    assert_eq!(before.evaluate(&bound(&a), &bound(&b)).unwrap().count(), 0);

    // A is the only interval overlapping B.
    let found = nodes(overlaps.bind_first_var(&b.extent).unwrap());
    assert_eq!(found, HashSet::from([a.node.clone()]));
}

#[test]
fn test_interval_has_end_instant() {
    let (_dir, mut index) = open_temp(IndexConfig::default());
    let c = rec("C", iv(100, 200));
    let d = rec("D", Extent::instant(200));
    index.add(&c).unwrap();
    index.add(&d).unwrap();

    let has_end = index.operator("hasEnd").unwrap();
    assert!(has_end.test(&c.extent, &d.extent));
    assert_eq!(has_end.evaluate(&bound(&c), &bound(&d)).unwrap().count(), 1);

    let ends = nodes(has_end.bind_second_var(&c.extent).unwrap());
    assert_eq!(ends, HashSet::from([d.node.clone()]));

    let owners = nodes(has_end.bind_first_var(&d.extent).unwrap());
    assert!(owners.contains(&c.node));
}

#[test]
fn test_unbound_overlaps_equals_self_join() {
    let (_dir, mut index) = open_temp(IndexConfig::default());
    let records = populate(&mut index, 80, false);

    let op = index.operator("intervalOverlaps").unwrap();
    let got = pairs(op.evaluate(&unbound("x"), &unbound("y")).unwrap());

    let mut expected = HashSet::new();
    for x in &records {
        for y in &records {
            if op.test(&x.extent, &y.extent) {
                expected.insert((x.node.clone(), y.node.clone()));
            }
        }
    }
    assert_eq!(got, expected);
}

#[test]
fn test_clear_then_operators_see_nothing() {
    let (_dir, mut index) = open_temp(IndexConfig::default());
    populate(&mut index, 20, true);
    index.clear().unwrap();

    let op = index.operator("before").unwrap();
    assert_eq!(op.evaluate(&unbound("x"), &unbound("y")).unwrap().count(), 0);
    assert_eq!(op.estimate(None, None).unwrap(), 0);
}

// ==================== Relation Properties ====================

#[test]
fn test_inverse_symmetry() {
    let mut rng = rand::thread_rng();
    for _ in 0..2000 {
        let x = random_extent(&mut rng, true);
        let y = random_extent(&mut rng, true);
        for r in RELATIONS {
            let inv = r.inverse().unwrap();
            assert_eq!(r.test(&x, &y), inv.test(&y, &x), "{} {:?} {:?}", r.name, x, y);
            assert_eq!(r.first_var_box(&y), inv.second_var_box(&y), "{}", r.name);
            assert_eq!(r.second_var_box(&x), inv.first_var_box(&x), "{}", r.name);
        }
    }
}

#[test]
fn test_one_bound_evaluation_matches_brute_force() {
    let (_dir, mut index) = open_temp(IndexConfig::default());
    let records = populate(&mut index, 120, true);
    let mut rng = rand::thread_rng();
    let probes: Vec<Extent> = (0..15).map(|_| random_extent(&mut rng, true)).collect();

    for r in RELATIONS {
        let op = index.operator(r.name).unwrap();
        for probe in &probes {
            let firsts: HashSet<Node> = records
                .iter()
                .filter(|x| op.test(&x.extent, probe))
                .map(|x| x.node.clone())
                .collect();
            let got = nodes(op.bind_first_var(probe).unwrap());
            assert_eq!(got, firsts, "{} first var, bound {:?}", r.name, probe);
            assert!(op.estimate_first_var(probe).unwrap() >= firsts.len() as u64);

            let seconds: HashSet<Node> = records
                .iter()
                .filter(|y| op.test(probe, &y.extent))
                .map(|y| y.node.clone())
                .collect();
            let got = nodes(op.bind_second_var(probe).unwrap());
            assert_eq!(got, seconds, "{} second var, bound {:?}", r.name, probe);
            assert!(op.estimate_second_var(probe).unwrap() >= seconds.len() as u64);
        }
    }
}

#[test]
fn test_forced_scan_gives_same_answers() {
    let config = IndexConfig {
        always_use_first: true,
        ..IndexConfig::default()
    };
    let (_dir, mut index) = open_temp(config);
    let records = populate(&mut index, 60, true);
    let probe = iv(40, 60);

    for name in ["intervalDuring", "before", "beginningOf", "endOf", "intervalMeets"] {
        let op = index.operator(name).unwrap();
        let expected: HashSet<Node> = records
            .iter()
            .filter(|x| op.test(&x.extent, &probe))
            .map(|x| x.node.clone())
            .collect();
        assert_eq!(nodes(op.bind_first_var(&probe).unwrap()), expected, "{}", name);
        assert_eq!(op.estimate_first_var(&probe).unwrap(), 60);
    }
    let during = index.operator("intervalDuring").unwrap();
    assert_eq!(during.estimate_second_var(&probe).unwrap(), 60);
    assert_eq!(during.estimate(None, None).unwrap(), 3600);

    let op = index.operator("intervalContains").unwrap();
    let got = pairs(op.evaluate(&unbound("x"), &unbound("y")).unwrap());
    let mut expected = HashSet::new();
    for x in &records {
        for y in &records {
            if op.test(&x.extent, &y.extent) {
                expected.insert((x.node.clone(), y.node.clone()));
            }
        }
    }
    assert_eq!(got, expected);
}

#[test]
fn test_open_ended_extents_evaluate_exactly() {
    let (_dir, mut index) = open_temp(IndexConfig::default());
    let mut rng = rand::thread_rng();
    let mut records = populate(&mut index, 60, true);
    for i in 0..30 {
        let a = rng.gen_range(0..100);
        let extent = match i % 3 {
            0 => iv(MIN_TIME, a),
            1 => iv(a, MAX_TIME),
            _ => iv(MIN_TIME, MAX_TIME),
        };
        let r = rec(&format!("open{}", i), extent);
        index.add(&r).unwrap();
        records.push(r);
    }

    let mut probes: Vec<Extent> = (0..8).map(|_| random_extent(&mut rng, true)).collect();
    probes.extend([iv(MIN_TIME, 40), iv(60, MAX_TIME), iv(MIN_TIME, MAX_TIME)]);

    for r in RELATIONS {
        let op = index.operator(r.name).unwrap();
        for probe in &probes {
            let firsts: HashSet<Node> = records
                .iter()
                .filter(|x| op.test(&x.extent, probe))
                .map(|x| x.node.clone())
                .collect();
            assert_eq!(
                nodes(op.bind_first_var(probe).unwrap()),
                firsts,
                "{} first var, bound {:?}",
                r.name,
                probe
            );

            let seconds: HashSet<Node> = records
                .iter()
                .filter(|y| op.test(probe, &y.extent))
                .map(|y| y.node.clone())
                .collect();
            assert_eq!(
                nodes(op.bind_second_var(probe).unwrap()),
                seconds,
                "{} second var, bound {:?}",
                r.name,
                probe
            );
        }
    }
}

// ==================== Soft Failures and Policy ====================

#[test]
fn test_type_mismatch_yields_empty() {
    let (_dir, mut index) = open_temp(IndexConfig::default());
    populate(&mut index, 30, true);
    let op = index.operator("intervalOverlaps").unwrap();
    let instant = Extent::instant(50);
    assert_eq!(op.bind_first_var(&instant).unwrap().count(), 0);
    assert_eq!(op.bind_second_var(&instant).unwrap().count(), 0);
    assert_eq!(op.estimate_first_var(&instant).unwrap(), 0);

    let a = rec("a", instant);
    let b = rec("b", iv(0, 100));
    assert_eq!(op.evaluate(&bound(&a), &bound(&b)).unwrap().count(), 0);
}

#[test]
fn test_unbound_evaluation_can_be_disallowed() {
    let config = IndexConfig {
        allow_unbound: false,
        ..IndexConfig::default()
    };
    let (_dir, mut index) = open_temp(config);
    populate(&mut index, 5, false);
    let op = index.operator("intervalBefore").unwrap();
    assert!(matches!(
        op.evaluate(&unbound("x"), &unbound("y")),
        Err(TemporalError::UnboundEvaluation(_))
    ));
}

#[test]
fn test_estimates_by_binding_state() {
    let (_dir, mut index) = open_temp(IndexConfig::default());
    populate(&mut index, 25, false);
    let op = index.operator("intervalDuring").unwrap();
    let x = iv(10, 20);
    let y = iv(0, 90);
    assert_eq!(op.estimate(Some(&x), Some(&y)).unwrap(), 1);
    assert_eq!(op.estimate(None, None).unwrap(), 625);
    assert_eq!(
        op.estimate(None, Some(&y)).unwrap(),
        op.estimate_first_var(&y).unwrap()
    );
    assert_eq!(
        op.estimate(Some(&x), None).unwrap(),
        op.estimate_second_var(&x).unwrap()
    );
}

// ==================== Registry ====================

#[test]
fn test_registry_lifecycle() {
    let (_dir, mut index) = open_temp(IndexConfig::default());
    assert!(index.operator(&format!("{}intervalMeets", TIME_NS)).is_ok());

    index.unregister();
    assert!(matches!(
        index.operator("intervalMeets"),
        Err(TemporalError::UnknownRelation(_))
    ));

    index.register();
    assert!(index.operator("intervalMeets").is_ok());
    assert!(matches!(
        index.operator("sometimes"),
        Err(TemporalError::UnknownRelation(_))
    ));
}
