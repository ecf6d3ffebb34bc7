//! Interval-algebra relations as data.
//!
//! Each relation is one row: the extent types it accepts on either side, its
//! truth test, and two box builders. `first_box(y)` bounds the records that can
//! stand as `x` when `y` is known; `second_box(x)` bounds the candidates for
//! `y` when `x` is known. Inverse rows reuse the boxes of their base relation
//! with the roles swapped.

use crate::index::range::Range;
use crate::types::{Extent, ExtentType, MAX_TIME as MAX, MIN_TIME as MIN, TIME_NS};

/// A binary temporal relation `R(x, y)`.
#[derive(Debug)]
pub struct Relation {
    /// Local name in the OWL-Time namespace.
    pub name: &'static str,
    /// Extent type accepted for `x`.
    pub domain: ExtentType,
    /// Extent type accepted for `y`.
    pub range: ExtentType,
    /// Local name of the relation with swapped arguments.
    pub inverse: &'static str,
    test: fn(&Extent, &Extent) -> bool,
    first_box: fn(&Extent) -> Range,
    second_box: fn(&Extent) -> Range,
}

impl Relation {
    /// Whether `R(x, y)` holds.
    pub fn test(&self, x: &Extent, y: &Extent) -> bool {
        (self.test)(x, y)
    }

    /// Box holding every `x` with `R(x, bound)`.
    pub fn first_var_box(&self, bound: &Extent) -> Range {
        (self.first_box)(bound)
    }

    /// Box holding every `y` with `R(bound, y)`.
    pub fn second_var_box(&self, bound: &Extent) -> Range {
        (self.second_box)(bound)
    }

    /// Full IRI.
    pub fn iri(&self) -> String {
        format!("{}{}", TIME_NS, self.name)
    }

    /// The relation with arguments swapped.
    pub fn inverse(&self) -> Option<&'static Relation> {
        lookup(self.inverse)
    }
}

/// Find a relation by local name or full IRI.
pub fn lookup(name: &str) -> Option<&'static Relation> {
    let local = name.strip_prefix(TIME_NS).unwrap_or(name);
    RELATIONS.iter().find(|r| r.name == local)
}

fn s(e: &Extent) -> i64 {
    e.start_millis()
}

fn e(x: &Extent) -> i64 {
    x.end_millis()
}

// ==================== Tests ====================

fn before(x: &Extent, y: &Extent) -> bool {
    e(x) < s(y)
}

fn meets(x: &Extent, y: &Extent) -> bool {
    e(x) == s(y)
}

fn overlaps(x: &Extent, y: &Extent) -> bool {
    s(x) < s(y) && s(y) < e(x) && e(x) < e(y)
}

fn starts(x: &Extent, y: &Extent) -> bool {
    s(x) == s(y) && e(x) < e(y)
}

fn during(x: &Extent, y: &Extent) -> bool {
    s(x) > s(y) && e(x) < e(y)
}

fn finishes(x: &Extent, y: &Extent) -> bool {
    s(x) > s(y) && e(x) == e(y)
}

fn equals(x: &Extent, y: &Extent) -> bool {
    s(x) == s(y) && e(x) == e(y)
}

fn has_beginning(x: &Extent, y: &Extent) -> bool {
    s(x) == s(y)
}

fn has_end(x: &Extent, y: &Extent) -> bool {
    e(x) == e(y)
}

fn inside(x: &Extent, y: &Extent) -> bool {
    s(x) < s(y) && s(y) < e(x)
}

fn starts_before(x: &Extent, y: &Extent) -> bool {
    s(x) < s(y)
}

fn finishes_after(x: &Extent, y: &Extent) -> bool {
    e(x) > e(y)
}

// ==================== Boxes ====================
//
// `b` is the bound extent; the box ranges over the unbound side.

fn before_first(b: &Extent) -> Range {
    Range::new(MIN, s(b), MIN, s(b))
}

fn before_second(b: &Extent) -> Range {
    Range::new(e(b), MAX, e(b), MAX)
}

fn meets_first(b: &Extent) -> Range {
    Range::new(MIN, MAX, s(b), s(b))
}

fn meets_second(b: &Extent) -> Range {
    Range::new(e(b), e(b), MIN, MAX)
}

fn overlaps_first(b: &Extent) -> Range {
    Range::new(MIN, s(b), s(b), e(b))
}

fn overlaps_second(b: &Extent) -> Range {
    Range::new(s(b), e(b), e(b), MAX)
}

fn starts_first(b: &Extent) -> Range {
    Range::new(s(b), s(b), MIN, e(b))
}

fn starts_second(b: &Extent) -> Range {
    Range::new(s(b), s(b), e(b), MAX)
}

fn during_first(b: &Extent) -> Range {
    Range::new(s(b), MAX, MIN, e(b))
}

fn during_second(b: &Extent) -> Range {
    Range::new(MIN, s(b), e(b), MAX)
}

fn finishes_first(b: &Extent) -> Range {
    Range::new(s(b), MAX, e(b), e(b))
}

fn finishes_second(b: &Extent) -> Range {
    Range::new(MIN, s(b), e(b), e(b))
}

fn exact(b: &Extent) -> Range {
    Range::exact(b)
}

fn has_beginning_first(b: &Extent) -> Range {
    Range::new(s(b), s(b), MIN, MAX)
}

fn has_end_first(b: &Extent) -> Range {
    Range::new(MIN, MAX, e(b), e(b))
}

fn inside_first(b: &Extent) -> Range {
    Range::new(MIN, s(b), s(b), MAX)
}

fn inside_second(b: &Extent) -> Range {
    Range::new(s(b), e(b), s(b), e(b))
}

fn starts_before_first(b: &Extent) -> Range {
    Range::new(MIN, s(b), MIN, MAX)
}

fn starts_before_second(b: &Extent) -> Range {
    Range::new(s(b), MAX, MIN, MAX)
}

fn finishes_after_first(b: &Extent) -> Range {
    Range::new(MIN, MAX, e(b), MAX)
}

fn finishes_after_second(b: &Extent) -> Range {
    Range::new(MIN, MAX, MIN, e(b))
}

use ExtentType::{Any, Instant, Interval};

macro_rules! relation {
    ($name:literal, $inverse:literal, $domain:expr, $range:expr, $test:expr, $first:expr, $second:expr) => {
        Relation {
            name: $name,
            domain: $domain,
            range: $range,
            inverse: $inverse,
            test: $test,
            first_box: $first,
            second_box: $second,
        }
    };
}

/// Every supported relation.
pub static RELATIONS: &[Relation] = &[
    // Allen relations over proper intervals.
    relation!("intervalBefore", "intervalAfter", Interval, Interval,
        before, before_first, before_second),
    relation!("intervalAfter", "intervalBefore", Interval, Interval,
        |x, y| before(y, x), before_second, before_first),
    relation!("intervalMeets", "intervalMetBy", Interval, Interval,
        meets, meets_first, meets_second),
    relation!("intervalMetBy", "intervalMeets", Interval, Interval,
        |x, y| meets(y, x), meets_second, meets_first),
    relation!("intervalOverlaps", "intervalOverlappedBy", Interval, Interval,
        overlaps, overlaps_first, overlaps_second),
    relation!("intervalOverlappedBy", "intervalOverlaps", Interval, Interval,
        |x, y| overlaps(y, x), overlaps_second, overlaps_first),
    relation!("intervalStarts", "intervalStartedBy", Interval, Interval,
        starts, starts_first, starts_second),
    relation!("intervalStartedBy", "intervalStarts", Interval, Interval,
        |x, y| starts(y, x), starts_second, starts_first),
    relation!("intervalDuring", "intervalContains", Interval, Interval,
        during, during_first, during_second),
    relation!("intervalContains", "intervalDuring", Interval, Interval,
        |x, y| during(y, x), during_second, during_first),
    relation!("intervalFinishes", "intervalFinishedBy", Interval, Interval,
        finishes, finishes_first, finishes_second),
    relation!("intervalFinishedBy", "intervalFinishes", Interval, Interval,
        |x, y| finishes(y, x), finishes_second, finishes_first),
    relation!("intervalEquals", "intervalEquals", Interval, Interval,
        equals, exact, exact),
    // Relations over any extent.
    relation!("before", "after", Any, Any,
        before, before_first, before_second),
    relation!("after", "before", Any, Any,
        |x, y| before(y, x), before_second, before_first),
    relation!("equals", "equals", Any, Any,
        equals, exact, exact),
    // Point relations.
    relation!("instantEquals", "instantEquals", Instant, Instant,
        equals, exact, exact),
    relation!("hasBeginning", "beginningOf", Any, Instant,
        has_beginning, has_beginning_first, exact_start),
    relation!("beginningOf", "hasBeginning", Instant, Any,
        |x, y| has_beginning(y, x), exact_start, has_beginning_first),
    relation!("hasEnd", "endOf", Any, Instant,
        has_end, has_end_first, exact_end),
    relation!("endOf", "hasEnd", Instant, Any,
        |x, y| has_end(y, x), exact_end, has_end_first),
    relation!("inside", "insideOf", Interval, Instant,
        inside, inside_first, inside_second),
    // Named apart from intervalContains, which relates two intervals.
    relation!("insideOf", "inside", Instant, Interval,
        |x, y| inside(y, x), inside_second, inside_first),
    // Endpoint orderings.
    relation!("intervalStartsBefore", "intervalStartsAfter", Interval, Interval,
        starts_before, starts_before_first, starts_before_second),
    relation!("intervalStartsAfter", "intervalStartsBefore", Interval, Interval,
        |x, y| starts_before(y, x), starts_before_second, starts_before_first),
    relation!("intervalFinishesAfter", "intervalFinishesBefore", Interval, Interval,
        finishes_after, finishes_after_first, finishes_after_second),
    relation!("intervalFinishesBefore", "intervalFinishesAfter", Interval, Interval,
        |x, y| finishes_after(y, x), finishes_after_second, finishes_after_first),
];

fn exact_start(b: &Extent) -> Range {
    Range::new(s(b), s(b), s(b), s(b))
}

fn exact_end(b: &Extent) -> Range {
    Range::new(e(b), e(b), e(b), e(b))
}
