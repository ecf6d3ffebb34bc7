//! Evaluation of a relation against the index.

use serde::Serialize;

use crate::index::range::{Range, RangeQueryIterator};
use crate::index::PersistentTemporalIndex;
use crate::types::{Extent, Node, Record, TemporalError, TemporalResult};

use super::operand::Operand;
use super::relation::Relation;

/// A pair `(x, y)` for which the relation holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TemporalMatch {
    pub first: Record,
    pub second: Record,
}

impl TemporalMatch {
    pub fn new(first: Record, second: Record) -> Self {
        Self { first, second }
    }
}

/// Which argument of the relation a scan is producing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

/// A relation bound to the index it evaluates against.
#[derive(Clone, Copy)]
pub struct TemporalOperator<'a> {
    relation: &'static Relation,
    index: &'a PersistentTemporalIndex,
}

impl<'a> TemporalOperator<'a> {
    pub fn new(relation: &'static Relation, index: &'a PersistentTemporalIndex) -> Self {
        Self { relation, index }
    }

    pub fn relation(&self) -> &'static Relation {
        self.relation
    }

    /// Whether the relation holds, honoring its domain and range types.
    pub fn test(&self, x: &Extent, y: &Extent) -> bool {
        self.relation.domain.matches(x) && self.relation.range.matches(y) && self.relation.test(x, y)
    }

    fn forced_scan(&self) -> bool {
        self.index.config().always_use_first
    }

    /// Records `x` with `R(x, bound)`.
    pub fn bind_first_var(&self, bound: &Extent) -> TemporalResult<BoundVarIterator> {
        self.bind(Side::First, bound)
    }

    /// Records `y` with `R(bound, y)`.
    pub fn bind_second_var(&self, bound: &Extent) -> TemporalResult<BoundVarIterator> {
        self.bind(Side::Second, bound)
    }

    fn bind(&self, side: Side, bound: &Extent) -> TemporalResult<BoundVarIterator> {
        let r = self.relation;
        let (bound_type, free_type) = match side {
            Side::First => (r.range, r.domain),
            Side::Second => (r.domain, r.range),
        };
        if !bound_type.matches(bound) {
            log::warn!(
                "{} expects {} but was bound to {}",
                r.name,
                bound_type.name(),
                bound.extent_type().name()
            );
            return Ok(BoundVarIterator::empty(r, side, *bound));
        }
        let range = if self.forced_scan() {
            Range::UNBOUNDED
        } else {
            match side {
                Side::First => r.first_var_box(bound),
                Side::Second => r.second_var_box(bound),
            }
        };
        let scan = self.index.range_query(range, free_type)?;
        Ok(BoundVarIterator {
            scan: Some(scan),
            relation: r,
            side,
            bound: *bound,
        })
    }

    /// Estimated matches for `x` when `y` is bound.
    pub fn estimate_first_var(&self, bound: &Extent) -> TemporalResult<u64> {
        if !self.relation.range.matches(bound) {
            return Ok(0);
        }
        if self.forced_scan() {
            return Ok(self.index.size());
        }
        self.index.estimate(&self.relation.first_var_box(bound))
    }

    /// Estimated matches for `y` when `x` is bound.
    pub fn estimate_second_var(&self, bound: &Extent) -> TemporalResult<u64> {
        if !self.relation.domain.matches(bound) {
            return Ok(0);
        }
        if self.forced_scan() {
            return Ok(self.index.size());
        }
        self.index.estimate(&self.relation.second_var_box(bound))
    }

    /// Cost estimate for the optimizer given which sides are bound.
    pub fn estimate(&self, x: Option<&Extent>, y: Option<&Extent>) -> TemporalResult<u64> {
        match (x, y) {
            (Some(_), Some(_)) => Ok(1),
            (None, Some(y)) => self.estimate_first_var(y),
            (Some(x), None) => self.estimate_second_var(x),
            (None, None) => {
                let n = self.index.size();
                Ok(n.saturating_mul(n))
            }
        }
    }

    /// All pairs satisfying the relation, given what is known about each side.
    pub fn evaluate(&self, x: &Operand, y: &Operand) -> TemporalResult<Matches<'a>> {
        match (x.record(), y.record()) {
            (Some(x), Some(y)) => {
                let hit = self.test(&x.extent, &y.extent);
                Ok(Matches::Single(hit.then(|| TemporalMatch::new(x, y))))
            }
            (None, Some(y)) => Ok(Matches::First {
                candidates: self.bind_first_var(&y.extent)?,
                bound: y,
                free: x.node().clone(),
            }),
            (Some(x), None) => Ok(Matches::Second {
                candidates: self.bind_second_var(&x.extent)?,
                bound: x,
                free: y.node().clone(),
            }),
            (None, None) => {
                if !self.index.config().allow_unbound {
                    return Err(TemporalError::UnboundEvaluation(
                        self.relation.name.to_string(),
                    ));
                }
                Ok(Matches::NestedLoop(self.nested_loop()?))
            }
        }
    }

    /// Join of the whole store with itself under this relation.
    pub fn nested_loop(&self) -> TemporalResult<NestedLoopIterator<'a>> {
        log::debug!("nested-loop evaluation of {}", self.relation.name);
        Ok(NestedLoopIterator {
            operator: *self,
            outer: self
                .index
                .range_query(Range::UNBOUNDED, self.relation.domain)?,
            current: None,
        })
    }
}

/// Candidates for the free side of a relation with the other side fixed.
///
/// Applies the relation's test to every record the box scan yields, so the
/// output is exact even where the box over-approximates.
pub struct BoundVarIterator {
    scan: Option<RangeQueryIterator>,
    relation: &'static Relation,
    side: Side,
    bound: Extent,
}

impl BoundVarIterator {
    fn empty(relation: &'static Relation, side: Side, bound: Extent) -> Self {
        Self {
            scan: None,
            relation,
            side,
            bound,
        }
    }

    /// Release the underlying cursor.
    pub fn close(&mut self) {
        if let Some(scan) = self.scan.as_mut() {
            scan.close();
        }
        self.scan = None;
    }

    fn holds(&self, candidate: &Extent) -> bool {
        match self.side {
            Side::First => self.relation.test(candidate, &self.bound),
            Side::Second => self.relation.test(&self.bound, candidate),
        }
    }
}

impl Iterator for BoundVarIterator {
    type Item = TemporalResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let item = self.scan.as_mut()?.next()?;
            match item {
                Ok(record) if self.holds(&record.extent) => return Some(Ok(record)),
                Ok(_) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Outer scan of the whole store, inner second-var scan per outer record.
pub struct NestedLoopIterator<'a> {
    operator: TemporalOperator<'a>,
    outer: RangeQueryIterator,
    current: Option<(Record, BoundVarIterator)>,
}

impl Iterator for NestedLoopIterator<'_> {
    type Item = TemporalResult<TemporalMatch>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((outer, inner)) = self.current.as_mut() {
                match inner.next() {
                    Some(Ok(record)) => {
                        return Some(Ok(TemporalMatch::new(outer.clone(), record)))
                    }
                    Some(Err(e)) => return Some(Err(e)),
                    None => {}
                }
                self.current = None;
            }
            let record = match self.outer.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e)),
            };
            match self.operator.bind_second_var(&record.extent) {
                Ok(inner) => self.current = Some((record, inner)),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Lazy result of [`TemporalOperator::evaluate`].
pub enum Matches<'a> {
    /// Both sides were bound: at most one pair.
    Single(Option<TemporalMatch>),
    /// `x` free, `y` bound.
    First {
        candidates: BoundVarIterator,
        bound: Record,
        free: Node,
    },
    /// `x` bound, `y` free.
    Second {
        candidates: BoundVarIterator,
        bound: Record,
        free: Node,
    },
    /// Neither side bound.
    NestedLoop(NestedLoopIterator<'a>),
}

impl Iterator for Matches<'_> {
    type Item = TemporalResult<TemporalMatch>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Matches::Single(m) => m.take().map(Ok),
            Matches::First {
                candidates, bound, ..
            } => candidates
                .next()
                .map(|r| r.map(|x| TemporalMatch::new(x, bound.clone()))),
            Matches::Second {
                candidates, bound, ..
            } => candidates
                .next()
                .map(|r| r.map(|y| TemporalMatch::new(bound.clone(), y))),
            Matches::NestedLoop(it) => it.next(),
        }
    }
}
