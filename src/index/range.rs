//! Box-shaped range queries over the secondary orderings.

use std::collections::VecDeque;
use std::fmt;
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use redb::{Database, ReadOnlyTable, ReadTransaction};
use serde::Serialize;

use crate::format::codec::{decode, millis_from_sortable, node_key_of, sortable_millis};
use crate::types::{Extent, ExtentType, Node, Record, TemporalError, TemporalResult};
use crate::types::{MAX_TIME, MIN_TIME};

use super::bounds::Bounds;
use super::tables::Secondary;

/// Entries pulled from the store per cursor batch.
const BATCH_SIZE: usize = 1000;

/// Whether `v` lies in the range described by `lo` and `hi`.
///
/// A degenerate range (`lo == hi`) requires equality. Otherwise the range is
/// open on both ends, except that a sentinel bound admits everything on its side.
pub fn in_range(v: i64, lo: i64, hi: i64) -> bool {
    if lo == hi {
        return v == lo;
    }
    (v > lo || lo == MIN_TIME) && (v < hi || hi == MAX_TIME)
}

/// A rectangle in the (start, end) plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range {
    pub start_lo: i64,
    pub start_hi: i64,
    pub end_lo: i64,
    pub end_hi: i64,
}

impl Range {
    /// The whole plane.
    pub const UNBOUNDED: Range = Range::new(MIN_TIME, MAX_TIME, MIN_TIME, MAX_TIME);

    pub const fn new(start_lo: i64, start_hi: i64, end_lo: i64, end_hi: i64) -> Self {
        Self {
            start_lo,
            start_hi,
            end_lo,
            end_hi,
        }
    }

    /// The degenerate box matching exactly `extent`.
    pub fn exact(extent: &Extent) -> Self {
        let (s, e) = (extent.start_millis(), extent.end_millis());
        Self::new(s, s, e, e)
    }

    /// Whether `extent` falls inside the box.
    pub fn contains(&self, extent: &Extent) -> bool {
        in_range(extent.start_millis(), self.start_lo, self.start_hi)
            && in_range(extent.end_millis(), self.end_lo, self.end_hi)
    }

    /// Lower and upper bound of the dimension driven by `index`.
    pub fn dimension(&self, index: Secondary) -> (i64, i64) {
        match index {
            Secondary::Starts => (self.start_lo, self.start_hi),
            Secondary::Ends => (self.end_lo, self.end_hi),
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "start [{}, {}] end [{}, {}]",
            self.start_lo, self.start_hi, self.end_lo, self.end_hi
        )
    }
}

/// Pick the secondary ordering with the narrower clamped range.
pub fn choose_index(range: &Range, bounds: &Bounds, always_use_first: bool) -> Secondary {
    if always_use_first {
        return Secondary::Starts;
    }
    let starts = bounds.estimate_starts_for_range(range.start_lo, range.start_hi);
    let ends = bounds.estimate_ends_for_range(range.end_lo, range.end_hi);
    if ends < starts {
        Secondary::Ends
    } else {
        Secondary::Starts
    }
}

/// Lazy, single-pass scan of the records inside a [`Range`].
///
/// Holds one read transaction while entries remain. It is released when the
/// scan runs past the range, on error, on [`close`](Self::close), or on drop.
pub struct RangeQueryIterator {
    table: Option<ReadOnlyTable<&'static [u8], &'static [u8]>>,
    tx: Option<ReadTransaction>,
    range: Range,
    index: Secondary,
    filter: ExtentType,
    buffer: VecDeque<(Vec<u8>, Vec<u8>)>,
    last_key: Option<Vec<u8>>,
    exhausted: bool,
    closed: bool,
    reported_closed: bool,
    cancel: Option<Arc<AtomicBool>>,
}

impl RangeQueryIterator {
    /// Open a scan of `range`, driven by whichever index `choose_index` selects.
    pub fn open(
        db: &Database,
        range: Range,
        bounds: &Bounds,
        always_use_first: bool,
        filter: ExtentType,
    ) -> TemporalResult<Self> {
        let index = choose_index(&range, bounds, always_use_first);
        Self::open_on(db, range, index, filter)
    }

    /// Open a scan of `range` driven by a specific index.
    pub fn open_on(
        db: &Database,
        range: Range,
        index: Secondary,
        filter: ExtentType,
    ) -> TemporalResult<Self> {
        let tx = db.begin_read()?;
        let table = match tx.open_table(index.table()) {
            Ok(t) => Some(t),
            Err(redb::TableError::TableDoesNotExist(_)) => None,
            Err(e) => return Err(e.into()),
        };
        log::trace!("range scan on {} index: {}", index.name(), range);
        let exhausted = table.is_none();
        Ok(Self {
            table,
            tx: Some(tx),
            range,
            index,
            filter,
            buffer: VecDeque::new(),
            last_key: None,
            exhausted,
            closed: false,
            reported_closed: false,
            cancel: None,
        })
    }

    /// The secondary ordering driving this scan.
    pub fn index(&self) -> Secondary {
        self.index
    }

    pub fn range(&self) -> &Range {
        &self.range
    }

    /// Stop the scan once `flag` is set. Nothing in the engine sets it, so a
    /// scan without a flag runs until exhausted or closed.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Release the cursor. Safe to call more than once.
    pub fn close(&mut self) {
        self.release();
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Next matching record, or `None` once the range is exhausted.
    pub fn try_next(&mut self) -> TemporalResult<Option<Record>> {
        if self.closed {
            return Err(TemporalError::IteratorClosed);
        }
        if self.cancelled() {
            log::debug!("range scan on {} index cancelled", self.index.name());
            self.finish();
            return Ok(None);
        }
        let (_, hi) = self.range.dimension(self.index);
        loop {
            let Some((key, value)) = self.buffer.pop_front() else {
                if self.exhausted {
                    self.release();
                    return Ok(None);
                }
                self.fill()?;
                continue;
            };

            if millis_from_sortable(&key) > hi {
                self.finish();
                return Ok(None);
            }

            let extent = decode(&value);
            if !self.range.contains(&extent) || !self.filter.matches(&extent) {
                continue;
            }
            return Ok(Some(Record::new(Node::from_key(node_key_of(&key)), extent)));
        }
    }

    fn fill(&mut self) -> TemporalResult<()> {
        let Some(table) = &self.table else {
            self.exhausted = true;
            return Ok(());
        };
        let (lo, _) = self.range.dimension(self.index);
        let seek = sortable_millis(lo);
        let lower = match &self.last_key {
            Some(k) => Bound::Excluded(k.as_slice()),
            None => Bound::Included(seek.as_slice()),
        };

        let mut count = 0;
        for entry in table.range::<&[u8]>((lower, Bound::Unbounded))? {
            let (k, v) = entry?;
            self.buffer
                .push_back((k.value().to_vec(), v.value().to_vec()));
            count += 1;
            if count == BATCH_SIZE {
                break;
            }
        }
        self.last_key = self.buffer.back().map(|(k, _)| k.clone());
        self.exhausted = count < BATCH_SIZE;
        Ok(())
    }

    fn finish(&mut self) {
        self.buffer.clear();
        self.exhausted = true;
        self.release();
    }

    fn release(&mut self) {
        self.table = None;
        self.tx = None;
    }
}

impl Iterator for RangeQueryIterator {
    type Item = TemporalResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed {
            if self.reported_closed {
                return None;
            }
            self.reported_closed = true;
            return Some(Err(TemporalError::IteratorClosed));
        }
        match self.try_next() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.finish();
                Some(Err(e))
            }
        }
    }
}
