//! Cached endpoint bounds of the store.

use serde::Serialize;

use crate::types::{Extent, MAX_TIME, MIN_TIME};

/// Minimum and maximum start and end values seen by the store.
///
/// Bounds only widen: removing records never tightens them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bounds {
    pub min_start: i64,
    pub max_start: i64,
    pub min_end: i64,
    pub max_end: i64,
}

impl Bounds {
    /// Bounds of an empty store: every minimum above every maximum.
    pub const fn empty() -> Self {
        Self {
            min_start: MAX_TIME,
            max_start: MIN_TIME,
            min_end: MAX_TIME,
            max_end: MIN_TIME,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_start > self.max_start
    }

    /// Widen to include `extent`.
    pub fn widen(&mut self, extent: &Extent) {
        let (s, e) = (extent.start_millis(), extent.end_millis());
        self.min_start = self.min_start.min(s);
        self.max_start = self.max_start.max(s);
        self.min_end = self.min_end.min(e);
        self.max_end = self.max_end.max(e);
    }

    /// Whether `extent` lies within the cached bounds.
    pub fn contains(&self, extent: &Extent) -> bool {
        let (s, e) = (extent.start_millis(), extent.end_millis());
        self.min_start <= s && s <= self.max_start && self.min_end <= e && e <= self.max_end
    }

    /// Width of `[lo, hi]` clamped to the start bounds.
    pub fn estimate_starts_for_range(&self, lo: i64, hi: i64) -> i128 {
        clamped_width(lo, hi, self.min_start, self.max_start)
    }

    /// Width of `[lo, hi]` clamped to the end bounds.
    pub fn estimate_ends_for_range(&self, lo: i64, hi: i64) -> i128 {
        clamped_width(lo, hi, self.min_end, self.max_end)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::empty()
    }
}

fn clamped_width(lo: i64, hi: i64, min: i64, max: i64) -> i128 {
    i128::from(hi.min(max)) - i128::from(lo.max(min))
}
