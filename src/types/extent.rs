//! Temporal extents: instants, intervals, and the sum type over both.

use std::fmt;

use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Serialize};

use super::error::{TemporalError, TemporalResult};

/// Sentinel for an unbounded lower endpoint.
pub const MIN_TIME: i64 = i64::MIN;

/// Sentinel for an unbounded upper endpoint.
pub const MAX_TIME: i64 = i64::MAX;

/// A single point in time, in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Instant {
    millis: i64,
}

impl Instant {
    /// Create an instant from epoch milliseconds.
    pub const fn new(millis: i64) -> Self {
        Self { millis }
    }

    /// Epoch milliseconds.
    pub const fn millis(&self) -> i64 {
        self.millis
    }

    /// Whether this instant is one of the unbounded sentinels.
    pub fn is_unbounded(&self) -> bool {
        self.millis == MIN_TIME || self.millis == MAX_TIME
    }
}

impl From<i64> for Instant {
    fn from(millis: i64) -> Self {
        Self::new(millis)
    }
}

/// Which end of an interval an instant sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

/// A closed span of time. The interval owns both of its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    start: Instant,
    end: Instant,
}

impl Interval {
    /// Create an interval. Fails if `start > end`.
    pub fn new(start: Instant, end: Instant) -> TemporalResult<Self> {
        if start > end {
            return Err(TemporalError::InvalidArgument(format!(
                "interval start {} is after end {}",
                start.millis, end.millis
            )));
        }
        Ok(Self { start, end })
    }

    /// Create an interval without checking endpoint order.
    pub(crate) const fn new_unchecked(start: Instant, end: Instant) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn end(&self) -> Instant {
        self.end
    }

    /// The instant at the given endpoint.
    pub fn endpoint(&self, which: Endpoint) -> Instant {
        match which {
            Endpoint::Start => self.start,
            Endpoint::End => self.end,
        }
    }

    /// Whether `instant` is this interval's start.
    pub fn is_start(&self, instant: &Instant) -> bool {
        self.start == *instant
    }

    /// Whether `instant` is this interval's end.
    pub fn is_end(&self, instant: &Instant) -> bool {
        self.end == *instant
    }

    /// Which endpoint `instant` is, if any. The start wins for degenerate intervals.
    pub fn endpoint_of(&self, instant: &Instant) -> Option<Endpoint> {
        if self.is_start(instant) {
            Some(Endpoint::Start)
        } else if self.is_end(instant) {
            Some(Endpoint::End)
        } else {
            None
        }
    }

    /// Length in milliseconds, saturating for unbounded intervals.
    pub fn duration_millis(&self) -> i64 {
        self.end.millis.saturating_sub(self.start.millis)
    }
}

/// Extent variant a relation side accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtentType {
    Instant,
    Interval,
    Any,
}

impl ExtentType {
    /// Whether `extent` is of this type.
    pub fn matches(&self, extent: &Extent) -> bool {
        match self {
            ExtentType::Any => true,
            ExtentType::Instant => matches!(extent, Extent::Instant(_)),
            ExtentType::Interval => matches!(extent, Extent::Interval(_)),
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            ExtentType::Instant => "instant",
            ExtentType::Interval => "interval",
            ExtentType::Any => "any",
        }
    }
}

/// A temporal value: either an instant or an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Extent {
    Instant(Instant),
    Interval(Interval),
}

impl Extent {
    /// Build an extent from raw endpoints. Equal endpoints collapse to an instant.
    pub fn from_millis(start: i64, end: i64) -> TemporalResult<Self> {
        if start == end {
            Ok(Extent::Instant(Instant::new(start)))
        } else {
            Ok(Extent::Interval(Interval::new(
                Instant::new(start),
                Instant::new(end),
            )?))
        }
    }

    pub fn instant(millis: i64) -> Self {
        Extent::Instant(Instant::new(millis))
    }

    pub fn start(&self) -> Instant {
        match self {
            Extent::Instant(i) => *i,
            Extent::Interval(iv) => iv.start,
        }
    }

    pub fn end(&self) -> Instant {
        match self {
            Extent::Instant(i) => *i,
            Extent::Interval(iv) => iv.end,
        }
    }

    /// Start as raw milliseconds.
    pub fn start_millis(&self) -> i64 {
        self.start().millis
    }

    /// End as raw milliseconds.
    pub fn end_millis(&self) -> i64 {
        self.end().millis
    }

    pub fn extent_type(&self) -> ExtentType {
        match self {
            Extent::Instant(_) => ExtentType::Instant,
            Extent::Interval(_) => ExtentType::Interval,
        }
    }

    pub fn is_instant(&self) -> bool {
        matches!(self, Extent::Instant(_))
    }
}

impl From<Instant> for Extent {
    fn from(i: Instant) -> Self {
        Extent::Instant(i)
    }
}

impl From<Interval> for Extent {
    fn from(iv: Interval) -> Self {
        Extent::Interval(iv)
    }
}

fn fmt_millis(f: &mut fmt::Formatter<'_>, millis: i64) -> fmt::Result {
    match millis {
        MIN_TIME | MAX_TIME => Ok(()),
        _ => match DateTime::from_timestamp_millis(millis) {
            Some(dt) => write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => write!(f, "{}", millis),
        },
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_millis(f, self.millis)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_millis(f, self.start.millis)?;
        write!(f, ", ")?;
        fmt_millis(f, self.end.millis)
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extent::Instant(i) => i.fmt(f),
            Extent::Interval(iv) => iv.fmt(f),
        }
    }
}
