//! Lexical forms of temporal literals.
//!
//! Two datatypes are understood:
//!
//! - `xsd:dateTime`: RFC 3339 timestamps; a missing zone is read as UTC.
//! - `pt:intervalLiteral`: `"start, end"` with exactly one comma. Either side
//!   may be empty (unbounded). The end may instead be a signed duration:
//!   `+P1D` extends forward from the start, `-P1D` extends backward (the
//!   given instant becomes the end), `+-P1D` extends both ways.

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta, Utc};

use crate::types::{
    Extent, Literal, TemporalError, TemporalResult, MAX_TIME, MIN_TIME, PT_NS, XSD_NS,
};

/// Datatype IRI of `xsd:dateTime`.
pub fn xsd_date_time() -> String {
    format!("{}dateTime", XSD_NS)
}

/// Datatype IRI of `pt:intervalLiteral`.
pub fn pt_interval_literal() -> String {
    format!("{}intervalLiteral", PT_NS)
}

/// Parse an `xsd:dateTime` lexical form into epoch milliseconds.
pub fn parse_date_time(lexical: &str) -> TemporalResult<i64> {
    let s = lexical.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.timestamp_millis());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc().timestamp_millis());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc().timestamp_millis());
        }
    }
    Err(TemporalError::InvalidLiteral(format!(
        "invalid dateTime {:?}",
        lexical
    )))
}

/// Render epoch milliseconds as an `xsd:dateTime` lexical form.
pub fn format_date_time(millis: i64) -> TemporalResult<String> {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .ok_or_else(|| TemporalError::InvalidArgument(format!("{} out of range", millis)))
}

/// A parsed `xsd:duration`: calendar months plus an exact millisecond part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XsdDuration {
    pub negative: bool,
    pub months: u32,
    pub millis: i64,
}

impl XsdDuration {
    pub fn is_zero(&self) -> bool {
        self.months == 0 && self.millis == 0
    }

    /// Shift `millis` by this duration, forward or backward.
    fn shift(&self, millis: i64, backward: bool) -> TemporalResult<i64> {
        let out_of_range =
            || TemporalError::InvalidLiteral("duration moves endpoint out of range".to_string());
        let dt = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(out_of_range)?;
        let months = Months::new(self.months);
        let delta = TimeDelta::try_milliseconds(self.millis).ok_or_else(out_of_range)?;
        let shifted = if backward {
            dt.checked_sub_months(months)
                .and_then(|d| d.checked_sub_signed(delta))
        } else {
            dt.checked_add_months(months)
                .and_then(|d| d.checked_add_signed(delta))
        };
        shifted.map(|d| d.timestamp_millis()).ok_or_else(out_of_range)
    }
}

/// Parse an `xsd:duration` lexical form such as `P1Y2M3DT4H5M6.5S` or `-PT1H`.
///
/// Only the seconds component may carry a fraction; digits past the
/// millisecond are dropped. Components that overflow are rejected.
pub fn parse_duration(lexical: &str) -> TemporalResult<XsdDuration> {
    let invalid = || TemporalError::InvalidLiteral(format!("invalid duration {:?}", lexical));
    let s = lexical.trim();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let s = s.strip_prefix('P').ok_or_else(invalid)?;
    if s.is_empty() {
        return Err(invalid());
    }

    let mut months: u32 = 0;
    let mut millis: i64 = 0;
    let mut in_time = false;
    let mut number = String::new();
    let mut saw_component = false;

    for c in s.chars() {
        match c {
            'T' if !in_time && number.is_empty() => in_time = true,
            '0'..='9' | '.' => number.push(c),
            unit => {
                if number.is_empty() {
                    return Err(invalid());
                }
                saw_component = true;
                let next = match (in_time, unit) {
                    (false, 'Y') => add_months(months, &number, 12).map(|m| (m, millis)),
                    (false, 'M') => add_months(months, &number, 1).map(|m| (m, millis)),
                    (false, 'D') => add_millis(millis, &number, 86_400_000).map(|ms| (months, ms)),
                    (true, 'H') => add_millis(millis, &number, 3_600_000).map(|ms| (months, ms)),
                    (true, 'M') => add_millis(millis, &number, 60_000).map(|ms| (months, ms)),
                    (true, 'S') => seconds_to_millis(&number)
                        .and_then(|ms| millis.checked_add(ms))
                        .map(|ms| (months, ms)),
                    _ => None,
                };
                (months, millis) = next.ok_or_else(invalid)?;
                number.clear();
            }
        }
    }
    if !number.is_empty() || !saw_component {
        return Err(invalid());
    }

    Ok(XsdDuration {
        negative,
        months,
        millis,
    })
}

/// `total + digits * factor` months. Fractions are not allowed.
fn add_months(total: u32, digits: &str, factor: u32) -> Option<u32> {
    digits
        .parse::<u32>()
        .ok()?
        .checked_mul(factor)?
        .checked_add(total)
}

/// `total + digits * factor` milliseconds. Fractions are not allowed.
fn add_millis(total: i64, digits: &str, factor: i64) -> Option<i64> {
    digits
        .parse::<i64>()
        .ok()?
        .checked_mul(factor)?
        .checked_add(total)
}

/// Seconds with an optional fraction, truncated to whole milliseconds.
fn seconds_to_millis(number: &str) -> Option<i64> {
    let (whole, fraction) = match number.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (number, None),
    };
    let mut millis = whole.parse::<i64>().ok()?.checked_mul(1_000)?;
    if let Some(f) = fraction {
        if f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let ms: String = f.chars().chain("000".chars()).take(3).collect();
        millis = millis.checked_add(ms.parse::<i64>().ok()?)?;
    }
    Some(millis)
}

/// Parse a `pt:intervalLiteral` lexical form.
pub fn parse_interval(lexical: &str) -> TemporalResult<Extent> {
    let items: Vec<&str> = lexical.split(',').map(str::trim).collect();
    if items.len() != 2 {
        return Err(TemporalError::InvalidLiteral(format!(
            "invalid interval syntax {:?}: must have exactly 1 comma",
            lexical
        )));
    }
    let (left, right) = (items[0], items[1]);

    if left.is_empty() {
        let end = if right.is_empty() {
            MAX_TIME
        } else {
            parse_date_time(right)?
        };
        return Extent::from_millis(MIN_TIME, end);
    }

    let start = parse_date_time(left)?;
    if right.is_empty() {
        return Extent::from_millis(start, MAX_TIME);
    }

    let (plus_minus, rest) = if let Some(rest) = right.strip_prefix("+-") {
        (true, rest.trim())
    } else if let Some(rest) = right.strip_prefix('+') {
        (false, rest.trim())
    } else if right.starts_with('-') {
        (false, right)
    } else {
        let end = parse_date_time(right)?;
        return Extent::from_millis(start, end).map_err(|_| {
            TemporalError::InvalidLiteral(format!("interval {:?} ends before it starts", lexical))
        });
    };

    let d = parse_duration(rest)?;
    if d.is_zero() {
        return Err(TemporalError::InvalidLiteral(format!(
            "duration {:?} must be of length greater than 0",
            rest
        )));
    }

    let (first, second) = match (d.negative, plus_minus) {
        (false, false) => (start, d.shift(start, false)?),
        (true, false) => (d.shift(start, true)?, start),
        (_, true) => (d.shift(start, true)?, d.shift(start, false)?),
    };
    Extent::from_millis(first, second)
}

/// Render an extent in the `pt:intervalLiteral` lexical form.
pub fn format_interval(extent: &Extent) -> TemporalResult<String> {
    let side = |millis: i64| -> TemporalResult<String> {
        match millis {
            MIN_TIME | MAX_TIME => Ok(String::new()),
            m => format_date_time(m),
        }
    };
    Ok(format!(
        "{}, {}",
        side(extent.start_millis())?,
        side(extent.end_millis())?
    ))
}

/// Read a literal as an extent if its datatype is a temporal one.
pub fn extent_from_literal(literal: &Literal) -> TemporalResult<Option<Extent>> {
    match literal.datatype.as_deref() {
        Some(dt) if dt == xsd_date_time() => {
            Ok(Some(Extent::instant(parse_date_time(&literal.lexical)?)))
        }
        Some(dt) if dt == pt_interval_literal() => Ok(Some(parse_interval(&literal.lexical)?)),
        _ => Ok(None),
    }
}

/// Build the literal that represents `extent`: a dateTime for instants, an
/// interval literal otherwise.
pub fn literal_for(extent: &Extent) -> TemporalResult<Literal> {
    match extent {
        Extent::Instant(i) => Ok(Literal::typed(
            format_date_time(i.millis())?,
            &xsd_date_time(),
        )),
        Extent::Interval(_) => Ok(Literal::typed(
            format_interval(extent)?,
            &pt_interval_literal(),
        )),
    }
}
