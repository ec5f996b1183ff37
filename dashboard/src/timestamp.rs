//! Normalization of the raw run timestamps.
//!
//! Every consumer that places a run in time goes through [RunInterval::of], so the bounds of the
//! timeline and the date filter can never disagree about where a run is.

use chrono::{DateTime, Utc};
use load_timeline_model::TestRun;

pub const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Width of the timeline when there is nothing to show
pub const DEFAULT_WINDOW_MILLIS: i64 = 14 * DAY_MILLIS;

/// Timestamps further than this ahead of now are treated as epoch-shifted
pub const FUTURE_LIMIT_MILLIS: i64 = 365 * DAY_MILLIS;

/// Current wall clock time in epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// The millisecond value of 1970-01-01T00:00:00Z, removed from epoch-shifted timestamps.
///
/// This is zero, which makes the correction a no-op. See DESIGN.md.
pub fn epoch_shift_millis() -> i64 {
    DateTime::<Utc>::UNIX_EPOCH.timestamp_millis()
}

/// Parse the leading integer of `raw` the way the data producers' tooling does.
///
/// Leading whitespace and a single sign are accepted, a `0x` prefix switches to hexadecimal, and
/// parsing stops at the first character that is not a digit. Returns `None` when there are no
/// digits or the value does not fit in an `i64`.
pub fn parse_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, s) = match s.get(..2) {
        Some("0x" | "0X") => (16, &s[2..]),
        _ => (10, s),
    };

    let digits_len = s
        .char_indices()
        .find(|(_, c)| !c.is_digit(radix))
        .map_or(s.len(), |(i, _)| i);
    if digits_len == 0 {
        return None;
    }

    let magnitude = i64::from_str_radix(&s[..digits_len], radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Undo the upstream epoch offset on timestamps that are more than a year ahead of `now`.
pub fn correct_epoch_shift(timestamp: i64, now: i64) -> i64 {
    if timestamp > now.saturating_add(FUTURE_LIMIT_MILLIS) {
        timestamp - epoch_shift_millis()
    } else {
        timestamp
    }
}

/// Normalized start of a run. Unparseable values become `now`.
pub fn normalize_begin(raw: &str, now: i64) -> i64 {
    match parse_int(raw) {
        Some(begin) => correct_epoch_shift(begin, now),
        None => now,
    }
}

/// Normalized end of a run. Unparseable or negative values become `now`.
pub fn normalize_end(raw: &str, now: i64) -> i64 {
    match parse_int(raw) {
        Some(end) if end >= 0 => correct_epoch_shift(end, now),
        _ => now,
    }
}

/// Where a run sits in time, after normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunInterval {
    pub begin: i64,
    pub end: i64,
}

impl RunInterval {
    pub fn of(run: &TestRun, now: i64) -> Self {
        Self {
            begin: normalize_begin(&run.loadtestbegintime, now),
            end: normalize_end(&run.loadtestendtime, now),
        }
    }

    /// The interval with its ends in order
    ///
    /// Normalization can produce an end before the begin, for example a future begin paired with
    /// a missing end.
    pub fn span(&self) -> (i64, i64) {
        (self.begin.min(self.end), self.begin.max(self.end))
    }

    /// Whether the run overlaps `[start, end]`, with `None` unbounded on that side
    pub fn overlaps(&self, start: Option<i64>, end: Option<i64>) -> bool {
        let (first, last) = self.span();
        start.map_or(true, |start| last >= start) && end.map_or(true, |end| first <= end)
    }
}
