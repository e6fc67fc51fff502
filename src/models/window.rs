//! Wall-clock time model.
//!
//! All times are whole minutes since midnight on a single service day,
//! `[0, 1440)`. No timezone or multi-day wraparound is modeled.

use serde::{Deserialize, Serialize};

/// Minutes since midnight.
pub type Minutes = i32;

/// Minutes in one service day.
pub const MINUTES_PER_DAY: Minutes = 24 * 60;

/// A time interval `[start, end)` in minutes.
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    /// Interval start (inclusive).
    pub start: Minutes,
    /// Interval end (exclusive).
    pub end: Minutes,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start: Minutes, end: Minutes) -> Self {
        Self { start, end }
    }

    /// Parses a window from two `HH:MM` strings.
    pub fn from_clock(start: &str, end: &str) -> Result<Self, ClockError> {
        Ok(Self::new(parse_clock(start)?, parse_clock(end)?))
    }

    /// Duration of this window in minutes.
    #[inline]
    pub fn duration(&self) -> Minutes {
        self.end - self.start
    }

    /// Whether a minute falls within this window.
    #[inline]
    pub fn contains(&self, time: Minutes) -> bool {
        time >= self.start && time < self.end
    }

    /// Whether `[start, end]` lies entirely inside this window.
    ///
    /// Both ends are inclusive: a trip ending exactly at the window end fits.
    #[inline]
    pub fn encloses(&self, start: Minutes, end: Minutes) -> bool {
        start >= self.start && end <= self.end
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A malformed wall-clock string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid clock time '{input}': expected HH:MM within one day")]
pub struct ClockError {
    /// The rejected input.
    pub input: String,
}

/// Parses `HH:MM` into minutes since midnight (`hours * 60 + minutes`).
///
/// Accepts one- or two-digit hours (`6:05`, `06:05`). Surrounding
/// whitespace is ignored. Hours must be `0..=23`, minutes `0..=59`.
///
/// ```
/// use u_duty::models::parse_clock;
///
/// assert_eq!(parse_clock("07:10").unwrap(), 430);
/// assert!(parse_clock("25:00").is_err());
/// ```
pub fn parse_clock(input: &str) -> Result<Minutes, ClockError> {
    let err = || ClockError {
        input: input.to_string(),
    };
    let (h, m) = input.trim().split_once(':').ok_or_else(err)?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return Err(err());
    }
    let hours: Minutes = h.parse().map_err(|_| err())?;
    let minutes: Minutes = m.parse().map_err(|_| err())?;
    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return Err(err());
    }
    Ok(hours * 60 + minutes)
}

/// Formats minutes since midnight as `HH:MM`.
pub fn format_clock(minutes: Minutes) -> String {
    format!("{:02}:{:02}", minutes.div_euclid(60), minutes.rem_euclid(60))
}
