//! Trip (voyage) model.
//!
//! A trip is a single scheduled passenger run with fixed start/end times
//! and stop endpoints. Trips are immutable once built; shifts and solutions
//! only reference them.

use serde::{Deserialize, Serialize};

use super::window::{parse_clock, ClockError, Minutes, TimeWindow};

/// A scheduled trip.
///
/// # Time Representation
/// `start` and `end` are minutes since midnight. A valid trip has
/// `start < end`; see [`crate::validation::validate_input`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trip {
    /// Line identifier.
    pub line: String,
    /// Trip identifier (unique within its line).
    pub id: String,
    /// Departure stop code.
    pub start_stop: String,
    /// Arrival stop code.
    pub end_stop: String,
    /// Departure time (minutes since midnight).
    pub start: Minutes,
    /// Arrival time (minutes since midnight).
    pub end: Minutes,
}

impl Trip {
    /// Creates a trip from minute values.
    pub fn new(
        line: impl Into<String>,
        id: impl Into<String>,
        start_stop: impl Into<String>,
        end_stop: impl Into<String>,
        start: Minutes,
        end: Minutes,
    ) -> Self {
        Self {
            line: line.into(),
            id: id.into(),
            start_stop: start_stop.into(),
            end_stop: end_stop.into(),
            start,
            end,
        }
    }

    /// Creates a trip from `HH:MM` strings.
    ///
    /// ```
    /// use u_duty::models::Trip;
    ///
    /// let trip = Trip::from_clock("L1", "101", "GARE", "MAIRIE", "06:00", "07:00").unwrap();
    /// assert_eq!(trip.start, 360);
    /// assert_eq!(trip.duration(), 60);
    /// ```
    pub fn from_clock(
        line: impl Into<String>,
        id: impl Into<String>,
        start_stop: impl Into<String>,
        end_stop: impl Into<String>,
        start: &str,
        end: &str,
    ) -> Result<Self, ClockError> {
        Ok(Self::new(
            line,
            id,
            start_stop,
            end_stop,
            parse_clock(start)?,
            parse_clock(end)?,
        ))
    }

    /// `(line, id)` pair identifying this trip.
    #[inline]
    pub fn key(&self) -> (&str, &str) {
        (&self.line, &self.id)
    }

    /// Whether this trip is the same record as `other` (same line and id).
    #[inline]
    pub fn same_trip(&self, other: &Trip) -> bool {
        self.key() == other.key()
    }

    /// Running time in minutes.
    #[inline]
    pub fn duration(&self) -> Minutes {
        self.end - self.start
    }

    /// The trip as a time window.
    #[inline]
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end)
    }

    /// Human-readable label, e.g. `L1/101`.
    pub fn label(&self) -> String {
        format!("{}/{}", self.line, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trip_from_clock() {
        let t = Trip::from_clock("L2", "7", "A", "B", "07:10", "08:00").unwrap();
        assert_eq!(t.start, 430);
        assert_eq!(t.end, 480);
        assert_eq!(t.duration(), 50);
        assert_eq!(t.key(), ("L2", "7"));
        assert_eq!(t.label(), "L2/7");
    }

    #[test]
    fn test_trip_from_clock_rejects_bad_time() {
        assert!(Trip::from_clock("L2", "7", "A", "B", "7h10", "08:00").is_err());
    }

    #[test]
    fn test_same_trip_ignores_times() {
        let a = Trip::new("L1", "1", "A", "B", 0, 10);
        let b = Trip::new("L1", "1", "X", "Y", 20, 30);
        let c = Trip::new("L2", "1", "A", "B", 0, 10);
        assert!(a.same_trip(&b));
        assert!(!a.same_trip(&c));
    }
}
