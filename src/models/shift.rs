//! Shift (service) model.
//!
//! A shift is a driver/vehicle duty built from one or more trips. It may
//! declare time bounds limiting which trips it accepts and, for split
//! shifts, a break window during which it runs nothing.

use serde::{Deserialize, Serialize};

use super::window::{Minutes, TimeWindow};
use super::Trip;

/// Shift type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShiftKind {
    /// Morning duty.
    Morning,
    /// Afternoon duty.
    Afternoon,
    /// Split duty with a break in the middle of the day.
    Split,
}

/// A shift that trips can be assigned to.
///
/// Trips are kept in insertion order; [`Shift::sorted_trips`] recomputes
/// time order on demand.
///
/// A missing bound (`None`) means unbounded on that side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    /// Unique shift identifier.
    pub id: String,
    /// Shift type.
    pub kind: ShiftKind,
    /// Assigned trips, insertion order.
    pub trips: Vec<Trip>,
    /// Earliest allowed trip start. `None` = unbounded.
    pub earliest_start: Option<Minutes>,
    /// Latest allowed trip end. `None` = unbounded.
    pub latest_end: Option<Minutes>,
    /// Break window of a split shift; no trip may overlap it.
    pub break_window: Option<TimeWindow>,
}

impl Shift {
    /// Creates an empty, unbounded shift.
    pub fn new(id: impl Into<String>, kind: ShiftKind) -> Self {
        Self {
            id: id.into(),
            kind,
            trips: Vec::new(),
            earliest_start: None,
            latest_end: None,
            break_window: None,
        }
    }

    /// Creates a morning shift.
    pub fn morning(id: impl Into<String>) -> Self {
        Self::new(id, ShiftKind::Morning)
    }

    /// Creates an afternoon shift.
    pub fn afternoon(id: impl Into<String>) -> Self {
        Self::new(id, ShiftKind::Afternoon)
    }

    /// Creates a split shift with the given break window.
    pub fn split(id: impl Into<String>, break_window: TimeWindow) -> Self {
        Self::new(id, ShiftKind::Split).with_break(break_window)
    }

    /// Sets both time bounds.
    pub fn with_bounds(mut self, earliest_start: Minutes, latest_end: Minutes) -> Self {
        self.earliest_start = Some(earliest_start);
        self.latest_end = Some(latest_end);
        self
    }

    /// Sets the earliest allowed trip start.
    pub fn with_earliest_start(mut self, earliest_start: Minutes) -> Self {
        self.earliest_start = Some(earliest_start);
        self
    }

    /// Sets the latest allowed trip end.
    pub fn with_latest_end(mut self, latest_end: Minutes) -> Self {
        self.latest_end = Some(latest_end);
        self
    }

    /// Sets the break window.
    pub fn with_break(mut self, break_window: TimeWindow) -> Self {
        self.break_window = Some(break_window);
        self
    }

    /// Adds a pre-existing trip.
    pub fn with_trip(mut self, trip: Trip) -> Self {
        self.trips.push(trip);
        self
    }

    /// Appends a trip.
    pub fn add_trip(&mut self, trip: Trip) {
        self.trips.push(trip);
    }

    /// Whether the shift already holds this trip.
    pub fn contains_trip(&self, trip: &Trip) -> bool {
        self.trips.iter().any(|t| t.same_trip(trip))
    }

    /// Declared bounds as a window. Missing sides extend to the day limits.
    pub fn bounds(&self) -> Option<TimeWindow> {
        if self.earliest_start.is_none() && self.latest_end.is_none() {
            return None;
        }
        Some(TimeWindow::new(
            self.earliest_start.unwrap_or(0),
            self.latest_end.unwrap_or(super::window::MINUTES_PER_DAY),
        ))
    }

    /// Whether the shift's bounds and break window admit this trip.
    ///
    /// Does not look at other trips; pairwise rules live in
    /// [`crate::compatibility`].
    pub fn admits(&self, trip: &Trip) -> bool {
        if let Some(earliest) = self.earliest_start {
            if trip.start < earliest {
                return false;
            }
        }
        if let Some(latest) = self.latest_end {
            if trip.end > latest {
                return false;
            }
        }
        match &self.break_window {
            Some(pause) => !pause.overlaps(&trip.window()),
            None => true,
        }
    }

    /// Trips sorted by start time (then end time).
    pub fn sorted_trips(&self) -> Vec<&Trip> {
        let mut sorted: Vec<&Trip> = self.trips.iter().collect();
        sorted.sort_by_key(|t| (t.start, t.end));
        sorted
    }

    /// Amplitude: last end minus first start. Zero when empty.
    pub fn amplitude(&self) -> Minutes {
        let first = self.trips.iter().map(|t| t.start).min();
        let last = self.trips.iter().map(|t| t.end).max();
        match (first, last) {
            (Some(first), Some(last)) => last - first,
            _ => 0,
        }
    }

    /// Number of assigned trips.
    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }

    /// Whether no trips are assigned.
    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}
