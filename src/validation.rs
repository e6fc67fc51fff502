//! Input validation for duty scheduling problems.
//!
//! Checks structural integrity of trips and shifts before any model is
//! built. Detects:
//! - Trips that end before they start or leave the service day
//! - Duplicate trip keys and shift IDs
//! - Shift bounds or break windows that are empty or inverted
//! - Pre-existing shift trips that are not in the trip list
//! - Trips pre-assigned to more than one shift
//!
//! Every problem is reported, not only the first, with the offending trip
//! or shift index.

use std::collections::{HashMap, HashSet};

use crate::models::{Shift, Trip, MINUTES_PER_DAY};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
    /// Index of the offending trip, if any.
    pub trip: Option<usize>,
    /// Index of the offending shift, if any.
    pub shift: Option<usize>,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same identifier.
    DuplicateId,
    /// A trip's start is not before its end.
    InvertedTrip,
    /// A time lies outside `[0, 1440]`.
    OutsideServiceDay,
    /// A shift's earliest start is not before its latest end.
    InvertedShiftBounds,
    /// A split shift's break window is empty or inverted.
    InvalidBreakWindow,
    /// A shift holds a trip that is not in the trip list.
    UnknownTrip,
    /// A trip is pre-assigned to several shifts.
    TripInSeveralShifts,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            trip: None,
            shift: None,
        }
    }

    fn at_trip(mut self, index: usize) -> Self {
        self.trip = Some(index);
        self
    }

    fn at_shift(mut self, index: usize) -> Self {
        self.shift = Some(index);
        self
    }
}

/// Validates the input data for an assignment problem.
///
/// Checks:
/// 1. Every trip has `0 <= start < end <= 1440`
/// 2. No duplicate `(line, id)` trip keys
/// 3. No duplicate shift IDs
/// 4. Shift bounds, when both present, satisfy `start < end`
/// 5. Break windows are non-empty and within the day
/// 6. Every pre-existing shift trip exists in the trip list
/// 7. No trip is pre-assigned to more than one shift
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(trips: &[Trip], shifts: &[Shift]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut trip_keys: HashMap<(&str, &str), usize> = HashMap::new();
    for (i, trip) in trips.iter().enumerate() {
        if trip.start >= trip.end {
            errors.push(
                ValidationError::new(
                    ValidationErrorKind::InvertedTrip,
                    format!(
                        "Trip #{i} ({}) starts at {} but ends at {}",
                        trip.label(),
                        trip.start,
                        trip.end
                    ),
                )
                .at_trip(i),
            );
        }
        if trip.start < 0 || trip.end > MINUTES_PER_DAY {
            errors.push(
                ValidationError::new(
                    ValidationErrorKind::OutsideServiceDay,
                    format!("Trip #{i} ({}) leaves the service day", trip.label()),
                )
                .at_trip(i),
            );
        }
        if let Some(first) = trip_keys.insert(trip.key(), i) {
            errors.push(
                ValidationError::new(
                    ValidationErrorKind::DuplicateId,
                    format!("Duplicate trip {} at #{first} and #{i}", trip.label()),
                )
                .at_trip(i),
            );
        }
    }

    let mut shift_ids = HashSet::new();
    let mut holders: HashMap<(&str, &str), usize> = HashMap::new();
    for (s, shift) in shifts.iter().enumerate() {
        if !shift_ids.insert(shift.id.as_str()) {
            errors.push(
                ValidationError::new(
                    ValidationErrorKind::DuplicateId,
                    format!("Duplicate shift ID: {}", shift.id),
                )
                .at_shift(s),
            );
        }

        if let (Some(start), Some(end)) = (shift.earliest_start, shift.latest_end) {
            if start >= end {
                errors.push(
                    ValidationError::new(
                        ValidationErrorKind::InvertedShiftBounds,
                        format!(
                            "Shift '{}' bounds start at {start} but end at {end}",
                            shift.id
                        ),
                    )
                    .at_shift(s),
                );
            }
        }
        for bound in [shift.earliest_start, shift.latest_end].into_iter().flatten() {
            if !(0..=MINUTES_PER_DAY).contains(&bound) {
                errors.push(
                    ValidationError::new(
                        ValidationErrorKind::OutsideServiceDay,
                        format!("Shift '{}' bound {bound} leaves the service day", shift.id),
                    )
                    .at_shift(s),
                );
            }
        }

        if let Some(pause) = &shift.break_window {
            if pause.start >= pause.end || pause.start < 0 || pause.end > MINUTES_PER_DAY {
                errors.push(
                    ValidationError::new(
                        ValidationErrorKind::InvalidBreakWindow,
                        format!(
                            "Shift '{}' break window [{}, {}) is invalid",
                            shift.id, pause.start, pause.end
                        ),
                    )
                    .at_shift(s),
                );
            }
        }

        for trip in &shift.trips {
            match trip_keys.get(&trip.key()) {
                None => errors.push(
                    ValidationError::new(
                        ValidationErrorKind::UnknownTrip,
                        format!(
                            "Shift '{}' holds trip {} which is not in the trip list",
                            shift.id,
                            trip.label()
                        ),
                    )
                    .at_shift(s),
                ),
                Some(&index) => {
                    if let Some(other) = holders.insert(trip.key(), s) {
                        if other != s {
                            errors.push(
                                ValidationError::new(
                                    ValidationErrorKind::TripInSeveralShifts,
                                    format!(
                                        "Trip {} is held by shifts '{}' and '{}'",
                                        trip.label(),
                                        shifts[other].id,
                                        shift.id
                                    ),
                                )
                                .at_trip(index)
                                .at_shift(s),
                            );
                        }
                    }
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Index of each shift's pre-existing trips in the trip list.
///
/// Unknown trips are skipped; run [`validate_input`] first to reject them.
pub fn locked_trip_indices(trips: &[Trip], shifts: &[Shift]) -> Vec<Vec<usize>> {
    let index: HashMap<(&str, &str), usize> =
        trips.iter().enumerate().map(|(i, t)| (t.key(), i)).collect();
    shifts
        .iter()
        .map(|shift| {
            let mut locked: Vec<usize> = shift
                .trips
                .iter()
                .filter_map(|t| index.get(&t.key()).copied())
                .collect();
            locked.sort_unstable();
            locked.dedup();
            locked
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeWindow;

    fn sample_trips() -> Vec<Trip> {
        vec![
            Trip::new("L1", "1", "A", "B", 360, 420),
            Trip::new("L1", "2", "B", "C", 430, 480),
            Trip::new("L2", "1", "C", "A", 500, 560),
        ]
    }

    #[test]
    fn test_valid_input() {
        let trips = sample_trips();
        let shifts = vec![
            Shift::morning("S1").with_bounds(360, 720).with_trip(trips[0].clone()),
            Shift::afternoon("S2"),
        ];
        assert!(validate_input(&trips, &shifts).is_ok());
    }

    #[test]
    fn test_inverted_trip() {
        let trips = vec![Trip::new("L1", "1", "A", "B", 420, 420)];
        let errors = validate_input(&trips, &[]).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::InvertedTrip);
        assert_eq!(errors[0].trip, Some(0));
    }

    #[test]
    fn test_trip_outside_day() {
        let trips = vec![Trip::new("L1", "1", "A", "B", 1400, 1500)];
        let errors = validate_input(&trips, &[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::OutsideServiceDay));
    }

    #[test]
    fn test_duplicate_trip_key() {
        let mut trips = sample_trips();
        trips.push(Trip::new("L1", "1", "X", "Y", 600, 650));
        let errors = validate_input(&trips, &[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.trip == Some(3)));
    }

    #[test]
    fn test_same_id_on_other_line_is_fine() {
        let trips = vec![
            Trip::new("L1", "1", "A", "B", 360, 420),
            Trip::new("L2", "1", "A", "B", 360, 420),
        ];
        assert!(validate_input(&trips, &[]).is_ok());
    }

    #[test]
    fn test_duplicate_shift_id() {
        let shifts = vec![Shift::morning("S1"), Shift::afternoon("S1")];
        let errors = validate_input(&sample_trips(), &shifts).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("shift")));
    }

    #[test]
    fn test_inverted_shift_bounds() {
        let shifts = vec![Shift::morning("S1").with_bounds(720, 360)];
        let errors = validate_input(&sample_trips(), &shifts).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::InvertedShiftBounds);
        assert_eq!(errors[0].shift, Some(0));
    }

    #[test]
    fn test_invalid_break_window() {
        let shifts = vec![Shift::split("S1", TimeWindow::new(700, 600))];
        let errors = validate_input(&sample_trips(), &shifts).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::InvalidBreakWindow);
    }

    #[test]
    fn test_unknown_pre_assigned_trip() {
        let shifts =
            vec![Shift::morning("S1").with_trip(Trip::new("L9", "9", "A", "B", 360, 400))];
        let errors = validate_input(&sample_trips(), &shifts).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::UnknownTrip);
    }

    #[test]
    fn test_trip_in_several_shifts() {
        let trips = sample_trips();
        let shifts = vec![
            Shift::morning("S1").with_trip(trips[1].clone()),
            Shift::morning("S2").with_trip(trips[1].clone()),
        ];
        let errors = validate_input(&trips, &shifts).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::TripInSeveralShifts);
        assert_eq!(errors[0].trip, Some(1));
        assert_eq!(errors[0].shift, Some(1));
    }

    #[test]
    fn test_multiple_errors() {
        let trips = vec![
            Trip::new("L1", "1", "A", "B", 500, 400),
            Trip::new("L1", "1", "A", "B", 360, 420),
        ];
        let shifts = vec![Shift::morning("S1").with_bounds(600, 600)];
        let errors = validate_input(&trips, &shifts).unwrap_err();
        assert!(errors.len() >= 3);
    }

    #[test]
    fn test_locked_trip_indices() {
        let trips = sample_trips();
        let shifts = vec![
            Shift::morning("S1")
                .with_trip(trips[2].clone())
                .with_trip(trips[0].clone()),
            Shift::afternoon("S2"),
        ];
        assert_eq!(locked_trip_indices(&trips, &shifts), vec![vec![0, 2], vec![]]);
    }
}
