//! Roster aggregate.
//!
//! Owns the day's trips and shifts. Shift contents change only through
//! [`Roster::apply_assignment`], [`Roster::apply_solution`] and
//! [`Roster::remove_shift`]. Both apply steps check every move first and
//! write nothing when one of them fails.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Shift, ShiftBucket, ShiftKind, Solution, Trip};
use crate::error::{Error, Result};
use crate::scheduler::AssignmentOutcome;

/// Trips and shifts of one operating day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    /// All trips; assignments refer to them by index.
    pub trips: Vec<Trip>,
    /// Shifts, creation order.
    pub shifts: Vec<Shift>,
}

impl Roster {
    /// Creates a roster.
    pub fn new(trips: Vec<Trip>, shifts: Vec<Shift>) -> Self {
        Self { trips, shifts }
    }

    /// Shift by id.
    pub fn shift(&self, id: &str) -> Option<&Shift> {
        self.shifts.iter().find(|s| s.id == id)
    }

    /// Id of the shift holding trip `index`.
    pub fn holder(&self, index: usize) -> Option<&str> {
        let trip = self.trips.get(index)?;
        self.shifts
            .iter()
            .find(|s| s.contains_trip(trip))
            .map(|s| s.id.as_str())
    }

    /// Indices of trips no shift holds, input order.
    pub fn unassigned_trips(&self) -> Vec<usize> {
        let held = self.held();
        (0..self.trips.len())
            .filter(|&t| !held.contains_key(&t))
            .collect()
    }

    /// Removes a shift; its trips return to the unassigned pool.
    pub fn remove_shift(&mut self, id: &str) -> Result<Shift> {
        let pos = self
            .shifts
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| Error::UnknownShift(id.to_string()))?;
        let removed = self.shifts.remove(pos);
        debug!(shift = id, released = removed.trips.len(), "shift removed");
        Ok(removed)
    }

    /// Writes a single-mode assignment into the shifts.
    ///
    /// Trips a shift already holds are skipped. Returns the number of trips
    /// added.
    ///
    /// # Errors
    /// - [`Error::UnknownShift`] / [`Error::UnknownTrip`] for dangling
    ///   references.
    /// - [`Error::TripAlreadyAssigned`] when a trip is held elsewhere or
    ///   listed for two shifts.
    pub fn apply_assignment(&mut self, outcome: &AssignmentOutcome) -> Result<usize> {
        let positions: HashMap<&str, usize> = self
            .shifts
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.as_str(), i))
            .collect();
        let mut claims = self.held();
        let mut moves: Vec<(usize, usize)> = Vec::new();

        for assignment in &outcome.shifts {
            let shift = *positions
                .get(assignment.shift_id.as_str())
                .ok_or_else(|| Error::UnknownShift(assignment.shift_id.clone()))?;
            for &t in &assignment.trips {
                if self.claim(&mut claims, t, shift)? {
                    moves.push((shift, t));
                }
            }
        }

        for &(shift, t) in &moves {
            let trip = self.trips[t].clone();
            self.shifts[shift].add_trip(trip);
        }
        info!(added = moves.len(), "assignment applied");
        Ok(moves.len())
    }

    /// Materializes a chain-mode solution.
    ///
    /// Each proposed shift fills the first empty shift of a matching kind
    /// whose bounds admit all its trips (split shifts match either bucket);
    /// otherwise a new shift `{bucket}-{n}` is created. Returns the ids of
    /// the shifts filled, in proposal order.
    ///
    /// # Errors
    /// Same as [`Roster::apply_assignment`].
    pub fn apply_solution(&mut self, solution: &Solution) -> Result<Vec<String>> {
        let mut claims = self.held();
        let mut taken: HashSet<usize> = HashSet::new();
        let mut ids: HashSet<String> = self.shifts.iter().map(|s| s.id.clone()).collect();
        let mut created: Vec<Shift> = Vec::new();
        let mut targets: Vec<(Target, &[usize])> = Vec::new();

        for (n, proposed) in solution.shifts.iter().enumerate() {
            // Proposals claim under positions past the existing shifts.
            let slot = self.shifts.len() + n;
            for &t in &proposed.trips {
                self.claim(&mut claims, t, slot)?;
            }
            let existing = self.shifts.iter().enumerate().position(|(i, s)| {
                !taken.contains(&i)
                    && s.is_empty()
                    && kind_fits(s.kind, proposed.bucket)
                    && proposed.trips.iter().all(|&t| s.admits(&self.trips[t]))
            });
            match existing {
                Some(i) => {
                    taken.insert(i);
                    targets.push((Target::Existing(i), proposed.trips.as_slice()));
                }
                None => {
                    let id = fresh_id(&mut ids, proposed.bucket);
                    created.push(Shift::new(id, proposed.bucket.kind()));
                    targets.push((Target::Created(created.len() - 1), proposed.trips.as_slice()));
                }
            }
        }

        let base = self.shifts.len();
        self.shifts.extend(created);
        let mut filled = Vec::with_capacity(targets.len());
        for (target, trips) in targets {
            let shift = match target {
                Target::Existing(i) => i,
                Target::Created(i) => base + i,
            };
            let mut order = trips.to_vec();
            order.sort_by_key(|&t| (self.trips[t].start, self.trips[t].end, t));
            order.dedup();
            for t in order {
                let trip = self.trips[t].clone();
                self.shifts[shift].add_trip(trip);
            }
            filled.push(self.shifts[shift].id.clone());
        }
        info!(
            shifts = filled.len(),
            created = self.shifts.len() - base,
            "solution applied"
        );
        Ok(filled)
    }

    /// Trip index → holding shift position.
    fn held(&self) -> HashMap<usize, usize> {
        let index: HashMap<(&str, &str), usize> = self
            .trips
            .iter()
            .enumerate()
            .map(|(i, t)| (t.key(), i))
            .collect();
        let mut held = HashMap::new();
        for (s, shift) in self.shifts.iter().enumerate() {
            for trip in &shift.trips {
                if let Some(&t) = index.get(&trip.key()) {
                    held.insert(t, s);
                }
            }
        }
        held
    }

    /// Reserves trip `t` for shift position `shift`.
    ///
    /// Returns `false` when that shift already holds it.
    fn claim(&self, claims: &mut HashMap<usize, usize>, t: usize, shift: usize) -> Result<bool> {
        if t >= self.trips.len() {
            return Err(Error::UnknownTrip(t));
        }
        match claims.get(&t) {
            Some(&holder) if holder == shift => Ok(false),
            Some(&holder) => Err(Error::TripAlreadyAssigned {
                trip: self.trips[t].label(),
                shift: match self.shifts.get(holder) {
                    Some(s) => s.id.clone(),
                    None => format!("proposal {}", holder - self.shifts.len() + 1),
                },
            }),
            None => {
                claims.insert(t, shift);
                Ok(true)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Existing(usize),
    Created(usize),
}

fn kind_fits(kind: ShiftKind, bucket: ShiftBucket) -> bool {
    kind == ShiftKind::Split || kind == bucket.kind()
}

fn fresh_id(ids: &mut HashSet<String>, bucket: ShiftBucket) -> String {
    let mut n = 1;
    loop {
        let id = format!("{}-{}", bucket.label(), n);
        if ids.insert(id.clone()) {
            return id;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProposedShift;
    use crate::cp::SolverStatistics;
    use crate::scheduler::{AssignmentStatistics, ShiftAssignment, SolveStatus};

    fn trips() -> Vec<Trip> {
        vec![
            Trip::new("L1", "1", "AAA", "BBB", 360, 420),
            Trip::new("L1", "2", "BBB", "AAA", 430, 490),
            Trip::new("L1", "3", "CCC", "DDD", 780, 840),
        ]
    }

    fn outcome(shifts: Vec<(&str, Vec<usize>)>) -> AssignmentOutcome {
        AssignmentOutcome {
            success: true,
            shifts: shifts
                .into_iter()
                .map(|(id, trips)| ShiftAssignment {
                    shift_id: id.to_string(),
                    trips,
                })
                .collect(),
            unassigned: Vec::new(),
            statistics: AssignmentStatistics {
                total: 3,
                assigned: 0,
                unassigned: 0,
                coverage_rate: 0.0,
                shifts: Vec::new(),
                warnings: Vec::new(),
                solver: SolverStatistics::default(),
                status: SolveStatus::Optimal,
            },
        }
    }

    #[test]
    fn test_unassigned_and_remove() {
        let t = trips();
        let mut roster = Roster::new(t.clone(), vec![Shift::morning("S1").with_trip(t[0].clone())]);
        assert_eq!(roster.unassigned_trips(), vec![1, 2]);
        assert_eq!(roster.holder(0), Some("S1"));

        let removed = roster.remove_shift("S1").unwrap();
        assert_eq!(removed.trip_count(), 1);
        assert_eq!(roster.unassigned_trips(), vec![0, 1, 2]);
        assert!(matches!(roster.remove_shift("S1"), Err(Error::UnknownShift(_))));
    }

    #[test]
    fn test_apply_assignment_skips_held() {
        let t = trips();
        let mut roster = Roster::new(t.clone(), vec![Shift::morning("S1").with_trip(t[0].clone())]);
        let added = roster
            .apply_assignment(&outcome(vec![("S1", vec![0, 1])]))
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(roster.shift("S1").unwrap().trip_count(), 2);
        assert_eq!(roster.unassigned_trips(), vec![2]);
    }

    #[test]
    fn test_apply_assignment_is_all_or_nothing() {
        let mut roster = Roster::new(trips(), vec![Shift::morning("S1"), Shift::morning("S2")]);

        let err = roster
            .apply_assignment(&outcome(vec![("S1", vec![0]), ("S2", vec![1, 0])]))
            .unwrap_err();
        assert!(matches!(err, Error::TripAlreadyAssigned { .. }));
        assert!(roster.shifts.iter().all(|s| s.is_empty()));

        let err = roster
            .apply_assignment(&outcome(vec![("S1", vec![0]), ("S9", vec![1])]))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownShift(_)));
        assert!(roster.shifts.iter().all(|s| s.is_empty()));

        let err = roster
            .apply_assignment(&outcome(vec![("S1", vec![0, 7])]))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownTrip(7)));
        assert!(roster.shifts.iter().all(|s| s.is_empty()));
    }

    #[test]
    fn test_apply_solution_fills_then_creates() {
        let mut roster = Roster::new(
            trips(),
            vec![Shift::afternoon("PM"), Shift::morning("AM").with_bounds(360, 720)],
        );
        let solution = Solution::new(
            vec![
                ProposedShift {
                    bucket: ShiftBucket::Morning,
                    trips: vec![1, 0],
                },
                ProposedShift {
                    bucket: ShiftBucket::Morning,
                    trips: vec![2],
                },
            ],
            vec![],
        );
        let filled = roster.apply_solution(&solution).unwrap();
        assert_eq!(filled, vec!["AM".to_string(), "matin-1".to_string()]);

        let am = roster.shift("AM").unwrap();
        assert_eq!(am.trips[0].id, "1");
        assert_eq!(am.trips[1].id, "2");
        assert_eq!(roster.shift("matin-1").unwrap().kind, ShiftKind::Morning);
        assert!(roster.shift("PM").unwrap().is_empty());
        assert!(roster.unassigned_trips().is_empty());
    }

    #[test]
    fn test_apply_solution_rejects_held_trip() {
        let t = trips();
        let mut roster = Roster::new(t.clone(), vec![Shift::morning("S1").with_trip(t[0].clone())]);
        let solution = Solution::new(
            vec![ProposedShift {
                bucket: ShiftBucket::Morning,
                trips: vec![0, 1],
            }],
            vec![],
        );
        let err = roster.apply_solution(&solution).unwrap_err();
        assert!(matches!(err, Error::TripAlreadyAssigned { .. }));
        assert_eq!(roster.shifts.len(), 1);
        assert_eq!(roster.unassigned_trips(), vec![1, 2]);
    }
}
