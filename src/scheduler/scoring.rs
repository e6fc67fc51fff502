//! Alternative quality score.
//!
//! Scores a chain-packing [`Solution`] so alternatives can be ranked.
//!
//! # Score
//!
//! | Term | Definition |
//! |------|-----------|
//! | Coverage | `per_trip` × trips covered |
//! | No orphans | `no_orphans` when every pool trip is covered |
//! | On target | `on_target_shift` per shift with `|amplitude − target| < tolerance` |

use serde::{Deserialize, Serialize};

use crate::config::AssignmentConfig;
use crate::models::{Solution, Trip};

/// Breakdown of a solution's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionScore {
    /// Trips covered by proposed shifts.
    pub covered: usize,
    /// Trips left over.
    pub orphans: usize,
    /// Shifts within tolerance of the target amplitude.
    pub on_target_shifts: usize,
    /// Weighted total.
    pub total: i64,
}

impl SolutionScore {
    /// Scores a solution.
    ///
    /// # Arguments
    /// * `solution` - The alternative to score.
    /// * `trips` - The trip list its indices refer to.
    /// * `config` - Target amplitude, tolerance and score weights.
    pub fn calculate(solution: &Solution, trips: &[Trip], config: &AssignmentConfig) -> Self {
        let weights = &config.score;
        let covered = solution.covered();
        let orphans = solution.orphans.len();
        let on_target_shifts = solution
            .shifts
            .iter()
            .filter(|s| {
                (s.amplitude(trips) - config.target_shift_duration).abs()
                    < config.shift_duration_tolerance
            })
            .count();

        let mut total = weights.per_trip * covered as i64;
        if orphans == 0 {
            total += weights.no_orphans;
        }
        total += weights.on_target_shift * on_target_shifts as i64;

        Self {
            covered,
            orphans,
            on_target_shifts,
            total,
        }
    }
}

/// Writes the score into `solution.score` and returns it.
pub fn score_solution(solution: &mut Solution, trips: &[Trip], config: &AssignmentConfig) -> i64 {
    solution.score = SolutionScore::calculate(solution, trips, config).total;
    solution.score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProposedShift, ShiftBucket};

    fn trips() -> Vec<Trip> {
        vec![
            Trip::new("L", "0", "A", "B", 360, 600),
            Trip::new("L", "1", "B", "A", 610, 780),
            Trip::new("L", "2", "A", "B", 800, 850),
        ]
    }

    fn proposed(trips: &[usize]) -> ProposedShift {
        ProposedShift {
            bucket: ShiftBucket::Morning,
            trips: trips.to_vec(),
        }
    }

    #[test]
    fn test_score_terms() {
        let cfg = AssignmentConfig::new().with_target_duration(420, 60);
        // Amplitude 780 - 360 = 420: on target.
        let solution = Solution::new(vec![proposed(&[0, 1])], vec![2]);
        let score = SolutionScore::calculate(&solution, &trips(), &cfg);
        assert_eq!(score.covered, 2);
        assert_eq!(score.orphans, 1);
        assert_eq!(score.on_target_shifts, 1);
        assert_eq!(score.total, 2 * 10 + 5);
    }

    #[test]
    fn test_no_orphan_bonus() {
        let cfg = AssignmentConfig::new().with_target_duration(100, 10);
        let solution = Solution::new(vec![proposed(&[0, 1, 2])], vec![]);
        let score = SolutionScore::calculate(&solution, &trips(), &cfg);
        assert_eq!(score.on_target_shifts, 0);
        assert_eq!(score.total, 3 * 10 + 50);
    }

    #[test]
    fn test_tolerance_is_strict() {
        let cfg = AssignmentConfig::new().with_target_duration(480, 60);
        let solution = Solution::new(vec![proposed(&[0, 1])], vec![]);
        assert_eq!(SolutionScore::calculate(&solution, &trips(), &cfg).on_target_shifts, 0);
    }

    #[test]
    fn test_score_solution_writes_back() {
        let cfg = AssignmentConfig::new();
        let mut solution = Solution::new(vec![proposed(&[0, 1])], vec![2]);
        let total = score_solution(&mut solution, &trips(), &cfg);
        assert_eq!(solution.score, total);
    }
}
