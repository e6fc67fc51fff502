//! Solver driver.
//!
//! # Modes
//!
//! | Mode | Formulation | Output |
//! |------|-------------|--------|
//! | [`ShiftAssigner::assign`] | direct trip→shift | one [`AssignmentOutcome`] |
//! | [`ShiftAssigner::enumerate`] | chain selection | ranked [`SolutionSet`] |
//! | [`ShiftAssigner::randomized`] | chain selection, jittered | ranked [`SolutionSet`] |
//!
//! # Algorithm
//!
//! **Single**: build the direct model, solve to optimality within the time
//! budget, decode and audit. An audit failure means the model was built
//! wrong and is returned as [`Error::ModelInconsistency`].
//!
//! **Enumerate**: first maximize coverage `C`, then stream every chain
//! packing covering at least `C − coverage_slack` trips into a sink,
//! capped at `max_alternatives × ENUMERATION_OVERSAMPLE` before ranking.
//! Both phases share one wall-clock deadline.
//!
//! **Randomized**: `randomized_attempts` independent re-solves on a pool
//! of `workers` threads. Attempt `i` rebuilds the model from scratch with
//! seed `seed + i` for its objective jitter. Results are merged in attempt
//! order, so the set does not depend on thread count.
//!
//! Candidates are audited, deduplicated by signature, scored, ranked by
//! descending score (stable) and cut to `max_alternatives`. A candidate
//! failing the audit is returned as [`Error::ModelInconsistency`].

use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::config::AssignmentConfig;
use crate::cp::{CpResult, CpSolution, CpSolver, SolverConfig, SolverStatistics};
use crate::error::{Error, Result};
use crate::formulation::{ChainModelBuilder, DirectModelBuilder};
use crate::models::{Shift, Solution, SolutionSet, Trip};
use crate::report::{AssignmentReport, ContinuityWarning, PlannedShift, ShiftStats};
use crate::validation::validate_input;

use super::scoring::score_solution;

/// Enumeration collects this many candidates per requested alternative.
pub const ENUMERATION_OVERSAMPLE: usize = 20;

/// [`AlternativeStrategy::Auto`] enumerates up to this many chains.
pub const AUTO_ENUMERATION_MAX_CHAINS: usize = 64;

/// Solver status of a single-mode run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// Best assignment, proven.
    Optimal,
    /// Best assignment found within the budget.
    Feasible,
    /// No assignment satisfies the hard rules.
    Infeasible,
    /// The budget ran out before any assignment was found.
    Unknown,
}

impl SolveStatus {
    fn of(result: &CpResult) -> Self {
        match result {
            CpResult::Optimal(_) => SolveStatus::Optimal,
            CpResult::Feasible(_) => SolveStatus::Feasible,
            CpResult::Infeasible => SolveStatus::Infeasible,
            CpResult::Unknown => SolveStatus::Unknown,
        }
    }
}

/// Trips assigned to one shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftAssignment {
    /// Shift id.
    pub shift_id: String,
    /// Trip indices in time order, pre-existing trips included.
    pub trips: Vec<usize>,
}

/// Counts and rates of a single-mode run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentStatistics {
    /// Trips in the input.
    pub total: usize,
    /// Trips held by a shift.
    pub assigned: usize,
    /// Trips left over.
    pub unassigned: usize,
    /// `assigned / total` in percent.
    pub coverage_rate: f64,
    /// Per-shift rest and continuity figures.
    pub shifts: Vec<ShiftStats>,
    /// Stop discontinuities in the result.
    pub warnings: Vec<ContinuityWarning>,
    /// Search counters.
    pub solver: SolverStatistics,
    /// Solver status.
    pub status: SolveStatus,
}

/// Result of [`ShiftAssigner::assign`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentOutcome {
    /// Whether an assignment was produced.
    pub success: bool,
    /// Shift contents, input shift order. Empty on failure.
    pub shifts: Vec<ShiftAssignment>,
    /// Trip indices held by no shift.
    pub unassigned: Vec<usize>,
    /// Run statistics.
    pub statistics: AssignmentStatistics,
}

/// How [`ShiftAssigner::alternatives`] produces candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlternativeStrategy {
    /// Exhaustive streaming enumeration.
    Enumerate,
    /// Seeded re-solves with jittered weights.
    Randomized,
    /// Enumerate small chain sets, randomize large ones.
    #[default]
    Auto,
}

/// Assigns trips to shifts.
///
/// # Example
/// ```
/// use u_duty::config::AssignmentConfig;
/// use u_duty::models::{Shift, Trip};
/// use u_duty::scheduler::ShiftAssigner;
///
/// let trips = vec![
///     Trip::new("L1", "1", "GARE", "MAIRIE", 360, 420),
///     Trip::new("L1", "2", "MAIRIE", "GARE", 430, 480),
/// ];
/// let shifts = vec![Shift::morning("S1").with_bounds(360, 720)];
///
/// let outcome = ShiftAssigner::new(AssignmentConfig::default())
///     .assign(&trips, &shifts)
///     .unwrap();
/// assert!(outcome.success);
/// assert_eq!(outcome.shifts[0].trips, vec![0, 1]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ShiftAssigner {
    config: AssignmentConfig,
}

impl ShiftAssigner {
    /// Creates a driver.
    pub fn new(config: AssignmentConfig) -> Self {
        Self { config }
    }

    /// Configuration in force.
    pub fn config(&self) -> &AssignmentConfig {
        &self.config
    }

    fn check(&self, trips: &[Trip], shifts: &[Shift]) -> Result<()> {
        self.config.validate()?;
        validate_input(trips, shifts)?;
        Ok(())
    }

    /// Finds one assignment of `trips` to `shifts`.
    ///
    /// Trips already held by a shift stay there. Infeasibility is reported
    /// through `success == false`, not as an error.
    ///
    /// # Errors
    /// - [`Error::InvalidConfig`] / [`Error::InvalidInput`] before solving.
    /// - [`Error::ModelInconsistency`] if the decoded assignment fails the
    ///   audit.
    #[instrument(skip_all, fields(trips = trips.len(), shifts = shifts.len()))]
    pub fn assign(&self, trips: &[Trip], shifts: &[Shift]) -> Result<AssignmentOutcome> {
        self.check(trips, shifts)?;
        let config = &self.config;

        let builder = DirectModelBuilder::new(trips, shifts, config);
        let direct = builder.build();
        debug!(
            vars = direct.model.var_count(),
            constraints = direct.model.constraint_count(),
            "direct model built"
        );

        let solver_config = SolverConfig::default().with_time_limit(config.time_limit());
        let outcome = CpSolver::new(solver_config).solve(&direct.model);
        let status = SolveStatus::of(&outcome.result);
        info!(result = %outcome.result, stats = %outcome.statistics, "direct solve finished");

        let Some(solution) = outcome.solution() else {
            warn!(?status, "no assignment produced");
            let mut held = vec![false; trips.len()];
            for &t in builder.locked().iter().flatten() {
                held[t] = true;
            }
            let unassigned: Vec<usize> = (0..trips.len()).filter(|&t| !held[t]).collect();
            let assigned = trips.len() - unassigned.len();
            return Ok(AssignmentOutcome {
                success: false,
                shifts: Vec::new(),
                statistics: AssignmentStatistics {
                    total: trips.len(),
                    assigned,
                    unassigned: unassigned.len(),
                    coverage_rate: rate(assigned, trips.len()),
                    shifts: Vec::new(),
                    warnings: Vec::new(),
                    solver: outcome.statistics.clone(),
                    status,
                },
                unassigned,
            });
        };

        let contents = direct.decode(solution, trips);
        let plan: Vec<PlannedShift<'_>> = shifts
            .iter()
            .zip(&contents)
            .map(|(shift, held)| PlannedShift::existing(shift, held.clone()))
            .collect();
        let report = AssignmentReport::audit(trips, &plan, config);
        if let Some(first) = report.violations.first() {
            error!(
                violations = report.violations.len(),
                %first,
                "solver output failed the audit"
            );
            return Err(Error::ModelInconsistency {
                violations: report.violations.len(),
                first: first.to_string(),
            });
        }

        let mut held = vec![false; trips.len()];
        for &t in contents.iter().flatten() {
            held[t] = true;
        }
        let unassigned: Vec<usize> = (0..trips.len()).filter(|&t| !held[t]).collect();
        info!(
            assigned = report.assigned,
            unassigned = unassigned.len(),
            coverage = report.coverage_rate,
            discontinuities = report.discontinuities(),
            "assignment complete"
        );

        Ok(AssignmentOutcome {
            success: true,
            shifts: shifts
                .iter()
                .zip(contents)
                .map(|(shift, trips)| ShiftAssignment {
                    shift_id: shift.id.clone(),
                    trips,
                })
                .collect(),
            statistics: AssignmentStatistics {
                total: report.total,
                assigned: report.assigned,
                unassigned: unassigned.len(),
                coverage_rate: report.coverage_rate,
                shifts: report.shifts,
                warnings: report.warnings,
                solver: outcome.statistics,
                status,
            },
            unassigned,
        })
    }

    /// Ranked alternatives using `strategy`.
    #[instrument(skip_all, fields(strategy = ?strategy))]
    pub fn alternatives(
        &self,
        trips: &[Trip],
        shifts: &[Shift],
        strategy: AlternativeStrategy,
    ) -> Result<SolutionSet> {
        self.check(trips, shifts)?;
        let builder = ChainModelBuilder::new(trips, shifts, &self.config);
        let enumerate = match strategy {
            AlternativeStrategy::Enumerate => true,
            AlternativeStrategy::Randomized => false,
            AlternativeStrategy::Auto => builder.chains().len() <= AUTO_ENUMERATION_MAX_CHAINS,
        };
        if enumerate {
            self.enumerate_with(trips, &builder)
        } else {
            self.randomized_with(trips, &builder)
        }
    }

    /// Ranked alternatives by exhaustive enumeration.
    ///
    /// Deterministic when the search finishes within the time budget.
    ///
    /// # Errors
    /// [`Error::ModelInconsistency`] if a candidate fails the audit.
    #[instrument(skip_all, fields(trips = trips.len()))]
    pub fn enumerate(&self, trips: &[Trip], shifts: &[Shift]) -> Result<SolutionSet> {
        self.check(trips, shifts)?;
        let builder = ChainModelBuilder::new(trips, shifts, &self.config);
        self.enumerate_with(trips, &builder)
    }

    /// Ranked alternatives by randomized re-solves.
    ///
    /// # Errors
    /// - [`Error::WorkerPool`] if the thread pool cannot start.
    /// - [`Error::ModelInconsistency`] if a candidate fails the audit.
    #[instrument(skip_all, fields(trips = trips.len()))]
    pub fn randomized(&self, trips: &[Trip], shifts: &[Shift]) -> Result<SolutionSet> {
        self.check(trips, shifts)?;
        let builder = ChainModelBuilder::new(trips, shifts, &self.config);
        self.randomized_with(trips, &builder)
    }

    fn enumerate_with(
        &self,
        trips: &[Trip],
        builder: &ChainModelBuilder<'_>,
    ) -> Result<SolutionSet> {
        let config = &self.config;
        let deadline = Instant::now() + config.time_limit();

        // Phase 1: best coverage.
        let coverage_model = builder.build(&vec![1; trips.len()]);
        let best = CpSolver::new(SolverConfig::default().with_time_limit(config.time_limit()))
            .solve(&coverage_model.model);
        let best_coverage = best
            .solution()
            .map_or(0, |s| usize::try_from(s.objective).unwrap_or(0));
        let floor = best_coverage.saturating_sub(config.coverage_slack);
        debug!(best_coverage, floor, chains = builder.chains().len(), "coverage bound");

        // Phase 2: stream every packing at or above the floor.
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            warn!(best_coverage, "time budget spent before enumeration");
            let candidates = best
                .solution()
                .map(|s| coverage_model.decode(s, config.afternoon_start));
            return self.rank(trips, candidates);
        }
        let mut chain_model = builder.build(&builder.uniform_weights());
        chain_model.require_coverage(floor);
        let limit = config.max_alternatives.saturating_mul(ENUMERATION_OVERSAMPLE);
        let solver_config = SolverConfig::default()
            .with_time_limit(remaining)
            .with_solution_limit(limit as u64);
        let mut streamed: Vec<CpSolution> = Vec::new();
        let outcome = CpSolver::new(solver_config).enumerate(&chain_model.model, &mut streamed);
        info!(
            streamed = streamed.len(),
            reason = %outcome.reason,
            stats = %outcome.statistics,
            "enumeration finished"
        );

        let candidates = streamed
            .iter()
            .map(|s| chain_model.decode(s, config.afternoon_start));
        self.rank(trips, candidates)
    }

    fn randomized_with(
        &self,
        trips: &[Trip],
        builder: &ChainModelBuilder<'_>,
    ) -> Result<SolutionSet> {
        let config = &self.config;
        let deadline = Instant::now() + config.time_limit();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers.max(1))
            .build()?;

        let attempts: Vec<Option<Solution>> = pool.install(|| {
            (0..config.randomized_attempts)
                .into_par_iter()
                .map(|attempt| {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return None;
                    }
                    let seed = config.seed.wrapping_add(attempt as u64);
                    let chain_model = builder.build(&builder.jittered_weights(seed));
                    let solver_config = SolverConfig::default().with_time_limit(remaining);
                    let outcome = CpSolver::new(solver_config).solve(&chain_model.model);
                    debug!(attempt, seed, result = %outcome.result, "re-solve finished");
                    outcome
                        .solution()
                        .map(|s| chain_model.decode(s, config.afternoon_start))
                })
                .collect()
        });

        let found = attempts.iter().filter(|a| a.is_some()).count();
        info!(
            attempts = config.randomized_attempts,
            found,
            workers = config.workers,
            "randomized re-solves finished"
        );
        self.rank(trips, attempts.into_iter().flatten())
    }

    fn rank(
        &self,
        trips: &[Trip],
        candidates: impl IntoIterator<Item = Solution>,
    ) -> Result<SolutionSet> {
        let mut set = SolutionSet::new();
        let mut duplicates = 0usize;
        for mut candidate in candidates {
            let report = AssignmentReport::for_solution(trips, &candidate, &self.config);
            if let Some(first) = report.violations.first() {
                error!(
                    violations = report.violations.len(),
                    %first,
                    "candidate packing failed the audit"
                );
                return Err(Error::ModelInconsistency {
                    violations: report.violations.len(),
                    first: first.to_string(),
                });
            }
            score_solution(&mut candidate, trips, &self.config);
            if !set.insert(candidate) {
                duplicates += 1;
            }
        }
        set.rank();
        set.solutions.truncate(self.config.max_alternatives);
        debug!(kept = set.len(), duplicates, "alternatives ranked");
        Ok(set)
    }
}

fn rate(part: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        100.0 * part as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProposedShift, ShiftBucket};

    fn trip(id: &str, from: &str, to: &str, start: i32, end: i32) -> Trip {
        Trip::new("L1", id, from, to, start, end)
    }

    fn config() -> AssignmentConfig {
        AssignmentConfig::new()
            .with_min_rest(5, 15)
            .with_max_rest(Some(60))
            .with_shift_duration(60, 600)
    }

    /// `t0` can be followed by either `t1` or `t2`, which overlap.
    fn fork() -> Vec<Trip> {
        vec![
            trip("t0", "AAA", "BBB", 360, 420),
            trip("t1", "BBB", "AAA", 430, 490),
            trip("t2", "BBB", "AAA", 425, 485),
        ]
    }

    fn two_runs() -> Vec<Trip> {
        vec![
            trip("m1", "AAA", "BBB", 360, 420),
            trip("m2", "BBB", "AAA", 430, 490),
            trip("a1", "CCC", "DDD", 780, 840),
            trip("a2", "DDD", "CCC", 850, 910),
        ]
    }

    #[test]
    fn test_assign_fills_shift() {
        let trips = vec![
            trip("1", "AAA", "BBB", 360, 420),
            trip("2", "BBB", "CCC", 430, 480),
        ];
        let shifts = vec![Shift::morning("S1").with_bounds(360, 720)];
        let outcome = ShiftAssigner::new(config()).assign(&trips, &shifts).unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.statistics.status, SolveStatus::Optimal);
        assert_eq!(outcome.shifts[0].shift_id, "S1");
        assert_eq!(outcome.shifts[0].trips, vec![0, 1]);
        assert!(outcome.unassigned.is_empty());
        assert_eq!(outcome.statistics.coverage_rate, 100.0);
        assert_eq!(outcome.statistics.shifts[0].max_rest, Some(10));
    }

    #[test]
    fn test_assign_splits_short_rest() {
        let trips = vec![
            trip("1", "AAA", "BBB", 360, 420),
            trip("2", "BBB", "CCC", 423, 480),
        ];
        let shifts = vec![Shift::morning("S1"), Shift::morning("S2")];
        let outcome = ShiftAssigner::new(config()).assign(&trips, &shifts).unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.shifts[0].trips.len(), 1);
        assert_eq!(outcome.shifts[1].trips.len(), 1);
        assert!(outcome.unassigned.is_empty());
    }

    #[test]
    fn test_assign_reports_unassigned() {
        let trips = vec![
            trip("1", "AAA", "BBB", 360, 420),
            trip("2", "AAA", "BBB", 780, 840),
        ];
        let shifts = vec![Shift::morning("S1").with_bounds(360, 720)];
        let outcome = ShiftAssigner::new(config()).assign(&trips, &shifts).unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.unassigned, vec![1]);
        assert_eq!(outcome.statistics.unassigned, 1);
        assert_eq!(outcome.statistics.coverage_rate, 50.0);
    }

    #[test]
    fn test_locked_trip_outside_window_is_infeasible() {
        let trips = vec![trip("1", "AAA", "BBB", 780, 840)];
        let shifts = vec![Shift::morning("S1")
            .with_bounds(360, 720)
            .with_trip(trips[0].clone())];
        let outcome = ShiftAssigner::new(config()).assign(&trips, &shifts).unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.statistics.status, SolveStatus::Infeasible);
        assert!(outcome.shifts.is_empty());
        assert!(outcome.unassigned.is_empty());
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let cfg = config().with_shift_duration(600, 60);
        let err = ShiftAssigner::new(cfg).assign(&two_runs(), &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let cfg = config().with_time_limit_secs(1e20);
        let err = ShiftAssigner::new(cfg).assign(&two_runs(), &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_enumerate_lists_both_branches() {
        let set = ShiftAssigner::new(config()).enumerate(&fork(), &[]).unwrap();
        assert_eq!(set.len(), 2);
        for solution in &set.solutions {
            assert_eq!(solution.covered(), 2);
            assert_eq!(solution.orphans.len(), 1);
            assert_eq!(solution.shifts[0].bucket, ShiftBucket::Morning);
        }
        assert_ne!(set.solutions[0].signature(), set.solutions[1].signature());
    }

    #[test]
    fn test_enumerate_slack_admits_partial_cover() {
        let strict = ShiftAssigner::new(config()).enumerate(&two_runs(), &[]).unwrap();
        assert_eq!(strict.len(), 1);
        assert_eq!(strict.best().unwrap().covered(), 4);

        let loose = ShiftAssigner::new(config().with_coverage_slack(2))
            .enumerate(&two_runs(), &[])
            .unwrap();
        assert_eq!(loose.len(), 3);
        // Full cover ranks first.
        assert_eq!(loose.best().unwrap().covered(), 4);
        assert!(loose.solutions.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_enumerate_caps_alternatives() {
        let set = ShiftAssigner::new(config().with_coverage_slack(4).with_max_alternatives(2))
            .enumerate(&two_runs(), &[])
            .unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_enumerate_is_deterministic() {
        let assigner = ShiftAssigner::new(config().with_coverage_slack(2));
        let a = assigner.enumerate(&two_runs(), &[]).unwrap();
        let b = assigner.enumerate(&two_runs(), &[]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_randomized_dedups() {
        let set = ShiftAssigner::new(config().with_randomized_attempts(10))
            .randomized(&two_runs(), &[])
            .unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.best().unwrap().covered(), 4);
    }

    #[test]
    fn test_randomized_independent_of_workers() {
        let base = config().with_randomized_attempts(12).with_seed(7);
        let serial = ShiftAssigner::new(base.clone().with_workers(1))
            .randomized(&fork(), &[])
            .unwrap();
        let parallel = ShiftAssigner::new(base.with_workers(4))
            .randomized(&fork(), &[])
            .unwrap();
        assert_eq!(serial, parallel);
        assert!(!serial.is_empty());
        assert!(serial.solutions.iter().all(|s| s.covered() == 2));
    }

    #[test]
    fn test_alternatives_auto_enumerates_small_sets() {
        let assigner = ShiftAssigner::new(config());
        let auto = assigner
            .alternatives(&fork(), &[], AlternativeStrategy::Auto)
            .unwrap();
        let enumerated = assigner.enumerate(&fork(), &[]).unwrap();
        assert_eq!(auto, enumerated);
    }

    #[test]
    fn test_pool_excludes_held_trips() {
        let trips = two_runs();
        let shifts = vec![
            Shift::morning("S1").with_trip(trips[0].clone()).with_trip(trips[1].clone()),
            Shift::afternoon("S2"),
        ];
        let set = ShiftAssigner::new(config()).enumerate(&trips, &shifts).unwrap();
        let best = set.best().unwrap();
        assert_eq!(best.shifts.len(), 1);
        assert_eq!(best.shifts[0].trips, vec![2, 3]);
        assert_eq!(best.shifts[0].bucket, ShiftBucket::Afternoon);
    }

    #[test]
    fn test_assign_proves_six_parallel_duties() {
        // Six duties of six trips each, all running at the same hours on
        // their own pair of stops: one duty per shift is the only packing.
        let mut trips = Vec::new();
        for duty in 0..6u8 {
            let there = char::from(b'A' + 2 * duty).to_string().repeat(3);
            let back = char::from(b'B' + 2 * duty).to_string().repeat(3);
            for k in 0..6 {
                let start = 300 + 70 * k;
                let (from, to) = if k % 2 == 0 { (&there, &back) } else { (&back, &there) };
                trips.push(trip(&format!("{duty}-{k}"), from, to, start, start + 60));
            }
        }
        let shifts: Vec<Shift> = (0..6).map(|i| Shift::morning(format!("S{i}"))).collect();
        let outcome = ShiftAssigner::new(config().with_time_limit_secs(30.0))
            .assign(&trips, &shifts)
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.statistics.status, SolveStatus::Optimal);
        assert_eq!(outcome.statistics.assigned, 36);
        assert!(outcome.unassigned.is_empty());
        assert!(outcome.shifts.iter().all(|s| s.trips.len() == 6));
    }

    #[test]
    fn test_rank_rejects_inconsistent_candidate() {
        // t1 and t2 overlap, so no model should ever pack them together.
        let bad = Solution::new(
            vec![ProposedShift {
                bucket: ShiftBucket::Morning,
                trips: vec![1, 2],
            }],
            vec![0],
        );
        let err = ShiftAssigner::new(config())
            .rank(&fork(), vec![bad])
            .unwrap_err();
        assert!(matches!(err, Error::ModelInconsistency { .. }));
    }

    #[test]
    fn test_enumerate_with_spent_budget_returns() {
        let assigner = ShiftAssigner::new(config().with_time_limit_secs(1e-9));
        let set = assigner.enumerate(&two_runs(), &[]).unwrap();
        assert!(set.len() <= 1);
    }
}
