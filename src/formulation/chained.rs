//! Chain-selection formulation.
//!
//! One boolean `y[c]` per candidate chain: "chain `c` becomes a shift".
//! Works on the unassigned pool only; trips already held by a shift stay
//! where they are.
//!
//! # Constraints
//!
//! - Each pool trip is covered by at most one selected chain.
//! - Slot limits: morning chains at most the empty morning and split
//!   shifts, afternoon chains at most the empty afternoon and split
//!   shifts, all chains at most the empty shifts. They apply only when
//!   empty shift records are given.
//! - At most `max_new_shifts` chains, when set.
//!
//! # Objective (maximize)
//!
//! Sum of per-trip weights over selected chains. Uniform weights maximize
//! coverage; [`ChainModelBuilder::jittered_weights`] adds a seeded
//! tie-break for randomized re-solves.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::chains::ChainGenerator;
use crate::config::AssignmentConfig;
use crate::cp::{CpModel, CpSolution, VarId};
use crate::models::{Chain, ProposedShift, Shift, ShiftBucket, ShiftKind, Solution, Trip};
use crate::validation::locked_trip_indices;

/// Per-bucket caps on selected chains. `None` = unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotLimits {
    /// Morning chains.
    pub morning: Option<usize>,
    /// Afternoon chains.
    pub afternoon: Option<usize>,
    /// All chains.
    pub total: Option<usize>,
}

impl SlotLimits {
    /// Limits from the empty shift records and the optional cap.
    pub fn from_shifts(shifts: &[Shift], max_new_shifts: Option<usize>) -> Self {
        let empty: Vec<&Shift> = shifts.iter().filter(|s| s.is_empty()).collect();
        let mut limits = SlotLimits {
            total: max_new_shifts,
            ..SlotLimits::default()
        };
        if empty.is_empty() {
            return limits;
        }
        let count = |kinds: &[ShiftKind]| empty.iter().filter(|s| kinds.contains(&s.kind)).count();
        limits.morning = Some(count(&[ShiftKind::Morning, ShiftKind::Split]));
        limits.afternoon = Some(count(&[ShiftKind::Afternoon, ShiftKind::Split]));
        limits.total = Some(limits.total.map_or(empty.len(), |cap| cap.min(empty.len())));
        limits
    }
}

/// A built chain model with its variable map.
#[derive(Debug, Clone)]
pub struct ChainModel {
    /// The boolean model.
    pub model: CpModel,
    /// `select[c]` for `chains[c]`.
    pub select: Vec<VarId>,
    /// Trip indices per chain, time order.
    pub chains: Vec<Chain>,
    /// Pool trip indices, ascending.
    pub pool: Vec<usize>,
}

impl ChainModel {
    /// Coverage expression `Σ |c| · y[c]`.
    pub fn coverage_terms(&self) -> Vec<(VarId, i64)> {
        self.select
            .iter()
            .zip(&self.chains)
            .map(|(&y, c)| (y, c.len() as i64))
            .collect()
    }

    /// Requires at least `min_covered` pool trips to be covered.
    pub fn require_coverage(&mut self, min_covered: usize) {
        let terms = self.coverage_terms();
        let min_covered = i64::try_from(min_covered).unwrap_or(i64::MAX);
        self.model.add_linear_ge(&terms, min_covered);
    }

    /// Turns a solver assignment into an unscored [`Solution`].
    pub fn decode(&self, solution: &CpSolution, afternoon_start: i32) -> Solution {
        let mut covered = vec![false; self.pool.iter().max().map_or(0, |&m| m + 1)];
        let mut shifts = Vec::new();
        for (c, chain) in self.chains.iter().enumerate() {
            if !solution.value(self.select[c]) {
                continue;
            }
            for &t in &chain.trips {
                covered[t] = true;
            }
            shifts.push(ProposedShift {
                bucket: ShiftBucket::for_start(chain.start, afternoon_start),
                trips: chain.trips.clone(),
            });
        }
        let orphans = self.pool.iter().copied().filter(|&t| !covered[t]).collect();
        Solution::new(shifts, orphans)
    }
}

/// Builds chain-selection models over the unassigned pool.
#[derive(Debug, Clone)]
pub struct ChainModelBuilder<'a> {
    trips: &'a [Trip],
    config: &'a AssignmentConfig,
    pool: Vec<usize>,
    chains: Vec<Chain>,
    limits: SlotLimits,
}

impl<'a> ChainModelBuilder<'a> {
    /// Collects the pool and generates its chains.
    pub fn new(trips: &'a [Trip], shifts: &[Shift], config: &'a AssignmentConfig) -> Self {
        let mut locked = vec![false; trips.len()];
        for &t in locked_trip_indices(trips, shifts).iter().flatten() {
            locked[t] = true;
        }
        let pool: Vec<usize> = (0..trips.len()).filter(|&t| !locked[t]).collect();
        let chains = ChainGenerator::new(trips, config).generate(&pool);
        Self {
            trips,
            config,
            pool,
            chains,
            limits: SlotLimits::from_shifts(shifts, config.max_new_shifts),
        }
    }

    /// Candidate chains, generator order.
    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    /// Unassigned trip indices.
    pub fn pool(&self) -> &[usize] {
        &self.pool
    }

    /// Slot limits in force.
    pub fn limits(&self) -> SlotLimits {
        self.limits
    }

    /// `objective.trip` for every trip.
    pub fn uniform_weights(&self) -> Vec<i64> {
        vec![self.config.objective.trip; self.trips.len()]
    }

    /// Uniform weights plus a seeded bonus in `[0, tie_break_jitter)`.
    pub fn jittered_weights(&self, seed: u64) -> Vec<i64> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let jitter = self.config.tie_break_jitter;
        self.uniform_weights()
            .into_iter()
            .map(|w| {
                if jitter > 0 {
                    w + rng.random_range(0..jitter)
                } else {
                    w
                }
            })
            .collect()
    }

    /// Builds a fresh model with per-trip `weights`.
    pub fn build(&self, weights: &[i64]) -> ChainModel {
        let mut model = CpModel::new("chains");
        let select: Vec<VarId> = (0..self.chains.len())
            .map(|c| model.new_var(format!("y[{c}]")))
            .collect();

        let mut covering: Vec<Vec<VarId>> = vec![Vec::new(); self.trips.len()];
        for (chain, &y) in self.chains.iter().zip(&select) {
            for &t in &chain.trips {
                covering[t].push(y);
            }
            let weight: i64 = chain.trips.iter().map(|&t| weights[t]).sum();
            model.add_objective_term(y, weight);
        }
        for vars in &covering {
            model.add_at_most_one(vars);
        }

        let bucket_vars = |bucket: ShiftBucket| -> Vec<VarId> {
            self.chains
                .iter()
                .zip(&select)
                .filter(|(c, _)| ShiftBucket::for_start(c.start, self.config.afternoon_start) == bucket)
                .map(|(_, &y)| y)
                .collect()
        };
        let as_bound = |limit: usize| i64::try_from(limit).unwrap_or(i64::MAX);
        if let Some(limit) = self.limits.morning {
            model.add_at_most(&bucket_vars(ShiftBucket::Morning), as_bound(limit));
        }
        if let Some(limit) = self.limits.afternoon {
            model.add_at_most(&bucket_vars(ShiftBucket::Afternoon), as_bound(limit));
        }
        if let Some(limit) = self.limits.total {
            model.add_at_most(&select, as_bound(limit));
        }

        debug!(
            pool = self.pool.len(),
            chains = self.chains.len(),
            constraints = model.constraint_count(),
            "chain model built"
        );

        ChainModel {
            model,
            select,
            chains: self.chains.clone(),
            pool: self.pool.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::{CpSolver, SolverConfig};

    fn trip(id: &str, from: &str, to: &str, start: i32, end: i32) -> Trip {
        Trip::new("L1", id, from, to, start, end)
    }

    fn config() -> AssignmentConfig {
        AssignmentConfig::new()
            .with_min_rest(5, 15)
            .with_max_rest(Some(60))
            .with_shift_duration(60, 600)
    }

    /// Two independent two-trip runs, one morning and one afternoon.
    fn two_runs() -> Vec<Trip> {
        vec![
            trip("m1", "AAA", "BBB", 360, 420),
            trip("m2", "BBB", "AAA", 430, 490),
            trip("a1", "CCC", "DDD", 780, 840),
            trip("a2", "DDD", "CCC", 850, 910),
        ]
    }

    fn solve(built: &ChainModel) -> CpSolution {
        CpSolver::new(SolverConfig::default())
            .solve(&built.model)
            .solution()
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_covers_both_runs() {
        let trips = two_runs();
        let cfg = config();
        let builder = ChainModelBuilder::new(&trips, &[], &cfg);
        assert_eq!(builder.chains().len(), 2);
        let built = builder.build(&builder.uniform_weights());
        let solution = built.decode(&solve(&built), cfg.afternoon_start);
        assert!(solution.orphans.is_empty());
        assert_eq!(solution.shifts_in(ShiftBucket::Morning).count(), 1);
        assert_eq!(solution.shifts_in(ShiftBucket::Afternoon).count(), 1);
    }

    #[test]
    fn test_locked_trips_leave_the_pool() {
        let trips = two_runs();
        let shifts = vec![Shift::morning("S1").with_trip(trips[0].clone())];
        let cfg = config();
        let builder = ChainModelBuilder::new(&trips, &shifts, &cfg);
        assert_eq!(builder.pool(), &[1, 2, 3]);
        assert!(builder.chains().iter().all(|c| !c.contains(0)));
    }

    #[test]
    fn test_slot_limits_from_shifts() {
        let shifts = vec![
            Shift::morning("M1"),
            Shift::afternoon("A1"),
            Shift::afternoon("A2"),
            Shift::split("S1", crate::models::TimeWindow::new(600, 700)),
            Shift::morning("busy").with_trip(trip("x", "A", "B", 0, 10)),
        ];
        let limits = SlotLimits::from_shifts(&shifts, Some(3));
        assert_eq!(limits.morning, Some(2));
        assert_eq!(limits.afternoon, Some(3));
        assert_eq!(limits.total, Some(3));
        assert_eq!(SlotLimits::from_shifts(&[], None), SlotLimits::default());
    }

    #[test]
    fn test_morning_slot_limit_orphans_run() {
        let trips = two_runs();
        let shifts = vec![Shift::morning("M1")];
        let cfg = config();
        let builder = ChainModelBuilder::new(&trips, &shifts, &cfg);
        let built = builder.build(&builder.uniform_weights());
        let solution = built.decode(&solve(&built), cfg.afternoon_start);
        assert_eq!(solution.shifts.len(), 1);
        assert_eq!(solution.shifts[0].bucket, ShiftBucket::Morning);
        assert_eq!(solution.orphans, vec![2, 3]);
    }

    #[test]
    fn test_max_new_shifts() {
        let trips = two_runs();
        let cfg = config().with_max_new_shifts(1);
        let builder = ChainModelBuilder::new(&trips, &[], &cfg);
        let built = builder.build(&builder.uniform_weights());
        let solution = built.decode(&solve(&built), cfg.afternoon_start);
        assert_eq!(solution.shifts.len(), 1);
        assert_eq!(solution.orphans.len(), 2);
    }

    #[test]
    fn test_require_coverage() {
        let trips = two_runs();
        let cfg = config();
        let builder = ChainModelBuilder::new(&trips, &[], &cfg);
        let mut built = builder.build(&builder.uniform_weights());
        built.require_coverage(4);
        let mut found = Vec::new();
        CpSolver::new(SolverConfig::default()).enumerate(&built.model, &mut found);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_jitter_is_seeded() {
        let trips = two_runs();
        let cfg = config();
        let builder = ChainModelBuilder::new(&trips, &[], &cfg);
        assert_eq!(builder.jittered_weights(3), builder.jittered_weights(3));
        assert!(builder
            .jittered_weights(3)
            .iter()
            .all(|&w| (100..110).contains(&w)));
    }
}
