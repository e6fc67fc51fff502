//! Assignment configuration.
//!
//! One plain struct carries every tunable: rest bounds, shift durations,
//! the dead-head table, solver budgets and objective weights. It is
//! `serde`-friendly so collaborators can load it from any format, and
//! [`AssignmentConfig::validate`] rejects nonsense before any model is built.
//!
//! All durations are in minutes unless the field name says otherwise.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::{DeadHead, DeadHeadTable, Minutes, DEFAULT_STOP_PREFIX_LEN, MINUTES_PER_DAY};

/// Largest accepted `time_limit_secs`: one day.
pub const MAX_TIME_LIMIT_SECS: f64 = 86_400.0;

/// How a rest longer than `max_rest` between two trips is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaxRestPolicy {
    /// The two trips may share a shift only if a trip in between is also
    /// assigned to it. Consecutive trips therefore never exceed the bound.
    #[default]
    RequireIntermediate,
    /// Any two trips of a shift, consecutive or not, must be separated by
    /// at most `max_rest`.
    Forbid,
    /// No upper bound on rest.
    Ignore,
}

/// Bound on trips per shift around the mean load.
///
/// With `n` trips and `s` shifts the target is `ceil(n / s)`; every shift
/// must end up holding between `target - below` and `target + above`
/// trips (pre-existing trips included, lower end clamped at zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FairnessBand {
    /// Allowed shortfall below the target.
    pub below: usize,
    /// Allowed excess above the target.
    pub above: usize,
}

impl FairnessBand {
    /// Creates a band.
    pub fn new(below: usize, above: usize) -> Self {
        Self { below, above }
    }

    /// `(min, max)` trips per shift for `trips` over `shifts`.
    pub fn limits(&self, trips: usize, shifts: usize) -> (usize, usize) {
        if shifts == 0 {
            return (0, usize::MAX);
        }
        let target = trips.div_ceil(shifts);
        (target.saturating_sub(self.below), target + self.above)
    }
}

/// How the chain generator explores trip sequences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainSearch {
    /// Depth-first extension from every trip.
    #[default]
    Dfs,
    /// Every subset of size >= 2. Exponential; small inputs only.
    BruteForce,
}

/// Objective weights for the direct trip→shift model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveWeights {
    /// Reward per assigned trip.
    pub trip: i64,
    /// Maximum bonus for a trip touching its shift's declared boundary.
    pub boundary: i64,
    /// Bonus for a new trip that stop-chains with a pre-existing trip of
    /// the same shift.
    pub continuity: i64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            trip: 100,
            boundary: 20,
            continuity: 10,
        }
    }
}

/// Scoring weights for ranked alternatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Points per covered trip.
    pub per_trip: i64,
    /// Flat bonus when no trip is orphaned.
    pub no_orphans: i64,
    /// Bonus per shift whose amplitude is within tolerance of the target.
    pub on_target_shift: i64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            per_trip: 10,
            no_orphans: 50,
            on_target_shift: 5,
        }
    }
}

/// Every recognized option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentConfig {
    /// Minimum rest when consecutive trips chain by stop code.
    pub min_rest_same_stop: Minutes,
    /// Minimum rest when they do not (dead-head or unchecked geography).
    pub min_rest_other_stop: Minutes,
    /// Maximum rest between consecutive trips. `None` = unbounded.
    pub max_rest: Option<Minutes>,
    /// Treatment of rests above `max_rest`.
    pub max_rest_policy: MaxRestPolicy,
    /// Shortest acceptable chain amplitude.
    pub min_shift_duration: Minutes,
    /// Longest acceptable chain amplitude.
    pub max_shift_duration: Minutes,
    /// Amplitude the scoring rewards.
    pub target_shift_duration: Minutes,
    /// Allowed deviation from the target amplitude.
    pub shift_duration_tolerance: Minutes,
    /// Known dead-head moves and the per-shift cap.
    pub dead_heads: DeadHeadTable,
    /// Whether consecutive trips must chain by stop (or dead-head).
    pub enforce_geography: bool,
    /// Characters compared between stop codes.
    pub stop_prefix_len: usize,
    /// Wall-clock budget per solve, in seconds, at most
    /// [`MAX_TIME_LIMIT_SECS`].
    pub time_limit_secs: f64,
    /// Maximum alternatives returned in multi-solution mode.
    pub max_alternatives: usize,
    /// Worker threads for randomized re-solves.
    pub workers: usize,
    /// Base random seed.
    pub seed: u64,
    /// Longest chain the generator builds.
    pub max_chain_len: usize,
    /// Chain exploration strategy.
    pub chain_search: ChainSearch,
    /// Cap on the number of proposed shifts. `None` = only slot limits.
    pub max_new_shifts: Option<usize>,
    /// Coverage shortfall (in trips) tolerated by enumeration.
    pub coverage_slack: usize,
    /// Independent randomized re-solves.
    pub randomized_attempts: usize,
    /// Upper bound (exclusive) of the random per-trip tie-break bonus.
    pub tie_break_jitter: i64,
    /// Optional per-shift load band.
    pub fairness: Option<FairnessBand>,
    /// Chains starting at or after this minute are afternoon shifts.
    pub afternoon_start: Minutes,
    /// Objective weights for the direct model.
    pub objective: ObjectiveWeights,
    /// Scoring weights for ranked alternatives.
    pub score: ScoreWeights,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            min_rest_same_stop: 5,
            min_rest_other_stop: 15,
            max_rest: Some(60),
            max_rest_policy: MaxRestPolicy::RequireIntermediate,
            min_shift_duration: 60,
            max_shift_duration: 600,
            target_shift_duration: 420,
            shift_duration_tolerance: 60,
            dead_heads: DeadHeadTable::default(),
            enforce_geography: true,
            stop_prefix_len: DEFAULT_STOP_PREFIX_LEN,
            time_limit_secs: 10.0,
            max_alternatives: 10,
            workers: 1,
            seed: 0,
            max_chain_len: 8,
            chain_search: ChainSearch::Dfs,
            max_new_shifts: None,
            coverage_slack: 0,
            randomized_attempts: 20,
            tie_break_jitter: 10,
            fairness: None,
            afternoon_start: 12 * 60,
            objective: ObjectiveWeights::default(),
            score: ScoreWeights::default(),
        }
    }
}

/// A configuration value that cannot be used.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A duration option is negative.
    #[error("option `{option}` must not be negative (got {value})")]
    Negative { option: &'static str, value: i64 },
    /// A lower bound exceeds its upper bound.
    #[error("option `{lower}` ({lower_value}) exceeds `{upper}` ({upper_value})")]
    InvertedBounds {
        lower: &'static str,
        lower_value: i64,
        upper: &'static str,
        upper_value: i64,
    },
    /// A value outside its meaningful range.
    #[error("option `{option}` is out of range: {reason}")]
    OutOfRange {
        option: &'static str,
        reason: String,
    },
}

impl AssignmentConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets both minimum rests.
    pub fn with_min_rest(mut self, same_stop: Minutes, other_stop: Minutes) -> Self {
        self.min_rest_same_stop = same_stop;
        self.min_rest_other_stop = other_stop;
        self
    }

    /// Sets the maximum rest (`None` = unbounded).
    pub fn with_max_rest(mut self, max_rest: Option<Minutes>) -> Self {
        self.max_rest = max_rest;
        self
    }

    /// Sets the max-rest policy.
    pub fn with_max_rest_policy(mut self, policy: MaxRestPolicy) -> Self {
        self.max_rest_policy = policy;
        self
    }

    /// Sets the chain amplitude window.
    pub fn with_shift_duration(mut self, min: Minutes, max: Minutes) -> Self {
        self.min_shift_duration = min;
        self.max_shift_duration = max;
        self
    }

    /// Sets the scoring target amplitude and tolerance.
    pub fn with_target_duration(mut self, target: Minutes, tolerance: Minutes) -> Self {
        self.target_shift_duration = target;
        self.shift_duration_tolerance = tolerance;
        self
    }

    /// Replaces the dead-head table.
    pub fn with_dead_heads(mut self, table: DeadHeadTable) -> Self {
        self.dead_heads = table;
        self
    }

    /// Adds one dead-head link.
    pub fn with_dead_head(mut self, link: DeadHead) -> Self {
        self.dead_heads.links.push(link);
        self
    }

    /// Turns stop-compatibility checks on or off.
    pub fn with_geography(mut self, enforce: bool) -> Self {
        self.enforce_geography = enforce;
        self
    }

    /// Sets the stop prefix length.
    pub fn with_stop_prefix_len(mut self, len: usize) -> Self {
        self.stop_prefix_len = len;
        self
    }

    /// Sets the per-solve time budget in seconds.
    pub fn with_time_limit_secs(mut self, secs: f64) -> Self {
        self.time_limit_secs = secs;
        self
    }

    /// Sets the maximum number of alternatives.
    pub fn with_max_alternatives(mut self, max: usize) -> Self {
        self.max_alternatives = max;
        self
    }

    /// Sets the worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the chain length cap.
    pub fn with_max_chain_len(mut self, len: usize) -> Self {
        self.max_chain_len = len;
        self
    }

    /// Sets the chain exploration strategy.
    pub fn with_chain_search(mut self, search: ChainSearch) -> Self {
        self.chain_search = search;
        self
    }

    /// Caps the number of proposed shifts.
    pub fn with_max_new_shifts(mut self, max: usize) -> Self {
        self.max_new_shifts = Some(max);
        self
    }

    /// Sets the enumeration coverage slack.
    pub fn with_coverage_slack(mut self, slack: usize) -> Self {
        self.coverage_slack = slack;
        self
    }

    /// Sets the number of randomized re-solves.
    pub fn with_randomized_attempts(mut self, attempts: usize) -> Self {
        self.randomized_attempts = attempts;
        self
    }

    /// Enables the fairness band.
    pub fn with_fairness(mut self, band: FairnessBand) -> Self {
        self.fairness = Some(band);
        self
    }

    /// Sets objective weights.
    pub fn with_objective(mut self, weights: ObjectiveWeights) -> Self {
        self.objective = weights;
        self
    }

    /// Sets scoring weights.
    pub fn with_score(mut self, weights: ScoreWeights) -> Self {
        self.score = weights;
        self
    }

    /// Solver time budget, clamped to `0..=MAX_TIME_LIMIT_SECS`.
    pub fn time_limit(&self) -> Duration {
        let secs = if self.time_limit_secs.is_nan() {
            0.0
        } else {
            self.time_limit_secs.clamp(0.0, MAX_TIME_LIMIT_SECS)
        };
        Duration::from_secs_f64(secs)
    }

    /// Upper rest bound in force for consecutive trips, if any.
    pub fn effective_max_rest(&self) -> Option<Minutes> {
        match self.max_rest_policy {
            MaxRestPolicy::Ignore => None,
            _ => self.max_rest,
        }
    }

    /// Checks every option.
    ///
    /// Fails on the first bad option, naming it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations: [(&'static str, Minutes); 6] = [
            ("min_rest_same_stop", self.min_rest_same_stop),
            ("min_rest_other_stop", self.min_rest_other_stop),
            ("min_shift_duration", self.min_shift_duration),
            ("max_shift_duration", self.max_shift_duration),
            ("target_shift_duration", self.target_shift_duration),
            ("shift_duration_tolerance", self.shift_duration_tolerance),
        ];
        for (option, value) in durations {
            if value < 0 {
                return Err(ConfigError::Negative {
                    option,
                    value: value.into(),
                });
            }
        }

        if let Some(max_rest) = self.max_rest {
            if max_rest < 0 {
                return Err(ConfigError::Negative {
                    option: "max_rest",
                    value: max_rest.into(),
                });
            }
            let min_rest = self.min_rest_same_stop.min(self.min_rest_other_stop);
            if min_rest > max_rest {
                return Err(ConfigError::InvertedBounds {
                    lower: "min_rest_same_stop",
                    lower_value: min_rest.into(),
                    upper: "max_rest",
                    upper_value: max_rest.into(),
                });
            }
        }

        if self.min_shift_duration > self.max_shift_duration {
            return Err(ConfigError::InvertedBounds {
                lower: "min_shift_duration",
                lower_value: self.min_shift_duration.into(),
                upper: "max_shift_duration",
                upper_value: self.max_shift_duration.into(),
            });
        }
        if self.max_shift_duration > MINUTES_PER_DAY {
            return Err(ConfigError::OutOfRange {
                option: "max_shift_duration",
                reason: format!("{} exceeds one day", self.max_shift_duration),
            });
        }

        for link in &self.dead_heads.links {
            if link.duration < 0 {
                return Err(ConfigError::Negative {
                    option: "dead_heads.duration",
                    value: link.duration.into(),
                });
            }
            if link.from.trim().is_empty() || link.to.trim().is_empty() {
                return Err(ConfigError::OutOfRange {
                    option: "dead_heads",
                    reason: "dead-head endpoints must not be blank".to_string(),
                });
            }
        }

        if self.stop_prefix_len == 0 {
            return Err(ConfigError::OutOfRange {
                option: "stop_prefix_len",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.time_limit_secs.is_finite() || self.time_limit_secs <= 0.0 {
            return Err(ConfigError::OutOfRange {
                option: "time_limit_secs",
                reason: format!("{} is not a positive number of seconds", self.time_limit_secs),
            });
        }
        if self.time_limit_secs > MAX_TIME_LIMIT_SECS {
            return Err(ConfigError::OutOfRange {
                option: "time_limit_secs",
                reason: format!(
                    "{} exceeds the {MAX_TIME_LIMIT_SECS} second ceiling",
                    self.time_limit_secs
                ),
            });
        }
        if self.max_alternatives == 0 {
            return Err(ConfigError::OutOfRange {
                option: "max_alternatives",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.workers == 0 {
            return Err(ConfigError::OutOfRange {
                option: "workers",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_chain_len < 2 {
            return Err(ConfigError::OutOfRange {
                option: "max_chain_len",
                reason: "a chain needs at least 2 trips".to_string(),
            });
        }
        if self.tie_break_jitter < 0 {
            return Err(ConfigError::Negative {
                option: "tie_break_jitter",
                value: self.tie_break_jitter,
            });
        }
        if !(0..=MINUTES_PER_DAY).contains(&self.afternoon_start) {
            return Err(ConfigError::OutOfRange {
                option: "afternoon_start",
                reason: format!("{} is not within one day", self.afternoon_start),
            });
        }
        if self.objective.trip < 0 || self.objective.boundary < 0 || self.objective.continuity < 0 {
            return Err(ConfigError::OutOfRange {
                option: "objective",
                reason: "weights must not be negative".to_string(),
            });
        }

        Ok(())
    }
}
