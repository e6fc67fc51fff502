//! Chain generation.
//!
//! Enumerates trip sequences that could legally form one shift's content.
//! These feed the chain-selection model used for ranked alternatives.
//!
//! # Algorithm
//!
//! **Depth-first** (default): seed a chain with every trip, then repeatedly
//! append any unused trip that can directly follow the current last trip
//! (stop chain or dead-head, rest within bounds), never exceeding the
//! per-shift dead-head cap or `max_chain_len`. A chain of two or more
//! trips whose amplitude lies in `[min_shift_duration, max_shift_duration]`
//! is kept.
//!
//! **Brute force**: every subset of two or more trips, checked with the
//! same consecutive rules after sorting by start. Exponential; the pool is
//! capped at [`BRUTE_FORCE_MAX_POOL`] trips, beyond which the generator
//! falls back to depth-first search.
//!
//! Output is deduplicated by sorted trip set and ordered by start time,
//! longer chains first on ties.
//!
//! # Complexity
//! Depth-first is O(n^L) in the worst case for chain length L; the total
//! is capped at [`MAX_CHAINS`].

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::compatibility::Compatibility;
use crate::config::{AssignmentConfig, ChainSearch};
use crate::models::{Chain, Trip};

/// Largest pool accepted by brute-force enumeration.
pub const BRUTE_FORCE_MAX_POOL: usize = 20;

/// Upper bound on generated chains.
pub const MAX_CHAINS: usize = 200_000;

/// Generates candidate chains over a trip list.
#[derive(Debug, Clone)]
pub struct ChainGenerator<'a> {
    trips: &'a [Trip],
    config: &'a AssignmentConfig,
    rules: Compatibility<'a>,
}

impl<'a> ChainGenerator<'a> {
    /// Creates a generator.
    pub fn new(trips: &'a [Trip], config: &'a AssignmentConfig) -> Self {
        Self {
            trips,
            config,
            rules: Compatibility::new(config),
        }
    }

    /// Generates chains over every trip.
    pub fn generate_all(&self) -> Vec<Chain> {
        let pool: Vec<usize> = (0..self.trips.len()).collect();
        self.generate(&pool)
    }

    /// Generates chains over the given trip indices.
    pub fn generate(&self, pool: &[usize]) -> Vec<Chain> {
        let mut ordered: Vec<usize> = pool.to_vec();
        ordered.sort_by_key(|&i| (self.trips[i].start, self.trips[i].end, i));
        ordered.dedup();

        let mut chains = match self.config.chain_search {
            ChainSearch::BruteForce if ordered.len() <= BRUTE_FORCE_MAX_POOL => {
                self.brute_force(&ordered)
            }
            ChainSearch::BruteForce => {
                warn!(
                    pool = ordered.len(),
                    limit = BRUTE_FORCE_MAX_POOL,
                    "pool too large for brute-force chain search, using depth-first"
                );
                self.depth_first(&ordered)
            }
            ChainSearch::Dfs => self.depth_first(&ordered),
        };

        chains.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then(b.len().cmp(&a.len()))
                .then_with(|| a.trips.cmp(&b.trips))
        });
        debug!(pool = ordered.len(), chains = chains.len(), "chains generated");
        chains
    }

    fn depth_first(&self, ordered: &[usize]) -> Vec<Chain> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut used = vec![false; self.trips.len()];
        let mut path = Vec::with_capacity(self.config.max_chain_len);

        for (pos, &seed) in ordered.iter().enumerate() {
            path.push(seed);
            used[seed] = true;
            self.extend(ordered, pos, &mut path, &mut used, 0, &mut seen, &mut out);
            used[seed] = false;
            path.pop();
            if out.len() >= MAX_CHAINS {
                warn!(limit = MAX_CHAINS, "chain limit reached, output truncated");
                break;
            }
        }
        out
    }

    #[allow(clippy::too_many_arguments)]
    fn extend(
        &self,
        ordered: &[usize],
        last_pos: usize,
        path: &mut Vec<usize>,
        used: &mut [bool],
        dead_heads: usize,
        seen: &mut HashSet<Vec<usize>>,
        out: &mut Vec<Chain>,
    ) {
        if path.len() >= self.config.max_chain_len || out.len() >= MAX_CHAINS {
            return;
        }
        let Some(&last) = path.last() else {
            return;
        };
        let first_start = self.trips[path[0]].start;

        for (pos, &next) in ordered.iter().enumerate().skip(last_pos + 1) {
            if used[next] {
                continue;
            }
            let Ok(connection) = self.rules.connect(&self.trips[last], &self.trips[next]) else {
                continue;
            };
            let dead_heads = dead_heads + usize::from(connection.link.is_dead_head());
            if dead_heads > self.config.dead_heads.max_per_shift {
                continue;
            }
            let amplitude = self.trips[next].end - first_start;
            if amplitude > self.config.max_shift_duration {
                continue;
            }

            path.push(next);
            used[next] = true;
            if amplitude >= self.config.min_shift_duration {
                self.keep(path, dead_heads, seen, out);
            }
            self.extend(ordered, pos, path, used, dead_heads, seen, out);
            used[next] = false;
            path.pop();
        }
    }

    fn brute_force(&self, ordered: &[usize]) -> Vec<Chain> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let n = ordered.len();

        for mask in 1u32..(1u32 << n) {
            if mask.count_ones() < 2 {
                continue;
            }
            // `ordered` is time-sorted, so bit order is time order.
            let subset: Vec<usize> = (0..n)
                .filter(|bit| mask & (1 << bit) != 0)
                .map(|bit| ordered[bit])
                .collect();
            if let Some(dead_heads) = self.check_sequence(&subset) {
                self.keep(&subset, dead_heads, &mut seen, &mut out);
            }
            if out.len() >= MAX_CHAINS {
                warn!(limit = MAX_CHAINS, "chain limit reached, output truncated");
                break;
            }
        }
        out
    }

    /// Strict check of a time-ordered sequence. Returns dead-heads used.
    pub fn check_sequence(&self, sequence: &[usize]) -> Option<usize> {
        let (&first, &last) = (sequence.first()?, sequence.last()?);
        let amplitude = self.trips[last].end - self.trips[first].start;
        if amplitude < self.config.min_shift_duration || amplitude > self.config.max_shift_duration {
            return None;
        }
        let mut dead_heads = 0;
        for pair in sequence.windows(2) {
            let connection = self
                .rules
                .connect(&self.trips[pair[0]], &self.trips[pair[1]])
                .ok()?;
            dead_heads += usize::from(connection.link.is_dead_head());
        }
        (dead_heads <= self.config.dead_heads.max_per_shift).then_some(dead_heads)
    }

    fn keep(
        &self,
        path: &[usize],
        dead_heads: usize,
        seen: &mut HashSet<Vec<usize>>,
        out: &mut Vec<Chain>,
    ) {
        let mut key = path.to_vec();
        key.sort_unstable();
        if !seen.insert(key) {
            return;
        }
        out.push(Chain {
            trips: path.to_vec(),
            start: self.trips[path[0]].start,
            end: self.trips[path[path.len() - 1]].end,
            dead_heads,
        });
    }
}
