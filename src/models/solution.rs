//! Solution models.
//!
//! Two shapes of output:
//! - [`Solution`]: one alternative from the chain-based search, a partition
//!   of the trip pool into proposed shifts ("matin"/"apres_midi") plus
//!   orphans and a score.
//! - [`SolutionSet`]: ranked alternatives with an optional selection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::window::Minutes;
use super::{ShiftKind, Trip};

/// Shift bucket a proposed shift is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShiftBucket {
    /// "matin"
    Morning,
    /// "apres_midi"
    Afternoon,
}

impl ShiftBucket {
    /// Bucket for a shift starting at `start`.
    pub fn for_start(start: Minutes, afternoon_start: Minutes) -> Self {
        if start < afternoon_start {
            ShiftBucket::Morning
        } else {
            ShiftBucket::Afternoon
        }
    }

    /// Operator-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            ShiftBucket::Morning => "matin",
            ShiftBucket::Afternoon => "apres_midi",
        }
    }

    /// Shift kind used when a proposed shift is materialized.
    pub fn kind(&self) -> ShiftKind {
        match self {
            ShiftBucket::Morning => ShiftKind::Morning,
            ShiftBucket::Afternoon => ShiftKind::Afternoon,
        }
    }
}

/// A proposed shift: a bucket and the trip indices it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedShift {
    /// Bucket label.
    pub bucket: ShiftBucket,
    /// Trip indices, ascending by start time.
    pub trips: Vec<usize>,
}

impl ProposedShift {
    /// Amplitude of this shift over the given trip list.
    ///
    /// Indices past the end of `trips` are skipped.
    pub fn amplitude(&self, trips: &[Trip]) -> Minutes {
        let held = || self.trips.iter().filter_map(|&i| trips.get(i));
        let first = held().map(|t| t.start).min();
        let last = held().map(|t| t.end).max();
        match (first, last) {
            (Some(first), Some(last)) => last - first,
            _ => 0,
        }
    }
}

/// Identity of a solution: its set of `(bucket, sorted trip tuple)` pairs.
///
/// Shift numbering does not take part, so two solutions listing the same
/// shifts in a different order share a signature.
pub type SolutionSignature = BTreeSet<(ShiftBucket, Vec<usize>)>;

/// One alternative assignment of the trip pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Proposed shifts.
    pub shifts: Vec<ProposedShift>,
    /// Trips left unassigned.
    pub orphans: Vec<usize>,
    /// Quality score (higher = better).
    pub score: i64,
}

impl Solution {
    /// Creates an unscored solution.
    pub fn new(shifts: Vec<ProposedShift>, orphans: Vec<usize>) -> Self {
        Self {
            shifts,
            orphans,
            score: 0,
        }
    }

    /// Deduplication signature.
    pub fn signature(&self) -> SolutionSignature {
        self.shifts
            .iter()
            .map(|s| {
                let mut trips = s.trips.clone();
                trips.sort_unstable();
                (s.bucket, trips)
            })
            .collect()
    }

    /// Number of trips covered by proposed shifts.
    pub fn covered(&self) -> usize {
        self.shifts.iter().map(|s| s.trips.len()).sum()
    }

    /// Proposed shifts in one bucket.
    pub fn shifts_in(&self, bucket: ShiftBucket) -> impl Iterator<Item = &ProposedShift> {
        self.shifts.iter().filter(move |s| s.bucket == bucket)
    }
}

/// Ranked alternatives; at most one is selected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolutionSet {
    /// Alternatives, best first after [`SolutionSet::rank`].
    pub solutions: Vec<Solution>,
    /// Index of the selected alternative.
    pub selected: Option<usize>,
}

impl SolutionSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a solution unless one with the same signature is present.
    ///
    /// Returns whether it was kept.
    pub fn insert(&mut self, solution: Solution) -> bool {
        let signature = solution.signature();
        if self.solutions.iter().any(|s| s.signature() == signature) {
            return false;
        }
        self.solutions.push(solution);
        true
    }

    /// Sorts by descending score. Stable: ties keep generation order.
    ///
    /// Clears any selection, since indices move.
    pub fn rank(&mut self) {
        self.solutions.sort_by(|a, b| b.score.cmp(&a.score));
        self.selected = None;
    }

    /// Selects an alternative by index. Returns `false` if out of range.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.solutions.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    /// Selects rank 1 when nothing was chosen (automatic selection).
    pub fn select_default(&mut self) -> Option<&Solution> {
        if self.selected.is_none() && !self.solutions.is_empty() {
            self.selected = Some(0);
        }
        self.selected_solution()
    }

    /// The selected alternative.
    pub fn selected_solution(&self) -> Option<&Solution> {
        self.selected.and_then(|i| self.solutions.get(i))
    }

    /// Best-ranked alternative.
    pub fn best(&self) -> Option<&Solution> {
        self.solutions.first()
    }

    /// Number of alternatives.
    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    /// Whether there are no alternatives.
    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shift(bucket: ShiftBucket, trips: &[usize]) -> ProposedShift {
        ProposedShift {
            bucket,
            trips: trips.to_vec(),
        }
    }

    #[test]
    fn test_bucket_labels() {
        assert_eq!(ShiftBucket::for_start(300, 720), ShiftBucket::Morning);
        assert_eq!(ShiftBucket::for_start(720, 720), ShiftBucket::Afternoon);
        assert_eq!(ShiftBucket::Morning.label(), "matin");
        assert_eq!(ShiftBucket::Afternoon.label(), "apres_midi");
        assert_eq!(ShiftBucket::Afternoon.kind(), ShiftKind::Afternoon);
    }

    #[test]
    fn test_signature_ignores_shift_numbering() {
        let a = Solution::new(
            vec![
                shift(ShiftBucket::Morning, &[0, 1]),
                shift(ShiftBucket::Afternoon, &[3, 2]),
            ],
            vec![4],
        );
        let b = Solution::new(
            vec![
                shift(ShiftBucket::Afternoon, &[2, 3]),
                shift(ShiftBucket::Morning, &[1, 0]),
            ],
            vec![4],
        );
        assert_eq!(a.signature(), b.signature());
    }

    #[test]
    fn test_signature_distinguishes_buckets() {
        let a = Solution::new(vec![shift(ShiftBucket::Morning, &[0, 1])], vec![]);
        let b = Solution::new(vec![shift(ShiftBucket::Afternoon, &[0, 1])], vec![]);
        assert_ne!(a.signature(), b.signature());
    }

    #[test]
    fn test_set_dedup() {
        let mut set = SolutionSet::new();
        assert!(set.insert(Solution::new(vec![shift(ShiftBucket::Morning, &[0, 1])], vec![])));
        assert!(!set.insert(Solution::new(vec![shift(ShiftBucket::Morning, &[1, 0])], vec![])));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_rank_is_stable() {
        let mut set = SolutionSet::new();
        for (score, trips) in [(10, [0, 1]), (30, [2, 3]), (10, [4, 5])] {
            let mut s = Solution::new(vec![shift(ShiftBucket::Morning, &trips)], vec![]);
            s.score = score;
            set.insert(s);
        }
        set.rank();
        assert_eq!(set.solutions[0].score, 30);
        assert_eq!(set.solutions[1].shifts[0].trips, vec![0, 1]);
        assert_eq!(set.solutions[2].shifts[0].trips, vec![4, 5]);
    }

    #[test]
    fn test_selection() {
        let mut set = SolutionSet::new();
        assert!(set.select_default().is_none());
        set.insert(Solution::new(vec![shift(ShiftBucket::Morning, &[0, 1])], vec![]));
        set.insert(Solution::new(vec![shift(ShiftBucket::Morning, &[0, 2])], vec![1]));
        assert!(!set.select(5));
        assert!(set.select(1));
        assert_eq!(set.selected_solution().unwrap().orphans, vec![1]);
        // An explicit choice is not overridden.
        assert_eq!(set.select_default().unwrap().orphans, vec![1]);
    }

    #[test]
    fn test_covered_and_amplitude() {
        let trips = vec![
            Trip::new("L", "0", "A", "B", 360, 420),
            Trip::new("L", "1", "B", "C", 430, 500),
        ];
        let s = Solution::new(vec![shift(ShiftBucket::Morning, &[0, 1])], vec![]);
        assert_eq!(s.covered(), 2);
        assert_eq!(s.shifts[0].amplitude(&trips), 140);
        assert_eq!(s.shifts_in(ShiftBucket::Afternoon).count(), 0);
    }

    #[test]
    fn test_amplitude_skips_unknown_index() {
        let trips = vec![Trip::new("L", "0", "A", "B", 360, 420)];
        let s = shift(ShiftBucket::Morning, &[0, 7]);
        assert_eq!(s.amplitude(&trips), 60);
        assert_eq!(shift(ShiftBucket::Morning, &[7]).amplitude(&trips), 0);
    }
}
