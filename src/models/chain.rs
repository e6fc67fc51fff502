//! Chain model: candidate content for one shift.

use serde::{Deserialize, Serialize};

use super::window::Minutes;

/// An ordered run of pairwise-compatible trips.
///
/// Chains are derived while solving and never outlive the solution they
/// feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chain {
    /// Trip indices in time order.
    pub trips: Vec<usize>,
    /// Start of the first trip.
    pub start: Minutes,
    /// End of the last trip.
    pub end: Minutes,
    /// Dead-head moves used between consecutive trips.
    pub dead_heads: usize,
}

impl Chain {
    /// Amplitude: last end minus first start.
    #[inline]
    pub fn amplitude(&self) -> Minutes {
        self.end - self.start
    }

    /// Number of trips.
    #[inline]
    pub fn len(&self) -> usize {
        self.trips.len()
    }

    /// Whether the chain is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    /// Whether the chain runs trip `index`.
    pub fn contains(&self, index: usize) -> bool {
        self.trips.contains(&index)
    }

    /// Sorted trip indices, the chain's identity for deduplication.
    pub fn key(&self) -> Vec<usize> {
        let mut key = self.trips.clone();
        key.sort_unstable();
        key
    }
}
