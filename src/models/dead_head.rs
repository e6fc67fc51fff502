//! Dead-head (haut-le-pied) links and stop-code prefixes.
//!
//! Stop codes are compared by a short, case-insensitive prefix that
//! identifies a stop group: `GARE1` and `gare2` chain when the prefix
//! length is 4 or less. A dead-head link is a known non-revenue move between
//! two stop groups that are not otherwise connected.

use serde::{Deserialize, Serialize};

use super::window::Minutes;

/// Default number of leading characters compared between stop codes.
pub const DEFAULT_STOP_PREFIX_LEN: usize = 3;

/// Normalized stop-group key: the first `len` characters, uppercased.
///
/// Blank stop codes yield `None` and never match anything.
pub fn stop_prefix(stop: &str, len: usize) -> Option<String> {
    let trimmed = stop.trim();
    if trimmed.is_empty() || len == 0 {
        return None;
    }
    Some(trimmed.chars().take(len).flat_map(char::to_uppercase).collect())
}

/// Whether two stop codes belong to the same stop group.
pub fn same_stop_group(a: &str, b: &str, len: usize) -> bool {
    match (stop_prefix(a, len), stop_prefix(b, len)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// A registered dead-head move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadHead {
    /// Origin stop-group prefix.
    pub from: String,
    /// Destination stop-group prefix.
    pub to: String,
    /// Driving time of the move (minutes).
    pub duration: Minutes,
}

impl DeadHead {
    /// Creates a dead-head link.
    pub fn new(from: impl Into<String>, to: impl Into<String>, duration: Minutes) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            duration,
        }
    }

    /// Whether this link moves from `end_stop` to `start_stop`.
    pub fn bridges(&self, end_stop: &str, start_stop: &str, prefix_len: usize) -> bool {
        same_stop_group(&self.from, end_stop, prefix_len)
            && same_stop_group(&self.to, start_stop, prefix_len)
    }
}

/// The dead-head table plus its per-shift usage cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadHeadTable {
    /// Known links, scanned in order.
    pub links: Vec<DeadHead>,
    /// Maximum number of dead-heads one shift may use.
    pub max_per_shift: usize,
}

impl Default for DeadHeadTable {
    fn default() -> Self {
        Self {
            links: Vec::new(),
            max_per_shift: 1,
        }
    }
}

impl DeadHeadTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: adds a link.
    pub fn with_link(mut self, link: DeadHead) -> Self {
        self.links.push(link);
        self
    }

    /// Builder: sets the per-shift cap.
    pub fn with_max_per_shift(mut self, max_per_shift: usize) -> Self {
        self.max_per_shift = max_per_shift;
        self
    }

    /// First link bridging `end_stop` to `start_stop`, if any.
    pub fn find(&self, end_stop: &str, start_stop: &str, prefix_len: usize) -> Option<&DeadHead> {
        self.links
            .iter()
            .find(|link| link.bridges(end_stop, start_stop, prefix_len))
    }

    /// Number of registered links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether no links are registered.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
