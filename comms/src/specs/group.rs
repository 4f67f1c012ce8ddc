use serde::{Deserialize, Serialize};

/// Wire-level bootstrap specification for one member of the worker group.
///
/// Sent by the coordinator to every other worker before distribution. Each
/// worker derives the same partition plan from `rows` and `workers`, so the
/// plan itself never travels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpec {
    /// The 0-based rank assigned to the receiving worker.
    pub rank: usize,
    /// Total amount of workers in the group, coordinator included.
    pub workers: usize,
    /// Rows of the full image.
    pub rows: usize,
    /// Columns of the full image.
    pub cols: usize,
}
