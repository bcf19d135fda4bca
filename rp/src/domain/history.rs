//! HistoryEntry domain type

use serde::{Deserialize, Serialize};
use versionstore::now_ms;

use super::plan::Plan;

/// One step in the session's refinement history
///
/// History is append-only and ordered by creation; entries own independent
/// plan copies, so restoring one never aliases the current plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Human description of the action that produced this snapshot
    pub label: String,
    /// Creation timestamp (Unix milliseconds)
    pub at: i64,
    /// The plan snapshot
    pub plan: Plan,
}

impl HistoryEntry {
    /// Create an entry stamped with the current time
    pub fn new(label: impl Into<String>, plan: Plan) -> Self {
        Self {
            label: label.into(),
            at: now_ms(),
            plan,
        }
    }
}
