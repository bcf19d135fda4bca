//! Plan domain type
//!
//! A Plan is an immutable snapshot returned by the external optimizer. Every
//! refine call produces a new Plan value; history and saved versions own
//! independent copies.

use serde::{Deserialize, Serialize};
use versionstore::SavedVersion;

use super::request::GoalRequest;

/// One set of KPI figures, baseline or projected
///
/// Fields are optional because the optimizer reports only what it can
/// estimate for a given goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KpiSet {
    /// Total cost over the horizon
    pub cost_total: Option<f64>,
    /// Total revenue over the horizon
    pub revenue_total: Option<f64>,
    /// Service level as a fraction in [0, 1]
    pub service_level: Option<f64>,
    /// Carbon as an index
    pub carbon: Option<f64>,
}

/// Baseline and projected KPI figures for one plan
///
/// `projected` is only meaningful relative to the `baseline` recorded in the
/// same Plan; the two must never be compared across request lineages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KpiSnapshot {
    pub baseline: KpiSet,
    pub projected: KpiSet,
}

/// One recommended action within a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedAction {
    /// Stable action id, used by lock-action deltas
    pub id: String,
    /// Short action name
    pub name: String,
    /// Longer description
    pub description: String,
}

impl RecommendedAction {
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}

/// A structured, versionable plan for a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Unique plan id, assigned by the optimizer
    pub id: String,
    /// Human-readable summary
    pub summary: String,
    /// Baseline and projected KPIs
    pub kpis: KpiSnapshot,
    /// Ordered recommended actions
    #[serde(default)]
    pub actions: Vec<RecommendedAction>,
}

/// The payload of a saved version: the plan plus the request that produced it
///
/// The originating request travels with the snapshot so a restored plan can
/// keep refining from the correct horizon and weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSnapshot {
    pub plan: Plan,
    pub request: GoalRequest,
}

/// A durable, named plan version as stored by the Version Store
pub type SavedPlan = SavedVersion<PlanSnapshot>;
