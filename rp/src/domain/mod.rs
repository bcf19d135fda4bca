//! Domain types for the plan refinement engine
//!
//! The shared data model: goal requests, plans with KPI snapshots, deltas
//! describing intended changes, and history entries. Everything here is an
//! immutable value type; refinement never mutates a plan in place.

mod delta;
mod history;
mod plan;
mod request;

pub use delta::PlanDelta;
pub use history::HistoryEntry;
pub use plan::{KpiSet, KpiSnapshot, Plan, PlanSnapshot, RecommendedAction, SavedPlan};
pub use request::{
    BusinessContext, GoalRequest, Horizon, HorizonUnit, ObjectiveDimension, ObjectiveWeights, HORIZON_MAX, HORIZON_MIN,
};
