//! Replan - goal plan refinement engine
//!
//! Turns a free-text business goal into a structured, iteratively refined
//! action plan. The planning computation itself lives in an external
//! optimizer reached through two operations (analyze, refine); this crate
//! owns the state machine around it, the comparison-variant fan-out, the
//! best-effort narrative parser, and durable named versions.
//!
//! # Core Concepts
//!
//! - **Immutable snapshots**: every refine produces a new Plan value; history
//!   and saved versions own independent copies
//! - **Deltas describe intent**: a [`domain::PlanDelta`] carries no computed
//!   result, only the change to apply
//! - **Clamp, don't reject**: out-of-range horizons and weights are clamped
//!   so an analysis attempt is always made
//! - **Best-effort extraction**: narrative reports degrade field by field,
//!   never failing as a whole
//!
//! # Modules
//!
//! - [`domain`] - plan data model: requests, plans, deltas, history
//! - [`planner`] - external planning service client trait and HTTP impl
//! - [`variants`] - concurrent comparison-variant generation
//! - [`extract`] - narrative extraction parser
//! - [`session`] - the refinement state machine
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod extract;
pub mod planner;
pub mod session;
pub mod variants;

// Re-export commonly used types
pub use config::{Config, PlannerConfig};
pub use domain::{
    BusinessContext, GoalRequest, HistoryEntry, Horizon, HorizonUnit, KpiSet, KpiSnapshot, ObjectiveDimension,
    ObjectiveWeights, Plan, PlanDelta, PlanSnapshot, RecommendedAction, SavedPlan,
};
pub use extract::{extract_report, ExtractedReport};
pub use planner::{HttpPlannerClient, PlannerClient, PlannerError};
pub use session::{RefinementSession, SessionConfig, SessionPhase};
pub use variants::{generate_variants, PlanVariant};
