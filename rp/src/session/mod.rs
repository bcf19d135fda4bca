//! Plan Orchestrator
//!
//! The top-level state machine sequencing goal definition, analysis, variant
//! review, refinement, and persistence. Owns the session history and
//! delegates durable saves to the Version Store.

mod refinement;

pub use refinement::{RefinementSession, SessionConfig, SessionPhase};
