//! External planning/optimization service client
//!
//! The optimizer is an external collaborator reached through two operations:
//! `analyze` turns a goal request into a base plan, `refine` applies a delta
//! to an existing plan and returns a new one. No retry policy lives here;
//! retries are a caller concern.

mod client;
mod error;
mod http;

pub use client::{mock, PlannerClient};
pub use error::PlannerError;
pub use http::HttpPlannerClient;
