//! Planner error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur talking to the planning service
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Planner API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
