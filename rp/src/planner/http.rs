//! HTTP planner client implementation
//!
//! Point-to-point JSON client for the planning service's analyze and refine
//! endpoints. Deliberately retry-free: a failed call is surfaced as-is and
//! the session stays in its pre-call state.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::PlannerConfig;
use crate::domain::{GoalRequest, Plan, PlanDelta};

use super::{PlannerClient, PlannerError};

/// HTTP client for the planning service
pub struct HttpPlannerClient {
    base_url: String,
    api_key: String,
    http: Client,
}

impl HttpPlannerClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from the environment variable named in config.
    pub fn from_config(config: &PlannerConfig) -> Result<Self, PlannerError> {
        let api_key = config
            .get_api_key()
            .map_err(|e| PlannerError::InvalidResponse(e.to_string()))?;

        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder().timeout(timeout).build().map_err(PlannerError::Network)?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            http,
        })
    }

    async fn post_json(&self, url: String, body: serde_json::Value) -> Result<Plan, PlannerError> {
        debug!(%url, "post_json: dispatching");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), %message, "post_json: planner returned error");
            return Err(PlannerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let plan: Plan = response
            .json()
            .await
            .map_err(|e| PlannerError::InvalidResponse(e.to_string()))?;
        debug!(plan_id = %plan.id, "post_json: plan received");
        Ok(plan)
    }
}

#[async_trait]
impl PlannerClient for HttpPlannerClient {
    async fn analyze(&self, request: &GoalRequest) -> Result<Plan, PlannerError> {
        let url = format!("{}/v1/analyze", self.base_url);
        let body = serde_json::to_value(request)?;
        self.post_json(url, body).await
    }

    async fn refine(&self, plan_id: &str, delta: &PlanDelta) -> Result<Plan, PlannerError> {
        let url = format!("{}/v1/plans/{}/refine", self.base_url, plan_id);
        let body = serde_json::to_value(delta)?;
        self.post_json(url, body).await
    }
}
