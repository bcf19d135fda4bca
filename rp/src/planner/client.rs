//! PlannerClient trait definition

use async_trait::async_trait;

use crate::domain::{GoalRequest, Plan, PlanDelta};

use super::PlannerError;

/// Stateless client for the external planning service
///
/// Each call is an independent request/response; the service owns all plan
/// state. `refine` is idempotent at the description level (the same delta
/// payload is sent for the same inputs) but not at the result level: the
/// service may produce different plans for repeated calls as its underlying
/// data moves, so callers must not assume equality of repeated results.
#[async_trait]
pub trait PlannerClient: Send + Sync {
    /// Turn a goal request into a base plan
    async fn analyze(&self, request: &GoalRequest) -> Result<Plan, PlannerError>;

    /// Apply a delta to an existing plan, yielding a new plan
    async fn refine(&self, plan_id: &str, delta: &PlanDelta) -> Result<Plan, PlannerError>;
}

/// Deterministic in-memory planner for tests
pub mod mock {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tracing::debug;

    use crate::domain::{KpiSet, KpiSnapshot, RecommendedAction};

    use super::*;

    /// Mock planner that synthesizes plans locally
    ///
    /// Plans are derived deterministically from their inputs: analyze yields
    /// sequential ids, refine suffixes the parent id and carries the delta's
    /// label as the summary, so tests can associate results with the delta
    /// that produced them regardless of completion order.
    #[derive(Default)]
    pub struct MockPlannerClient {
        analyze_count: AtomicUsize,
        refine_count: AtomicUsize,
        /// When set, refines whose delta equals this one fail
        fail_on: Mutex<Option<PlanDelta>>,
        /// When true, every analyze fails
        fail_analyze: Mutex<bool>,
    }

    impl MockPlannerClient {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fail any refine carrying a delta equal to `delta`
        pub fn fail_on_delta(&self, delta: PlanDelta) {
            *self.fail_on.lock().unwrap() = Some(delta);
        }

        /// Make analyze calls fail
        pub fn fail_analyze(&self, fail: bool) {
            *self.fail_analyze.lock().unwrap() = fail;
        }

        pub fn analyze_count(&self) -> usize {
            self.analyze_count.load(Ordering::SeqCst)
        }

        pub fn refine_count(&self) -> usize {
            self.refine_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PlannerClient for MockPlannerClient {
        async fn analyze(&self, request: &GoalRequest) -> Result<Plan, PlannerError> {
            debug!(goal = %request.goal_text, "MockPlannerClient::analyze");
            if *self.fail_analyze.lock().unwrap() {
                return Err(PlannerError::Api {
                    status: 500,
                    message: "analyze failed".to_string(),
                });
            }
            let n = self.analyze_count.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Plan {
                id: format!("plan-{:04}", n),
                summary: format!("Plan for: {}", request.goal_text),
                kpis: KpiSnapshot {
                    baseline: KpiSet {
                        cost_total: Some(1_000_000.0),
                        revenue_total: Some(2_500_000.0),
                        service_level: Some(0.92),
                        carbon: Some(100.0),
                    },
                    projected: KpiSet {
                        cost_total: Some(940_000.0),
                        revenue_total: Some(2_550_000.0),
                        service_level: Some(0.95),
                        carbon: Some(97.0),
                    },
                },
                actions: vec![
                    RecommendedAction::new("a-1", "Rebalance inventory", "Shift stock toward high-velocity markets"),
                    RecommendedAction::new("a-2", "Consolidate shipments", "Merge partial loads on shared lanes"),
                ],
            })
        }

        async fn refine(&self, plan_id: &str, delta: &PlanDelta) -> Result<Plan, PlannerError> {
            debug!(%plan_id, ?delta, "MockPlannerClient::refine");
            if self.fail_on.lock().unwrap().as_ref() == Some(delta) {
                return Err(PlannerError::Api {
                    status: 500,
                    message: format!("refine failed: {}", delta.label()),
                });
            }
            let n = self.refine_count.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Plan {
                id: format!("{}-r{}", plan_id, n),
                summary: delta.label(),
                kpis: KpiSnapshot::default(),
                actions: Vec::new(),
            })
        }
    }

}
