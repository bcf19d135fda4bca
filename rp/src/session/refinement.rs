//! RefinementSession - the goal plan refinement state machine
//!
//! Sequences define → analyze → review → refine → save. The flow is
//! unidirectional but re-enterable: refine actions loop back into refine, and
//! restoring a saved version or history entry re-enters refine directly.
//!
//! Failure semantics: a failed analyze or refine leaves the session exactly
//! as it was — no phase change, no history entry, no current-plan update.

use std::sync::Arc;

use eyre::{Result, bail};
use tracing::{debug, info};
use versionstore::{SavedVersion, Scope, VersionStore};

use crate::domain::{
    GoalRequest, HistoryEntry, Horizon, ObjectiveDimension, ObjectiveWeights, Plan, PlanDelta, PlanSnapshot, SavedPlan,
    HORIZON_MAX, HORIZON_MIN,
};
use crate::planner::PlannerClient;
use crate::variants::{generate_variants, PlanVariant};

/// Session phase in the refinement workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Gathering the goal request
    #[default]
    Define,
    /// Analysis dispatched, no plan yet
    Analyze,
    /// Variants computed, awaiting selection
    Review,
    /// Iterating on the current plan
    Refine,
    /// Current plan captured as a saved version
    Save,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Define => write!(f, "define"),
            Self::Analyze => write!(f, "analyze"),
            Self::Review => write!(f, "review"),
            Self::Refine => write!(f, "refine"),
            Self::Save => write!(f, "save"),
        }
    }
}

/// Configuration for a refinement session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Fixed increment applied by the quick extend-horizon action
    pub horizon_increment: u32,

    /// Fixed increment applied by the quick boost-weight action
    pub weight_increment: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            horizon_increment: 4,
            weight_increment: 0.1,
        }
    }
}

/// RefinementSession orchestrates one plan lineage end to end
pub struct RefinementSession {
    /// External planning service
    planner: Arc<dyn PlannerClient>,

    /// Durable saves
    store: VersionStore,

    /// Tenant/persona owning the saves
    scope: Scope,

    /// Configuration
    config: SessionConfig,

    /// Current phase
    phase: SessionPhase,

    /// The request that started the current lineage
    request: Option<GoalRequest>,

    /// Effective horizon after quick refinements
    horizon: Option<Horizon>,

    /// Effective objective weights after quick refinements
    weights: Option<ObjectiveWeights>,

    /// Current plan
    current: Option<Plan>,

    /// Comparison variants from the last analysis
    variants: Vec<PlanVariant>,

    /// Append-only refinement history for the current lineage
    history: Vec<HistoryEntry>,
}

impl RefinementSession {
    /// Create a new session in the define phase
    pub fn new(planner: Arc<dyn PlannerClient>, store: VersionStore, scope: Scope, config: SessionConfig) -> Self {
        Self {
            planner,
            store,
            scope,
            config,
            phase: SessionPhase::Define,
            request: None,
            horizon: None,
            weights: None,
            current: None,
            variants: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn current_plan(&self) -> Option<&Plan> {
        self.current.as_ref()
    }

    pub fn request(&self) -> Option<&GoalRequest> {
        self.request.as_ref()
    }

    pub fn variants(&self) -> &[PlanVariant] {
        &self.variants
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Define → analyze → review: analyze the goal and compute variants
    ///
    /// Out-of-range horizon and weights are clamped, not rejected, so the
    /// analysis is always attempted; only an empty goal text is a validation
    /// failure. Starts a new lineage: any prior history and variants belong
    /// to a different baseline and are discarded.
    pub async fn plan(&mut self, request: GoalRequest) -> Result<()> {
        if request.goal_text.trim().is_empty() {
            bail!("Goal text must not be empty");
        }
        let request = request.normalized();

        info!(goal = %request.goal_text, horizon = %request.horizon, "plan: analyzing");
        let base = self.planner.analyze(&request).await?;
        let variants = generate_variants(self.planner.as_ref(), &base.id, &request.objectives).await?;

        // All calls succeeded; commit the new lineage
        let selected = variants[0].clone();
        debug!(base_id = %base.id, selected = %selected.dimension, "plan: auto-selecting first variant");

        self.horizon = Some(request.horizon);
        self.weights = Some(self.effective_weights_for(&request, &selected));
        self.request = Some(request);
        self.current = Some(selected.plan.clone());
        self.variants = variants;
        self.history = vec![HistoryEntry::new("Analyze", selected.plan)];
        self.phase = SessionPhase::Review;
        Ok(())
    }

    /// Review → refine: adopt one of the computed variants
    ///
    /// No network call is made; the variant was already computed during
    /// analysis.
    pub fn select_variant(&mut self, dimension: ObjectiveDimension) -> Result<()> {
        let variant = self
            .variants
            .iter()
            .find(|v| v.dimension == dimension)
            .cloned()
            .ok_or_else(|| eyre::eyre!("No computed variant for dimension: {}", dimension))?;

        let request = self.request.clone().ok_or_else(|| eyre::eyre!("No active request"))?;
        self.weights = Some(self.effective_weights_for(&request, &variant));
        self.current = Some(variant.plan);
        self.phase = SessionPhase::Refine;
        info!(%dimension, "select_variant: variant adopted");
        Ok(())
    }

    /// Quick refinement: extend the horizon by the configured increment
    pub async fn extend_horizon(&mut self) -> Result<()> {
        let horizon = self.horizon.ok_or_else(|| eyre::eyre!("No active plan to refine"))?;
        let value = (horizon.value + self.config.horizon_increment).clamp(HORIZON_MIN, HORIZON_MAX);
        self.refine_with(PlanDelta::AdjustHorizon {
            unit: horizon.unit,
            value,
        })
        .await
    }

    /// Quick refinement: increase one objective weight by the configured increment
    pub async fn boost_weight(&mut self, dimension: ObjectiveDimension) -> Result<()> {
        let weights = self.weights.ok_or_else(|| eyre::eyre!("No active plan to refine"))?;
        let bumped = weights.bumped(dimension, self.config.weight_increment).get(dimension);
        let delta = match dimension {
            ObjectiveDimension::Cost => PlanDelta::ChangeObjectiveWeights {
                cost: Some(bumped),
                service_level: None,
                carbon: None,
            },
            ObjectiveDimension::ServiceLevel => PlanDelta::ChangeObjectiveWeights {
                cost: None,
                service_level: Some(bumped),
                carbon: None,
            },
            ObjectiveDimension::Carbon => PlanDelta::ChangeObjectiveWeights {
                cost: None,
                service_level: None,
                carbon: Some(bumped),
            },
        };
        self.refine_with(delta).await
    }

    /// Apply an arbitrary scenario delta to the current plan
    pub async fn apply_delta(&mut self, delta: PlanDelta) -> Result<()> {
        self.refine_with(delta).await
    }

    /// Capture the current plan and its originating request as a saved version
    ///
    /// Does not change the session phase or any in-memory state; saves are a
    /// side-channel from the refinement loop, and a store failure leaves the
    /// session untouched.
    pub fn save(&self, label: Option<String>) -> Result<SavedPlan> {
        let plan = self.current.clone().ok_or_else(|| eyre::eyre!("No plan to save"))?;
        let request = self.request.clone().ok_or_else(|| eyre::eyre!("No active request"))?;

        let mut version = SavedVersion::new(
            plan.id.clone(),
            plan.summary.clone(),
            PlanSnapshot { plan, request },
        );
        if let Some(label) = label {
            version = version.with_label(label);
        }

        self.store.save(&self.scope, version.clone())?;
        info!(id = %version.id, "save: version persisted");
        Ok(version)
    }

    /// List saved versions for this session's scope, most recent first
    pub fn saved_versions(&self) -> Result<Vec<SavedPlan>> {
        self.store.list(&self.scope)
    }

    /// Delete a saved version; a missing id is a no-op
    pub fn delete_version(&self, id: &str) -> Result<()> {
        self.store.delete(&self.scope, id)
    }

    /// Restore a saved version, re-entering the refine phase
    pub fn restore_version(&mut self, id: &str) -> Result<()> {
        let version: SavedPlan = self.store.restore(&self.scope, id)?;
        let name = version.label.clone().unwrap_or_else(|| version.id.clone());

        self.horizon = Some(version.payload.request.horizon);
        self.weights = Some(version.payload.request.objectives);
        self.request = Some(version.payload.request);
        self.current = Some(version.payload.plan.clone());
        self.history.push(HistoryEntry::new(format!("Restore {}", name), version.payload.plan));
        self.phase = SessionPhase::Refine;
        info!(%id, "restore_version: snapshot restored");
        Ok(())
    }

    /// Restore an earlier history entry, re-entering the refine phase
    pub fn restore_history(&mut self, index: usize) -> Result<()> {
        let entry = self
            .history
            .get(index)
            .cloned()
            .ok_or_else(|| eyre::eyre!("No history entry at index {}", index))?;

        self.current = Some(entry.plan.clone());
        self.history
            .push(HistoryEntry::new(format!("Restore {}", entry.label), entry.plan));
        self.phase = SessionPhase::Refine;
        info!(%index, "restore_history: snapshot restored");
        Ok(())
    }

    /// Validate, normalize, and dispatch a delta; commit only on success
    async fn refine_with(&mut self, delta: PlanDelta) -> Result<()> {
        delta.validate()?;
        let delta = delta.normalized();

        let current = self.current.as_ref().ok_or_else(|| eyre::eyre!("No active plan to refine"))?;
        debug!(plan_id = %current.id, label = %delta.label(), "refine_with: dispatching");
        let plan = self.planner.refine(&current.id, &delta).await?;

        self.track_effective(&delta);
        self.history.push(HistoryEntry::new(delta.label(), plan.clone()));
        self.current = Some(plan);
        self.phase = SessionPhase::Refine;
        Ok(())
    }

    /// Fold a successful delta into the session's effective parameters
    fn track_effective(&mut self, delta: &PlanDelta) {
        match delta {
            PlanDelta::AdjustHorizon { unit, value } => {
                self.horizon = Some(Horizon::new(*unit, *value));
            }
            PlanDelta::ChangeObjectiveWeights {
                cost,
                service_level,
                carbon,
            } => {
                if let Some(weights) = self.weights {
                    self.weights = Some(weights.merged(*cost, *service_level, *carbon));
                }
            }
            _ => {}
        }
    }

    /// Weights in effect after adopting a variant
    fn effective_weights_for(&self, request: &GoalRequest, variant: &PlanVariant) -> ObjectiveWeights {
        if let PlanDelta::ChangeObjectiveWeights {
            cost,
            service_level,
            carbon,
        } = &variant.delta
        {
            request.objectives.merged(*cost, *service_level, *carbon)
        } else {
            request.objectives
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BusinessContext, HorizonUnit};
    use crate::planner::mock::MockPlannerClient;
    use tempfile::TempDir;

    fn request() -> GoalRequest {
        GoalRequest::new(
            "Improve service level while lowering holding cost",
            BusinessContext::new("bu-retail", vec!["us".to_string(), "eu".to_string()]),
            Horizon::new(HorizonUnit::Weeks, 12),
            ObjectiveWeights::new(0.6, 0.3, 0.1),
        )
    }

    fn session(temp: &TempDir) -> (RefinementSession, Arc<MockPlannerClient>) {
        let planner = Arc::new(MockPlannerClient::new());
        let store = VersionStore::open(temp.path()).unwrap();
        let scope = Scope::new("acme", "planner");
        let session = RefinementSession::new(planner.clone(), store, scope, SessionConfig::default());
        (session, planner)
    }

    #[tokio::test]
    async fn test_plan_enters_review_with_variants_and_history() {
        let temp = TempDir::new().unwrap();
        let (mut session, planner) = session(&temp);

        session.plan(request()).await.unwrap();

        assert_eq!(session.phase(), SessionPhase::Review);
        assert_eq!(session.variants().len(), 3);
        assert_eq!(planner.analyze_count(), 1);
        assert_eq!(planner.refine_count(), 3);
        // First variant auto-selected so KPIs are visible immediately
        assert_eq!(session.current_plan().unwrap().id, session.variants()[0].plan.id);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].label, "Analyze");
    }

    #[tokio::test]
    async fn test_empty_goal_rejected_before_any_call() {
        let temp = TempDir::new().unwrap();
        let (mut session, planner) = session(&temp);

        let mut bad = request();
        bad.goal_text = "   ".to_string();
        assert!(session.plan(bad).await.is_err());
        assert_eq!(session.phase(), SessionPhase::Define);
        assert_eq!(planner.analyze_count(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_request_clamped_not_rejected() {
        let temp = TempDir::new().unwrap();
        let (mut session, _) = session(&temp);

        let mut req = request();
        req.horizon = Horizon::new(HorizonUnit::Weeks, 90);
        req.objectives = ObjectiveWeights::new(1.5, -0.3, 0.1);
        session.plan(req).await.unwrap();

        let committed = session.request().unwrap();
        assert_eq!(committed.horizon.value, 60);
        assert_eq!(committed.objectives.cost, 1.0);
        assert_eq!(committed.objectives.service_level, 0.0);
    }

    #[tokio::test]
    async fn test_failed_analyze_leaves_session_untouched() {
        let temp = TempDir::new().unwrap();
        let (mut session, planner) = session(&temp);
        planner.fail_analyze(true);

        assert!(session.plan(request()).await.is_err());
        assert_eq!(session.phase(), SessionPhase::Define);
        assert!(session.current_plan().is_none());
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_select_variant_skips_network() {
        let temp = TempDir::new().unwrap();
        let (mut session, planner) = session(&temp);
        session.plan(request()).await.unwrap();
        let calls_after_plan = planner.refine_count();

        session.select_variant(ObjectiveDimension::ServiceLevel).unwrap();

        assert_eq!(session.phase(), SessionPhase::Refine);
        assert_eq!(planner.refine_count(), calls_after_plan);
        assert!(session.current_plan().unwrap().summary.contains("service level"));
    }

    #[tokio::test]
    async fn test_extend_horizon_appends_labeled_history() {
        let temp = TempDir::new().unwrap();
        let (mut session, _) = session(&temp);
        session.plan(request()).await.unwrap();
        session.select_variant(ObjectiveDimension::ServiceLevel).unwrap();

        session.extend_horizon().await.unwrap();

        let labels: Vec<&str> = session.history().iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, vec!["Analyze", "Adjust horizon → 16 weeks"]);
        // Compounding: a second extension starts from 16
        session.extend_horizon().await.unwrap();
        assert_eq!(session.history().last().unwrap().label, "Adjust horizon → 20 weeks");
    }

    #[tokio::test]
    async fn test_boost_weight_clamps_and_records() {
        let temp = TempDir::new().unwrap();
        let (mut session, _) = session(&temp);
        session.plan(request()).await.unwrap();
        session.select_variant(ObjectiveDimension::Cost).unwrap();

        // cost started at 0.6, variant selection bumped it to 0.7
        for _ in 0..5 {
            session.boost_weight(ObjectiveDimension::Cost).await.unwrap();
        }
        let last = session.history().last().unwrap();
        assert_eq!(last.label, "Reweight objectives (cost → 1.00)");
    }

    #[tokio::test]
    async fn test_failed_refine_keeps_history_clean() {
        let temp = TempDir::new().unwrap();
        let (mut session, planner) = session(&temp);
        session.plan(request()).await.unwrap();
        session.select_variant(ObjectiveDimension::Cost).unwrap();
        let history_len = session.history().len();
        let current_id = session.current_plan().unwrap().id.clone();

        let delta = PlanDelta::LockActionIds {
            action_ids: vec!["a-1".to_string()],
        };
        planner.fail_on_delta(delta.clone());

        assert!(session.apply_delta(delta).await.is_err());
        assert_eq!(session.history().len(), history_len);
        assert_eq!(session.current_plan().unwrap().id, current_id);
        assert_eq!(session.phase(), SessionPhase::Refine);
    }

    #[tokio::test]
    async fn test_invalid_delta_rejected_before_network() {
        let temp = TempDir::new().unwrap();
        let (mut session, planner) = session(&temp);
        session.plan(request()).await.unwrap();
        let calls = planner.refine_count();

        let empty = PlanDelta::AddConstraints { constraints: vec![] };
        assert!(session.apply_delta(empty).await.is_err());
        assert_eq!(planner.refine_count(), calls);
    }

    #[tokio::test]
    async fn test_save_restore_round_trip() {
        let temp = TempDir::new().unwrap();
        let (mut session, _) = session(&temp);
        session.plan(request()).await.unwrap();
        session.select_variant(ObjectiveDimension::Carbon).unwrap();

        let saved = session.save(Some("carbon baseline".to_string())).unwrap();
        let snapshot = session.current_plan().unwrap().clone();

        // Refine past the save, then restore
        session.extend_horizon().await.unwrap();
        assert_ne!(session.current_plan().unwrap().id, snapshot.id);

        session.restore_version(&saved.id).unwrap();
        assert_eq!(session.phase(), SessionPhase::Refine);
        assert_eq!(session.current_plan().unwrap(), &snapshot);
        assert_eq!(
            session.history().last().unwrap().label,
            "Restore carbon baseline"
        );
    }

    #[tokio::test]
    async fn test_restore_history_entry() {
        let temp = TempDir::new().unwrap();
        let (mut session, _) = session(&temp);
        session.plan(request()).await.unwrap();
        session.select_variant(ObjectiveDimension::Cost).unwrap();
        session.extend_horizon().await.unwrap();

        let analyze_plan = session.history()[0].plan.clone();
        session.restore_history(0).unwrap();

        assert_eq!(session.current_plan().unwrap(), &analyze_plan);
        assert_eq!(session.history().last().unwrap().label, "Restore Analyze");
        assert_eq!(session.phase(), SessionPhase::Refine);
    }
}
