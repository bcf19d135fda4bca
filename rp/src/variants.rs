//! Variant Generator
//!
//! Produces three comparison plans from a common base by perturbing one
//! objective-weight dimension at a time. The three refine calls run
//! concurrently, but each result stays tied to the dimension whose delta
//! produced it; display order is always cost, service level, carbon.

use eyre::Result;
use tracing::{debug, info};

use crate::domain::{ObjectiveDimension, ObjectiveWeights, Plan, PlanDelta};
use crate::planner::PlannerClient;

/// Weight increment applied to each perturbed dimension
pub const VARIANT_WEIGHT_BUMP: f64 = 0.1;

/// Fixed display order of the comparison variants
pub const VARIANT_ORDER: [ObjectiveDimension; 3] = [
    ObjectiveDimension::Cost,
    ObjectiveDimension::ServiceLevel,
    ObjectiveDimension::Carbon,
];

/// One comparison variant: the plan and the delta that produced it
#[derive(Debug, Clone)]
pub struct PlanVariant {
    pub dimension: ObjectiveDimension,
    pub delta: PlanDelta,
    pub plan: Plan,
}

/// Build the synthetic delta that perturbs one dimension
///
/// Only the perturbed field is set; the bumped value is clamped to 1.
pub fn variant_delta(weights: &ObjectiveWeights, dimension: ObjectiveDimension) -> PlanDelta {
    let bumped = weights.bumped(dimension, VARIANT_WEIGHT_BUMP).get(dimension);
    match dimension {
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
    }
}

/// Generate the three comparison variants for a base plan
///
/// The three refine calls are dispatched concurrently and joined before
/// returning; there is no partial result. If any call fails, the error names
/// every failed dimension rather than silently dropping a variant.
pub async fn generate_variants(
    client: &dyn PlannerClient,
    base_plan_id: &str,
    weights: &ObjectiveWeights,
) -> Result<Vec<PlanVariant>> {
    let [cost_dim, service_dim, carbon_dim] = VARIANT_ORDER;
    let cost_delta = variant_delta(weights, cost_dim);
    let service_delta = variant_delta(weights, service_dim);
    let carbon_delta = variant_delta(weights, carbon_dim);

    debug!(%base_plan_id, "generate_variants: dispatching three refines");
    let (cost, service, carbon) = tokio::join!(
        client.refine(base_plan_id, &cost_delta),
        client.refine(base_plan_id, &service_delta),
        client.refine(base_plan_id, &carbon_delta),
    );

    let mut variants = Vec::with_capacity(3);
    let mut failures = Vec::new();

    for (dimension, delta, result) in [
        (cost_dim, cost_delta, cost),
        (service_dim, service_delta, service),
        (carbon_dim, carbon_delta, carbon),
    ] {
        match result {
            Ok(plan) => variants.push(PlanVariant { dimension, delta, plan }),
            Err(e) => failures.push(format!("{} variant: {}", dimension, e)),
        }
    }

    if !failures.is_empty() {
        return Err(eyre::eyre!("Variant generation failed — {}", failures.join("; ")));
    }

    info!(%base_plan_id, "generate_variants: three variants ready");
    Ok(variants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::mock::MockPlannerClient;

    #[test]
    fn test_variant_delta_bumps_only_its_dimension() {
        let weights = ObjectiveWeights::new(0.6, 0.3, 0.1);
        let delta = variant_delta(&weights, ObjectiveDimension::ServiceLevel);
        assert_eq!(
            delta,
            PlanDelta::ChangeObjectiveWeights {
                cost: None,
                service_level: Some(0.4),
                carbon: None,
            }
        );
    }

    #[test]
    fn test_variant_delta_clamps_at_one() {
        let weights = ObjectiveWeights::new(0.95, 0.3, 0.1);
        let delta = variant_delta(&weights, ObjectiveDimension::Cost);
        assert_eq!(
            delta,
            PlanDelta::ChangeObjectiveWeights {
                cost: Some(1.0),
                service_level: None,
                carbon: None,
            }
        );
    }

    #[tokio::test]
    async fn test_variants_keep_dimension_association() {
        let client = MockPlannerClient::new();
        let weights = ObjectiveWeights::new(0.6, 0.3, 0.1);

        let variants = generate_variants(&client, "plan-0001", &weights).await.unwrap();

        assert_eq!(variants.len(), 3);
        assert_eq!(
            variants.iter().map(|v| v.dimension).collect::<Vec<_>>(),
            VARIANT_ORDER.to_vec()
        );
        // The mock carries the delta label in the summary, so each plan must
        // match the dimension it is filed under.
        assert!(variants[0].plan.summary.contains("cost"));
        assert!(variants[1].plan.summary.contains("service level"));
        assert!(variants[2].plan.summary.contains("carbon"));
    }

    #[tokio::test]
    async fn test_failed_variant_is_named() {
        let client = MockPlannerClient::new();
        let weights = ObjectiveWeights::new(0.6, 0.3, 0.1);
        client.fail_on_delta(variant_delta(&weights, ObjectiveDimension::Carbon));

        let err = generate_variants(&client, "plan-0001", &weights).await.unwrap_err();
        assert!(err.to_string().contains("carbon variant"));
    }
}
