//! PlanDelta domain type
//!
//! A delta is a pure description of an intended change to a plan's
//! parameters; it carries no computed result. Exactly one delta kind per
//! refine call is a compile-time invariant of the enum.

use eyre::{Result, bail};
use serde::{Deserialize, Serialize};

use super::request::{HorizonUnit, HORIZON_MAX, HORIZON_MIN};

/// A change descriptor sent to the optimizer's refine operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanDelta {
    /// Change the planning horizon
    AdjustHorizon { unit: HorizonUnit, value: u32 },
    /// Partial reweighting; unspecified fields are unchanged
    ChangeObjectiveWeights {
        cost: Option<f64>,
        service_level: Option<f64>,
        carbon: Option<f64>,
    },
    /// Add constraints the next plan must honor
    AddConstraints { constraints: Vec<String> },
    /// Relax previously applied constraints
    RelaxConstraints { constraints: Vec<String> },
    /// Keep the named actions fixed across the refine
    LockActionIds { action_ids: Vec<String> },
}

impl PlanDelta {
    /// Shape validation, performed before any network interaction
    ///
    /// Empty deltas are rejected: a reweighting with no fields set, or a
    /// constraint/lock list with no entries, describes no change.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::AdjustHorizon { .. } => {}
            Self::ChangeObjectiveWeights {
                cost,
                service_level,
                carbon,
            } => {
                if cost.is_none() && service_level.is_none() && carbon.is_none() {
                    bail!("Empty delta: no objective weight specified");
                }
            }
            Self::AddConstraints { constraints } | Self::RelaxConstraints { constraints } => {
                if constraints.is_empty() {
                    bail!("Empty delta: no constraints specified");
                }
                if constraints.iter().any(|c| c.trim().is_empty()) {
                    bail!("Empty delta: blank constraint");
                }
            }
            Self::LockActionIds { action_ids } => {
                if action_ids.is_empty() {
                    bail!("Empty delta: no action ids specified");
                }
            }
        }
        Ok(())
    }

    /// Clamp numeric fields into range before sending
    pub fn normalized(self) -> Self {
        match self {
            Self::AdjustHorizon { unit, value } => Self::AdjustHorizon {
                unit,
                value: value.clamp(HORIZON_MIN, HORIZON_MAX),
            },
            Self::ChangeObjectiveWeights {
                cost,
                service_level,
                carbon,
            } => Self::ChangeObjectiveWeights {
                cost: cost.map(|w| w.clamp(0.0, 1.0)),
                service_level: service_level.map(|w| w.clamp(0.0, 1.0)),
                carbon: carbon.map(|w| w.clamp(0.0, 1.0)),
            },
            other => other,
        }
    }

    /// Human label for the history entry this delta produces
    pub fn label(&self) -> String {
        match self {
            Self::AdjustHorizon { unit, value } => format!("Adjust horizon → {} {}", value, unit),
            Self::ChangeObjectiveWeights {
                cost,
                service_level,
                carbon,
            } => {
                let mut parts = Vec::new();
                if let Some(w) = cost {
                    parts.push(format!("cost → {:.2}", w));
                }
                if let Some(w) = service_level {
                    parts.push(format!("service level → {:.2}", w));
                }
                if let Some(w) = carbon {
                    parts.push(format!("carbon → {:.2}", w));
                }
                format!("Reweight objectives ({})", parts.join(", "))
            }
            Self::AddConstraints { constraints } => format!("Add {} constraint(s)", constraints.len()),
            Self::RelaxConstraints { constraints } => format!("Relax {} constraint(s)", constraints.len()),
            Self::LockActionIds { action_ids } => format!("Lock {} action(s)", action_ids.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_reweight_rejected() {
        let delta = PlanDelta::ChangeObjectiveWeights {
            cost: None,
            service_level: None,
            carbon: None,
        };
        assert!(delta.validate().is_err());
    }

    #[test]
    fn test_empty_constraint_list_rejected() {
        assert!(PlanDelta::AddConstraints { constraints: vec![] }.validate().is_err());
        assert!(
            PlanDelta::RelaxConstraints {
                constraints: vec!["  ".to_string()]
            }
            .validate()
            .is_err()
        );
        assert!(PlanDelta::LockActionIds { action_ids: vec![] }.validate().is_err());
    }

    #[test]
    fn test_normalize_clamps_weights_and_horizon() {
        let delta = PlanDelta::ChangeObjectiveWeights {
            cost: Some(1.3),
            service_level: Some(-0.2),
            carbon: None,
        }
        .normalized();
        assert_eq!(
            delta,
            PlanDelta::ChangeObjectiveWeights {
                cost: Some(1.0),
                service_level: Some(0.0),
                carbon: None,
            }
        );

        let delta = PlanDelta::AdjustHorizon {
            unit: HorizonUnit::Weeks,
            value: 90,
        }
        .normalized();
        assert_eq!(
            delta,
            PlanDelta::AdjustHorizon {
                unit: HorizonUnit::Weeks,
                value: 60,
            }
        );
    }

    #[test]
    fn test_horizon_label_matches_history_format() {
        let delta = PlanDelta::AdjustHorizon {
            unit: HorizonUnit::Weeks,
            value: 16,
        };
        assert_eq!(delta.label(), "Adjust horizon → 16 weeks");
    }

    #[test]
    fn test_wire_shape_is_tagged() {
        let delta = PlanDelta::LockActionIds {
            action_ids: vec!["a-1".to_string()],
        };
        let json = serde_json::to_value(&delta).unwrap();
        assert_eq!(json["kind"], "lock_action_ids");
        assert_eq!(json["action_ids"][0], "a-1");
    }
}
