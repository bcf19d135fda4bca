//! GoalRequest domain type
//!
//! A GoalRequest describes what to plan: a free-text goal, the business
//! context it applies to, a planning horizon, and objective weights. Once
//! submitted for analysis a request is immutable; a new analysis starts a new
//! plan lineage.

use serde::{Deserialize, Serialize};

/// Minimum planning horizon value
pub const HORIZON_MIN: u32 = 1;

/// Maximum planning horizon value
pub const HORIZON_MAX: u32 = 60;

/// Unit of the planning horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HorizonUnit {
    #[default]
    Weeks,
    Months,
}

impl std::fmt::Display for HorizonUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Weeks => write!(f, "weeks"),
            Self::Months => write!(f, "months"),
        }
    }
}

/// Planning horizon: unit plus positive value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizon {
    pub unit: HorizonUnit,
    pub value: u32,
}

impl Horizon {
    pub fn new(unit: HorizonUnit, value: u32) -> Self {
        Self { unit, value }
    }

    /// Clamp the value into [HORIZON_MIN, HORIZON_MAX]
    ///
    /// Out-of-range horizons are clamped rather than rejected so an analysis
    /// attempt is always made.
    pub fn clamped(self) -> Self {
        Self {
            unit: self.unit,
            value: self.value.clamp(HORIZON_MIN, HORIZON_MAX),
        }
    }
}

impl std::fmt::Display for Horizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// One dimension of the objective-weight vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveDimension {
    Cost,
    ServiceLevel,
    Carbon,
}

impl std::fmt::Display for ObjectiveDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cost => write!(f, "cost"),
            Self::ServiceLevel => write!(f, "service level"),
            Self::Carbon => write!(f, "carbon"),
        }
    }
}

/// Objective weights for the optimizer
///
/// Weights are not required to sum to 1; each is clamped to [0, 1] on update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveWeights {
    pub cost: f64,
    pub service_level: f64,
    pub carbon: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            cost: 0.5,
            service_level: 0.4,
            carbon: 0.1,
        }
    }
}

impl ObjectiveWeights {
    pub fn new(cost: f64, service_level: f64, carbon: f64) -> Self {
        Self {
            cost,
            service_level,
            carbon,
        }
    }

    /// Clamp every weight into [0, 1]
    pub fn clamped(self) -> Self {
        Self {
            cost: self.cost.clamp(0.0, 1.0),
            service_level: self.service_level.clamp(0.0, 1.0),
            carbon: self.carbon.clamp(0.0, 1.0),
        }
    }

    /// Read one dimension
    pub fn get(&self, dimension: ObjectiveDimension) -> f64 {
        match dimension {
            ObjectiveDimension::Cost => self.cost,
            ObjectiveDimension::ServiceLevel => self.service_level,
            ObjectiveDimension::Carbon => self.carbon,
        }
    }

    /// Increase one dimension by `delta`, clamped into [0, 1]
    ///
    /// Clamping is idempotent: bumping +0.1 at 0.95 yields 1.0, and bumping
    /// again stays at 1.0.
    pub fn bumped(self, dimension: ObjectiveDimension, delta: f64) -> Self {
        let mut next = self;
        match dimension {
            ObjectiveDimension::Cost => next.cost += delta,
            ObjectiveDimension::ServiceLevel => next.service_level += delta,
            ObjectiveDimension::Carbon => next.carbon += delta,
        }
        next.clamped()
    }

    /// Apply a partial reweighting; unspecified fields are unchanged
    pub fn merged(self, cost: Option<f64>, service_level: Option<f64>, carbon: Option<f64>) -> Self {
        Self {
            cost: cost.unwrap_or(self.cost),
            service_level: service_level.unwrap_or(self.service_level),
            carbon: carbon.unwrap_or(self.carbon),
        }
        .clamped()
    }
}

/// Business context a goal applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BusinessContext {
    /// Business-unit identifier
    pub business_unit: String,
    /// Market identifiers in scope
    pub markets: Vec<String>,
}

impl BusinessContext {
    pub fn new(business_unit: impl Into<String>, markets: Vec<String>) -> Self {
        Self {
            business_unit: business_unit.into(),
            markets,
        }
    }
}

/// An immutable description of what to plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRequest {
    /// Free-text business goal
    pub goal_text: String,
    /// Business context
    pub context: BusinessContext,
    /// Planning horizon
    pub horizon: Horizon,
    /// Objective-weight vector
    pub objectives: ObjectiveWeights,
}

impl GoalRequest {
    pub fn new(goal_text: impl Into<String>, context: BusinessContext, horizon: Horizon, objectives: ObjectiveWeights) -> Self {
        Self {
            goal_text: goal_text.into(),
            context,
            horizon,
            objectives,
        }
    }

    /// Return a copy with horizon and weights clamped into range
    pub fn normalized(&self) -> Self {
        Self {
            goal_text: self.goal_text.clone(),
            context: self.context.clone(),
            horizon: self.horizon.clamped(),
            objectives: self.objectives.clamped(),
        }
    }
}
