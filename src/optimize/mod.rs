//! Boundary to the portfolio optimizer.
//!
//! Algorithms describe the portfolio they want with an [Objective] and a list of [Constraint]s
//! and hand both to an [Optimizer]. Working out positions, diffing against holdings and creating
//! orders happens entirely on the other side of this boundary.

use std::collections::HashMap;

use derive_more::{Display, Error};
use log::info;
use serde::{Deserialize, Serialize};

use crate::asset::Sid;
use crate::clock::DateTime;
use crate::types::PortfolioAllocation;

pub const MIN_TARGET_WEIGHT: f64 = -1.0;
pub const MAX_TARGET_WEIGHT: f64 = 1.0;

#[derive(Debug, Display, Error)]
pub enum OptimizeError {
    #[display("target weight {weight} for sid {sid} is outside [-1, 1]")]
    InvalidWeight { sid: u64, weight: f64 },
    #[display("invalid constraint: {reason}")]
    InvalidConstraint { reason: String },
    #[display("objective cannot be satisfied: {reason}")]
    Infeasible { reason: String },
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub enum Objective {
    /// Move the portfolio to exactly these weights, anything not listed is closed.
    TargetWeights(PortfolioAllocation),
    /// Maximise the sum of weight times alpha.
    MaximizeAlpha(HashMap<Sid, f64>),
}

impl Objective {
    pub fn target_weights<S, W>(weights: impl IntoIterator<Item = (S, W)>) -> Self
    where
        S: Into<Sid>,
        W: Into<crate::types::PortfolioWeight>,
    {
        Objective::TargetWeights(weights.into_iter().collect())
    }

    pub fn validate(&self) -> Result<(), OptimizeError> {
        match self {
            Objective::TargetWeights(weights) => {
                for sid in weights.keys() {
                    if let Some(weight) = weights.get(&sid) {
                        let weight = **weight;
                        if !weight.is_finite()
                            || !(MIN_TARGET_WEIGHT..=MAX_TARGET_WEIGHT).contains(&weight)
                        {
                            return Err(OptimizeError::InvalidWeight {
                                sid: sid.id(),
                                weight,
                            });
                        }
                    }
                }
                Ok(())
            }
            Objective::MaximizeAlpha(alphas) => {
                if let Some((sid, _)) = alphas.iter().find(|(_, alpha)| !alpha.is_finite()) {
                    return Err(OptimizeError::Infeasible {
                        reason: format!("alpha for {} is not finite", sid),
                    });
                }
                Ok(())
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub enum Constraint {
    /// Sum of absolute weights cannot exceed this value.
    MaxGrossExposure(f64),
    /// Every position weight must fall between `min` and `max`.
    PositionConcentration { min: f64, max: f64 },
    /// Long and short exposure must net to zero.
    DollarNeutral,
}

impl Constraint {
    pub fn max_gross_exposure(max: f64) -> Self {
        Constraint::MaxGrossExposure(max)
    }

    pub fn with_equal_bounds(min: f64, max: f64) -> Self {
        Constraint::PositionConcentration { min, max }
    }

    pub fn validate(&self) -> Result<(), OptimizeError> {
        match self {
            Constraint::MaxGrossExposure(max) => {
                if !max.is_finite() || *max <= 0.0 {
                    return Err(OptimizeError::InvalidConstraint {
                        reason: format!("max gross exposure must be positive, got {}", max),
                    });
                }
            }
            Constraint::PositionConcentration { min, max } => {
                if !min.is_finite() || !max.is_finite() || min > max {
                    return Err(OptimizeError::InvalidConstraint {
                        reason: format!("position concentration bounds {} > {}", min, max),
                    });
                }
            }
            Constraint::DollarNeutral => (),
        }
        Ok(())
    }
}

/// Turns an objective into orders.
///
/// Returns nothing on success: all effects are orders emitted by the implementor.
pub trait Optimizer {
    fn order_optimal_portfolio(
        &mut self,
        now: &DateTime,
        objective: &Objective,
        constraints: &[Constraint],
    ) -> Result<(), OptimizeError>;
}

/// A request received by [RecordingOptimizer].
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct OptimizeRequest {
    pub date: DateTime,
    pub objective: Objective,
    pub constraints: Vec<Constraint>,
}

/// Paper optimizer that keeps every request and never trades. Used to drive an algorithm when no
/// execution backend is attached.
#[derive(Clone, Debug, Default)]
pub struct RecordingOptimizer {
    requests: Vec<OptimizeRequest>,
}

impl RecordingOptimizer {
    pub fn requests(&self) -> &[OptimizeRequest] {
        &self.requests
    }

    pub fn new() -> Self {
        Self::default()
    }
}

impl Optimizer for RecordingOptimizer {
    fn order_optimal_portfolio(
        &mut self,
        now: &DateTime,
        objective: &Objective,
        constraints: &[Constraint],
    ) -> Result<(), OptimizeError> {
        info!(
            "OPTIMIZER: Received {:?} with {:?} constraints at {}",
            objective,
            constraints.len(),
            now
        );
        self.requests.push(OptimizeRequest {
            date: *now,
            objective: objective.clone(),
            constraints: constraints.to_vec(),
        });
        Ok(())
    }
}
