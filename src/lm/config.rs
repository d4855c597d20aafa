//! Configuration options for the Levenberg-Marquardt algorithm.
//!
//! This module defines the convergence tolerances, evaluation budgets and
//! damping schedule used by the solver.

use serde::{Deserialize, Serialize};

/// Configuration options for the Levenberg-Marquardt algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LmConfig {
    /// Maximum number of accepted steps. Default: 100
    pub max_iterations: usize,

    /// Maximum number of residual evaluations, including the ones spent on
    /// finite-difference Jacobians. Default: no limit
    pub max_evaluations: Option<usize>,

    /// Tolerance for relative change in cost. Default: 1e-8
    pub ftol: f64,

    /// Tolerance for change in parameter values. Default: 1e-8
    pub xtol: f64,

    /// Tolerance for the gradient's max-norm. Default: 1e-8
    pub gtol: f64,

    /// Initial value for the damping parameter. Default: 1e-3
    pub initial_lambda: f64,

    /// Factor by which to increase lambda. Default: 10.0
    pub lambda_up_factor: f64,

    /// Factor by which to decrease lambda. Default: 0.1
    pub lambda_down_factor: f64,

    /// Minimum value for lambda. Default: 1e-12
    pub min_lambda: f64,

    /// Maximum value for lambda. Default: 1e12
    pub max_lambda: f64,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            max_evaluations: None,
            ftol: 1e-8,
            xtol: 1e-8,
            gtol: 1e-8,
            initial_lambda: 1e-3,
            lambda_up_factor: 10.0,
            lambda_down_factor: 0.1,
            min_lambda: 1e-12,
            max_lambda: 1e12,
        }
    }
}

impl LmConfig {
    /// Whether `evaluations` has used up the evaluation budget.
    pub fn evaluations_exhausted(&self, evaluations: usize) -> bool {
        self.max_evaluations
            .map_or(false, |limit| evaluations >= limit)
    }

    /// Whether another `needed` evaluations fit in the budget.
    pub fn can_afford(&self, evaluations: usize, needed: usize) -> bool {
        self.max_evaluations
            .map_or(true, |limit| evaluations + needed <= limit)
    }
}
