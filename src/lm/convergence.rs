//! Convergence criteria for the Levenberg-Marquardt solver.
//!
//! This module defines the criteria used to determine when the solver has
//! converged, and the terminal states it can finish in.

use ndarray::Array1;
use serde::Serialize;
use std::fmt;

/// Possible convergence states for the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConvergenceStatus {
    /// The algorithm is still running.
    Running,

    /// The algorithm has converged due to a small parameter change.
    ParameterConvergence,

    /// The algorithm has converged due to a small function value change.
    FunctionValueConvergence,

    /// The algorithm has converged due to a small gradient.
    GradientConvergence,

    /// The algorithm has terminated due to reaching the maximum number of iterations.
    MaxIterationsReached,

    /// The algorithm has terminated due to reaching the residual evaluation budget.
    MaxEvaluationsReached,

    /// No step reduced the cost, even at maximum damping.
    DampingSaturated,
}

impl ConvergenceStatus {
    /// Returns true if the optimization has terminated.
    pub fn is_terminated(&self) -> bool {
        !matches!(self, ConvergenceStatus::Running)
    }

    /// Returns true if the optimization has converged.
    pub fn is_converged(&self) -> bool {
        matches!(
            self,
            ConvergenceStatus::ParameterConvergence
                | ConvergenceStatus::FunctionValueConvergence
                | ConvergenceStatus::GradientConvergence
        )
    }

    /// Returns true if the optimization stopped on a budget rather than a tolerance.
    pub fn is_budget_exhausted(&self) -> bool {
        matches!(
            self,
            ConvergenceStatus::MaxIterationsReached | ConvergenceStatus::MaxEvaluationsReached
        )
    }

    /// Returns a description of the convergence status.
    pub fn description(&self) -> &'static str {
        match self {
            ConvergenceStatus::Running => "Optimization is still running",
            ConvergenceStatus::ParameterConvergence => "Converged: small parameter change",
            ConvergenceStatus::FunctionValueConvergence => {
                "Converged: small function value change"
            }
            ConvergenceStatus::GradientConvergence => "Converged: small gradient",
            ConvergenceStatus::MaxIterationsReached => "Terminated: maximum iterations reached",
            ConvergenceStatus::MaxEvaluationsReached => {
                "Terminated: maximum function evaluations reached"
            }
            ConvergenceStatus::DampingSaturated => {
                "Terminated: no step reduces the cost at maximum damping"
            }
        }
    }
}

impl fmt::Display for ConvergenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Criteria for determining when the solver has converged.
#[derive(Debug, Clone)]
pub struct ConvergenceCriteria {
    /// Tolerance for change in parameter values.
    pub xtol: f64,

    /// Tolerance for change in function value.
    pub ftol: f64,

    /// Tolerance for gradient norm.
    pub gtol: f64,
}

impl Default for ConvergenceCriteria {
    fn default() -> Self {
        Self {
            xtol: 1e-8,
            ftol: 1e-8,
            gtol: 1e-8,
        }
    }
}

impl ConvergenceCriteria {
    /// Creates a new set of convergence criteria with the given tolerances.
    pub fn new(xtol: f64, ftol: f64, gtol: f64) -> Self {
        Self { xtol, ftol, gtol }
    }

    /// Gradient test: max-norm of Jᵀr below `gtol`.
    pub fn gradient_converged(&self, gradient: &Array1<f64>) -> bool {
        gradient.iter().fold(0.0_f64, |acc, g| acc.max(g.abs())) < self.gtol
    }

    /// Checks an accepted step for parameter or cost convergence.
    ///
    /// # Arguments
    ///
    /// * `params` - The parameter values before the step
    /// * `step` - The accepted step
    /// * `cost` - The cost before the step
    /// * `new_cost` - The cost after the step
    ///
    /// # Returns
    ///
    /// * The convergence status, `Running` if neither test passes
    pub fn check_step(
        &self,
        params: &Array1<f64>,
        step: &Array1<f64>,
        cost: f64,
        new_cost: f64,
    ) -> ConvergenceStatus {
        let step_norm = step.dot(step).sqrt();
        let param_norm = params.dot(params).sqrt();
        if step_norm <= self.xtol * (self.xtol + param_norm) {
            return ConvergenceStatus::ParameterConvergence;
        }

        let cost_change = (cost - new_cost).abs();
        if cost_change <= self.ftol * cost {
            return ConvergenceStatus::FunctionValueConvergence;
        }

        ConvergenceStatus::Running
    }

    /// Checks a rejected step.
    ///
    /// Near a minimum, rounding can make every trial step look like a
    /// non-improvement; the run has converged once the damped steps are
    /// below `xtol` or the linear model predicts no meaningful reduction.
    pub fn check_rejected(
        &self,
        params: &Array1<f64>,
        step: &Array1<f64>,
        cost: f64,
        predicted_reduction: f64,
    ) -> ConvergenceStatus {
        let step_norm = step.dot(step).sqrt();
        let param_norm = params.dot(params).sqrt();
        if step_norm <= self.xtol * (self.xtol + param_norm) {
            return ConvergenceStatus::ParameterConvergence;
        }
        if predicted_reduction <= self.ftol * cost {
            return ConvergenceStatus::FunctionValueConvergence;
        }
        ConvergenceStatus::Running
    }
}
